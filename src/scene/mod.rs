//! Needle-bed preview: placement math, scene composition, rasterization.

pub mod compose;
pub mod layout;
pub mod raster;
