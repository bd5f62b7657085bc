//! Pattern loading and pure image transforms.

pub mod image;
pub mod transform;
