use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::core::Dimensions;
use crate::foundation::error::{KnitlineError, KnitlineResult};

/// An immutable RGBA8 knitting pattern.
///
/// Patterns are produced whole (by decoding a file or by a transform in
/// [`crate::pattern::transform`]) and never mutated in place; the host
/// replaces its current pattern wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    image: RgbaImage,
}

impl Pattern {
    /// Wrap a decoded RGBA image. Fails on zero-sized input.
    pub fn from_image(image: RgbaImage) -> KnitlineResult<Self> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(KnitlineError::transform(format!(
                "pattern dimensions must be non-zero, got {w}x{h}"
            )));
        }
        Ok(Self { image })
    }

    /// Build a pattern from raw RGBA8 bytes in row-major order.
    pub fn from_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> KnitlineResult<Self> {
        let image = RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
            KnitlineError::transform(format!("rgba8 buffer does not match {width}x{height}"))
        })?;
        Self::from_image(image)
    }

    /// Pattern width in stitches.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Pattern height in rows.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width/height pair as reported to protocol plugins.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// RGBA components of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `(x, y)` is outside the pattern.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Borrow the underlying RGBA image.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA8 bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Decode encoded image bytes (PNG, JPEG, BMP, GIF, TIFF, ...) into a
/// [`Pattern`], converting to RGBA8.
pub fn decode_pattern(bytes: &[u8]) -> KnitlineResult<Pattern> {
    let dyn_img = image::load_from_memory(bytes).context("decode pattern image from memory")?;
    Pattern::from_image(dyn_img.to_rgba8())
}

/// Load a pattern from a raster image file.
pub fn load_pattern(path: impl AsRef<Path>) -> KnitlineResult<Pattern> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read pattern '{}'", path.display()))?;
    decode_pattern(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/image.rs"]
mod tests;
