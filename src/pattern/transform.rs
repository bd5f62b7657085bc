//! Pure pattern-to-pattern operations.
//!
//! Every operation takes the source pattern by reference and returns a new
//! [`Pattern`], or fails with [`KnitlineError::Transform`] without touching
//! the input. Nothing here partially applies.

use image::RgbaImage;
use image::imageops;

use crate::foundation::error::{KnitlineError, KnitlineResult};
use crate::pattern::image::Pattern;

/// Rotate by a quarter turn. `90.0` rotates counter-clockwise, `-90.0`
/// clockwise; the output canvas expands to fit (width and height swap).
/// Any other angle is rejected.
pub fn rotate(pattern: &Pattern, degrees: f64) -> KnitlineResult<Pattern> {
    let rotated = if degrees == 90.0 {
        imageops::rotate270(pattern.as_image())
    } else if degrees == -90.0 {
        imageops::rotate90(pattern.as_image())
    } else {
        return Err(KnitlineError::transform(format!(
            "rotation must be +-90 degrees, got {degrees}"
        )));
    };
    Pattern::from_image(rotated)
}

/// Reflect horizontally (left-right mirror).
pub fn mirror(pattern: &Pattern) -> KnitlineResult<Pattern> {
    Pattern::from_image(imageops::flip_horizontal(pattern.as_image()))
}

/// Reflect vertically (top-bottom flip).
pub fn flip(pattern: &Pattern) -> KnitlineResult<Pattern> {
    Pattern::from_image(imageops::flip_vertical(pattern.as_image()))
}

/// Invert the R, G, and B channels.
///
/// The alpha channel passes through unchanged: a transparent source stays
/// transparent after inversion.
pub fn invert(pattern: &Pattern) -> KnitlineResult<Pattern> {
    let mut image = pattern.as_image().clone();
    for px in image.pixels_mut() {
        px.0[0] = 255 - px.0[0];
        px.0[1] = 255 - px.0[1];
        px.0[2] = 255 - px.0[2];
    }
    Pattern::from_image(image)
}

/// Tile the pattern `vertical` times down and `horizontal` times across,
/// row-major with no gaps or overlaps. Both counts must be >= 1.
pub fn repeat(pattern: &Pattern, vertical: u32, horizontal: u32) -> KnitlineResult<Pattern> {
    if vertical == 0 || horizontal == 0 {
        return Err(KnitlineError::transform(format!(
            "repeat counts must be >= 1, got {vertical}x{horizontal}"
        )));
    }

    let new_w = pattern
        .width()
        .checked_mul(horizontal)
        .ok_or_else(|| KnitlineError::transform("repeat width overflows u32"))?;
    let new_h = pattern
        .height()
        .checked_mul(vertical)
        .ok_or_else(|| KnitlineError::transform("repeat height overflows u32"))?;

    let mut canvas = RgbaImage::new(new_w, new_h);
    for tile_y in 0..vertical {
        for tile_x in 0..horizontal {
            imageops::replace(
                &mut canvas,
                pattern.as_image(),
                i64::from(tile_x) * i64::from(pattern.width()),
                i64::from(tile_y) * i64::from(pattern.height()),
            );
        }
    }
    Pattern::from_image(canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/transform.rs"]
mod tests;
