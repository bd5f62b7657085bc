//! CPU rasterization of a composed [`Scene`] into a premultiplied RGBA8
//! frame for on-screen or on-disk preview.

use kurbo::Rect;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{KnitlineError, KnitlineResult};
use crate::pattern::image::Pattern;
use crate::scene::compose::{Scene, SceneItem};

/// A rendered preview frame: premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel data, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameRgba {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// RGBA components of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `(x, y)` is outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Rasterize a scene. The frame covers the bounding box of all scene items,
/// scaled uniformly by the scene's zoom level; the pattern layer is blitted
/// nearest-neighbor.
pub fn rasterize(scene: &Scene, pattern: &Pattern) -> KnitlineResult<FrameRgba> {
    let bounds = scene_bounds(scene)
        .ok_or_else(|| KnitlineError::transform("cannot rasterize an empty scene"))?;
    let zoom = f64::from(scene.zoom.get());

    let width = (bounds.width() * zoom).ceil() as u32;
    let height = (bounds.height() * zoom).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(KnitlineError::transform("scene has a degenerate bounding box"));
    }

    let mut frame = FrameRgba::new(width, height);
    for item in &scene.items {
        match item {
            SceneItem::Fill { rect, color } => {
                fill_rect(&mut frame, to_pixels(*rect, bounds, zoom), *color);
            }
            SceneItem::Pattern { rect } => {
                blit_pattern(&mut frame, to_pixels(*rect, bounds, zoom), pattern);
            }
        }
    }
    Ok(frame)
}

/// Pixel-space rectangle after world-to-frame mapping.
#[derive(Clone, Copy, Debug)]
struct PixelRect {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

fn scene_bounds(scene: &Scene) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    for item in &scene.items {
        let rect = match item {
            SceneItem::Pattern { rect } | SceneItem::Fill { rect, .. } => *rect,
        };
        bounds = Some(match bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    }
    bounds
}

fn to_pixels(rect: Rect, bounds: Rect, zoom: f64) -> PixelRect {
    PixelRect {
        x0: ((rect.x0 - bounds.x0) * zoom).round() as i64,
        y0: ((rect.y0 - bounds.y0) * zoom).round() as i64,
        x1: ((rect.x1 - bounds.x0) * zoom).round() as i64,
        y1: ((rect.y1 - bounds.y0) * zoom).round() as i64,
    }
}

fn fill_rect(frame: &mut FrameRgba, rect: PixelRect, color: Rgba8Premul) {
    let src = color.to_array();
    let x0 = rect.x0.clamp(0, i64::from(frame.width)) as u32;
    let x1 = rect.x1.clamp(0, i64::from(frame.width)) as u32;
    let y0 = rect.y0.clamp(0, i64::from(frame.height)) as u32;
    let y1 = rect.y1.clamp(0, i64::from(frame.height)) as u32;
    // Thin markers always cover at least one pixel row/column.
    let x1 = if x0 == x1 && x0 < frame.width { x0 + 1 } else { x1 };
    let y1 = if y0 == y1 && y0 < frame.height { y0 + 1 } else { y1 };

    for y in y0..y1 {
        for x in x0..x1 {
            composite_over(frame, x, y, src);
        }
    }
}

fn blit_pattern(frame: &mut FrameRgba, rect: PixelRect, pattern: &Pattern) {
    let dst_w = (rect.x1 - rect.x0).max(0) as u32;
    let dst_h = (rect.y1 - rect.y0).max(0) as u32;
    if dst_w == 0 || dst_h == 0 {
        return;
    }

    for dy in 0..dst_h {
        let fy = rect.y0 + i64::from(dy);
        if fy < 0 || fy >= i64::from(frame.height) {
            continue;
        }
        // Nearest-neighbor sampling.
        let sy = (u64::from(dy) * u64::from(pattern.height()) / u64::from(dst_h)) as u32;
        for dx in 0..dst_w {
            let fx = rect.x0 + i64::from(dx);
            if fx < 0 || fx >= i64::from(frame.width) {
                continue;
            }
            let sx = (u64::from(dx) * u64::from(pattern.width()) / u64::from(dst_w)) as u32;
            let [r, g, b, a] = pattern.pixel(sx, sy);
            let src = Rgba8Premul::from_straight_rgba(r, g, b, a).to_array();
            composite_over(frame, fx as u32, fy as u32, src);
        }
    }
}

fn composite_over(frame: &mut FrameRgba, x: u32, y: u32, src: [u8; 4]) {
    let i = ((y as usize) * (frame.width as usize) + (x as usize)) * 4;
    let dst = [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ];
    let out = over(dst, src);
    frame.data[i..i + 4].copy_from_slice(&out);
}

/// Premultiplied source-over.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/scene/raster.rs"]
mod tests;
