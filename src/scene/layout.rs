//! Needle-relative placement math.
//!
//! All coordinates are in schematic units with the origin at the machine
//! center: needle `n` covers `x in [n - HALF_WIDTH - 1, n - HALF_WIDTH]`.
//! `+y` points down; the pattern's top row sits at `y = 0` and the schematic
//! bed halves at `y in [-BAR_HEIGHT, 0]`.

use kurbo::Rect;

use crate::foundation::core::{AlignMode, Machine, NeedleRange};

/// X-coordinate of the pattern's left edge for the given alignment mode.
pub fn pattern_left_edge(mode: AlignMode, range: NeedleRange, pattern_width: f64) -> f64 {
    let start = f64::from(range.start());
    let stop = f64::from(range.stop());
    match mode {
        AlignMode::Left => start - Machine::HALF_WIDTH,
        AlignMode::Center => -pattern_width / 2.0 + (start + stop) / 2.0 - Machine::HALF_WIDTH,
        AlignMode::Right => stop - Machine::HALF_WIDTH - pattern_width,
    }
}

/// Rectangle covered by the pattern layer.
pub fn pattern_rect(
    mode: AlignMode,
    range: NeedleRange,
    pattern_width: f64,
    pattern_height: f64,
) -> Rect {
    let left = pattern_left_edge(mode, range, pattern_width);
    Rect::new(left, 0.0, left + pattern_width, pattern_height)
}

/// The two schematic bed halves, left then right.
pub fn schematic_rects() -> [Rect; 2] {
    [
        Rect::new(-Machine::HALF_WIDTH, -Machine::BAR_HEIGHT, 0.0, 0.0),
        Rect::new(0.0, -Machine::BAR_HEIGHT, Machine::HALF_WIDTH, 0.0),
    ]
}

/// Needle-limit marker rectangles at the start and stop needles.
///
/// Each marker sits on the outer edge of its needle, spanning the pattern
/// height plus one bar height above and below.
pub fn limit_marker_rects(range: NeedleRange, pattern_height: f64) -> [Rect; 2] {
    let top = -Machine::BAR_HEIGHT;
    let bottom = pattern_height + Machine::BAR_HEIGHT;
    let start_x = f64::from(range.start()) - Machine::HALF_WIDTH - 1.0;
    let stop_x = f64::from(range.stop()) - Machine::HALF_WIDTH;
    [
        Rect::new(start_x, top, start_x + Machine::LIMIT_BAR_WIDTH, bottom),
        Rect::new(stop_x, top, stop_x + Machine::LIMIT_BAR_WIDTH, bottom),
    ]
}

/// Horizontal progress marker spanning the machine width; its top edge sits
/// `current_row` rows above the pattern's bottom edge.
pub fn progress_marker_rect(pattern_height: f64, current_row: u32) -> Rect {
    let y = pattern_height - f64::from(current_row);
    Rect::new(
        -Machine::HALF_WIDTH,
        y,
        Machine::HALF_WIDTH,
        y + Machine::LIMIT_BAR_WIDTH,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layout.rs"]
mod tests;
