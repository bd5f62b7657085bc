use crate::foundation::error::{KnitlineError, KnitlineResult};

pub use kurbo::Rect;

/// Needle-bed schematic constants, fixed for process lifetime.
///
/// The machine is drawn centered on the origin: needles `0..NEEDLE_COUNT` map
/// to schematic x-coordinates `-HALF_WIDTH..HALF_WIDTH`, one unit per needle.
pub struct Machine;

impl Machine {
    /// Number of addressable needles on the bed.
    pub const NEEDLE_COUNT: u16 = 200;
    /// Schematic width of the needle bed.
    pub const WIDTH: f64 = 200.0;
    /// Half the schematic width; offset between needle index and x-coordinate.
    pub const HALF_WIDTH: f64 = 100.0;
    /// Height of each schematic bed half.
    pub const BAR_HEIGHT: f64 = 5.0;
    /// Thickness of needle-limit and progress markers.
    pub const LIMIT_BAR_WIDTH: f64 = 0.5;
}

/// Pattern dimensions as reported to protocol plugins.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Dimensions {
    /// Pattern width in stitches (pixels).
    pub width: u32,
    /// Pattern height in rows (pixels).
    pub height: u32,
}

/// Active needle sub-span for knitting, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NeedleRange {
    start: u16,
    stop: u16,
}

impl NeedleRange {
    /// Build a validated range: `start <= stop`, both on the needle bed.
    pub fn new(start: u16, stop: u16) -> KnitlineResult<Self> {
        if start > stop {
            return Err(KnitlineError::alignment(format!(
                "needle range start {start} must be <= stop {stop}"
            )));
        }
        if stop >= Machine::NEEDLE_COUNT {
            return Err(KnitlineError::alignment(format!(
                "needle range stop {stop} exceeds needle bed ({} needles)",
                Machine::NEEDLE_COUNT
            )));
        }
        Ok(Self { start, stop })
    }

    /// First needle of the span.
    pub fn start(self) -> u16 {
        self.start
    }

    /// Last needle of the span.
    pub fn stop(self) -> u16 {
        self.stop
    }

    /// Number of needles in the span.
    pub fn width(self) -> u16 {
        self.stop - self.start + 1
    }
}

impl Default for NeedleRange {
    /// The machine's startup span: needles 80..=119.
    fn default() -> Self {
        Self {
            start: 80,
            stop: 119,
        }
    }
}

/// Policy for positioning the pattern horizontally relative to the active
/// needle range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    /// Pattern left edge on the first needle of the span.
    Left,
    /// Pattern centered over the span.
    #[default]
    Center,
    /// Pattern right edge on the last needle of the span.
    Right,
}

impl AlignMode {
    /// Wire spelling used by plugin alignment events.
    pub fn as_str(self) -> &'static str {
        match self {
            AlignMode::Left => "left",
            AlignMode::Center => "center",
            AlignMode::Right => "right",
        }
    }
}

impl std::str::FromStr for AlignMode {
    type Err = KnitlineError;

    fn from_str(s: &str) -> KnitlineResult<Self> {
        match s {
            "left" => Ok(AlignMode::Left),
            "center" => Ok(AlignMode::Center),
            "right" => Ok(AlignMode::Right),
            other => Err(KnitlineError::alignment(format!(
                "unknown alignment mode '{other}'"
            ))),
        }
    }
}

/// Uniform integer scale factor for the rendered preview, clamped to `[1, 5]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ZoomLevel(i32);

impl ZoomLevel {
    /// Lowest zoom level.
    pub const MIN: i32 = 1;
    /// Highest zoom level.
    pub const MAX: i32 = 5;

    /// Build a zoom level, clamping out-of-range requests to the nearest
    /// bound rather than failing.
    pub fn clamped(level: i32) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    /// Step the level by `delta` (mouse-wheel style), re-clamping.
    pub fn stepped(self, delta: i32) -> Self {
        Self::clamped(self.0.saturating_add(delta))
    }

    /// Current level as an integer in `[1, 5]`.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(3)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red, premultiplied.
    pub r: u8,
    /// Green, premultiplied.
    pub g: u8,
    /// Blue, premultiplied.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply straight RGBA components.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Components as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Knitting progress: current row out of a total row count.
///
/// `total_rows == 0` means the total is unknown; otherwise `current_row` is
/// kept within `0..=total_rows`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgressState {
    current_row: u32,
    total_rows: u32,
}

impl ProgressState {
    /// Build a progress state, clamping `current_row` when the total is known.
    pub fn new(current_row: u32, total_rows: u32) -> Self {
        let current_row = if total_rows == 0 {
            current_row
        } else {
            current_row.min(total_rows)
        };
        Self {
            current_row,
            total_rows,
        }
    }

    /// Last completed row.
    pub fn current_row(self) -> u32 {
        self.current_row
    }

    /// Total row count, `0` when unknown.
    pub fn total_rows(self) -> u32 {
        self.total_rows
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
