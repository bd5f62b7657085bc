use kurbo::Rect;

use crate::foundation::core::{
    AlignMode, Dimensions, NeedleRange, ProgressState, Rgba8Premul, ZoomLevel,
};
use crate::scene::layout;

/// Immutable snapshot of everything the composer needs for one frame.
///
/// The host takes a fresh snapshot and re-composes on every mutation of the
/// pattern, needle range, alignment mode, or progress; there is no partial
/// invalidation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SceneParams {
    /// Current pattern dimensions.
    pub pattern: Dimensions,
    /// Active needle span.
    pub range: NeedleRange,
    /// Horizontal placement policy.
    pub align: AlignMode,
    /// Preview scale factor.
    pub zoom: ZoomLevel,
    /// Knitting progress.
    pub progress: ProgressState,
}

/// One draw element of a composed scene, in schematic units.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum SceneItem {
    /// The pattern layer, blitted at `rect`.
    Pattern {
        /// Placement of the pattern layer.
        rect: Rect,
    },
    /// A filled rectangle (schematic half, limit marker, or progress marker).
    Fill {
        /// Rectangle to fill.
        rect: Rect,
        /// Fill color, premultiplied RGBA8.
        color: Rgba8Premul,
    },
}

/// A composed preview scene: ordered draw items (painter's order) plus the
/// zoom level to apply at rasterization.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Scene {
    /// Draw items in painter's order.
    pub items: Vec<SceneItem>,
    /// Uniform scale applied when rasterizing.
    pub zoom: ZoomLevel,
}

/// Fill color of the left bed half.
pub const LEFT_BED_COLOR: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 165,
    b: 0,
    a: 255,
};
/// Fill color of the right bed half.
pub const RIGHT_BED_COLOR: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 128,
    b: 0,
    a: 255,
};
/// Fill color of the needle-limit markers.
pub const LIMIT_MARKER_COLOR: Rgba8Premul = Rgba8Premul {
    r: 40,
    g: 40,
    b: 40,
    a: 255,
};
/// Fill color of the progress marker.
pub const PROGRESS_MARKER_COLOR: Rgba8Premul = Rgba8Premul {
    r: 200,
    g: 30,
    b: 30,
    a: 255,
};

/// Compose the preview scene for one snapshot.
///
/// Painter's order: pattern layer first, then the two bed halves, the two
/// needle-limit markers, and the progress marker on top.
#[tracing::instrument(level = "debug")]
pub fn compose(params: SceneParams) -> Scene {
    let w = f64::from(params.pattern.width);
    let h = f64::from(params.pattern.height);

    let mut items = Vec::with_capacity(6);
    items.push(SceneItem::Pattern {
        rect: layout::pattern_rect(params.align, params.range, w, h),
    });

    let [left_bed, right_bed] = layout::schematic_rects();
    items.push(SceneItem::Fill {
        rect: left_bed,
        color: LEFT_BED_COLOR,
    });
    items.push(SceneItem::Fill {
        rect: right_bed,
        color: RIGHT_BED_COLOR,
    });

    for rect in layout::limit_marker_rects(params.range, h) {
        items.push(SceneItem::Fill {
            rect,
            color: LIMIT_MARKER_COLOR,
        });
    }

    items.push(SceneItem::Fill {
        rect: layout::progress_marker_rect(h, params.progress.current_row()),
        color: PROGRESS_MARKER_COLOR,
    });

    Scene {
        items,
        zoom: params.zoom,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/compose.rs"]
mod tests;
