use super::*;

fn params() -> SceneParams {
    SceneParams {
        pattern: Dimensions {
            width: 40,
            height: 30,
        },
        range: NeedleRange::new(80, 119).unwrap(),
        align: AlignMode::Center,
        zoom: ZoomLevel::clamped(2),
        progress: ProgressState::new(10, 30),
    }
}

#[test]
fn scene_paints_pattern_first_then_schematic_then_markers() {
    let scene = compose(params());
    assert_eq!(scene.items.len(), 6);
    assert!(matches!(scene.items[0], SceneItem::Pattern { .. }));
    assert!(matches!(
        scene.items[1],
        SceneItem::Fill {
            color: LEFT_BED_COLOR,
            ..
        }
    ));
    assert!(matches!(
        scene.items[2],
        SceneItem::Fill {
            color: RIGHT_BED_COLOR,
            ..
        }
    ));
    assert!(matches!(
        scene.items[5],
        SceneItem::Fill {
            color: PROGRESS_MARKER_COLOR,
            ..
        }
    ));
}

#[test]
fn pattern_layer_uses_alignment_placement() {
    let scene = compose(params());
    let SceneItem::Pattern { rect } = &scene.items[0] else {
        panic!("first item must be the pattern layer");
    };
    assert_eq!(rect.x0, -20.5);
    assert_eq!(rect.width(), 40.0);
    assert_eq!(rect.height(), 30.0);
}

#[test]
fn progress_marker_tracks_the_snapshot() {
    let scene = compose(params());
    let SceneItem::Fill { rect, .. } = &scene.items[5] else {
        panic!("last item must be a fill");
    };
    assert_eq!(rect.y0, 20.0); // pattern_height 30 - current_row 10
}

#[test]
fn zoom_is_carried_through_to_the_scene() {
    let scene = compose(params());
    assert_eq!(scene.zoom.get(), 2);
}

#[test]
fn recompose_reflects_every_snapshot_change() {
    let base = compose(params());

    let mut moved = params();
    moved.align = AlignMode::Left;
    assert_ne!(compose(moved).items[0], base.items[0]);

    let mut progressed = params();
    progressed.progress = ProgressState::new(25, 30);
    assert_ne!(compose(progressed).items[5], base.items[5]);

    let mut respanned = params();
    respanned.range = NeedleRange::new(60, 139).unwrap();
    assert_ne!(compose(respanned).items[3], base.items[3]);
}
