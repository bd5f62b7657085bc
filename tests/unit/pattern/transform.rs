use super::*;

fn checker(width: u32, height: u32) -> Pattern {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    });
    Pattern::from_image(img).unwrap()
}

fn gradient(width: u32, height: u32) -> Pattern {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 10) as u8, (y * 10) as u8, 100, ((x + y) * 20) as u8])
    });
    Pattern::from_image(img).unwrap()
}

#[test]
fn rotate_swaps_dimensions_and_expands() {
    let p = gradient(5, 3);
    let left = rotate(&p, 90.0).unwrap();
    assert_eq!((left.width(), left.height()), (3, 5));
    let right = rotate(&p, -90.0).unwrap();
    assert_eq!((right.width(), right.height()), (3, 5));
}

#[test]
fn four_quarter_turns_restore_the_pattern() {
    let p = gradient(5, 3);
    let mut q = p.clone();
    for _ in 0..4 {
        q = rotate(&q, 90.0).unwrap();
    }
    assert_eq!((q.width(), q.height()), (p.width(), p.height()));
    assert_eq!(q, p);
}

#[test]
fn left_then_right_rotation_cancels() {
    let p = gradient(4, 7);
    let back = rotate(&rotate(&p, 90.0).unwrap(), -90.0).unwrap();
    assert_eq!(back, p);
}

#[test]
fn rotate_rejects_non_quarter_angles() {
    let p = checker(4, 4);
    for bad in [0.0, 45.0, 180.0, -91.0] {
        let err = rotate(&p, bad).unwrap_err();
        assert!(matches!(err, KnitlineError::Transform(_)));
    }
}

#[test]
fn mirror_reflects_horizontally() {
    let p = gradient(4, 2);
    let m = mirror(&p).unwrap();
    for y in 0..2 {
        for x in 0..4 {
            assert_eq!(m.pixel(x, y), p.pixel(3 - x, y));
        }
    }
    // Involution.
    assert_eq!(mirror(&m).unwrap(), p);
}

#[test]
fn flip_reflects_vertically() {
    let p = gradient(2, 4);
    let f = flip(&p).unwrap();
    for y in 0..4 {
        for x in 0..2 {
            assert_eq!(f.pixel(x, y), p.pixel(x, 3 - y));
        }
    }
    assert_eq!(flip(&f).unwrap(), p);
}

#[test]
fn invert_flips_rgb_and_preserves_alpha() {
    let p = gradient(3, 3);
    let inv = invert(&p).unwrap();
    for y in 0..3 {
        for x in 0..3 {
            let [r, g, b, a] = p.pixel(x, y);
            assert_eq!(inv.pixel(x, y), [255 - r, 255 - g, 255 - b, a]);
        }
    }
}

#[test]
fn invert_keeps_fully_transparent_pixels_transparent() {
    let img = RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 0]));
    let p = Pattern::from_image(img).unwrap();
    let inv = invert(&p).unwrap();
    assert_eq!(inv.pixel(0, 0)[3], 0, "alpha must survive inversion");
}

#[test]
fn repeat_tiles_row_major_without_gaps() {
    let p = gradient(3, 2);
    let tiled = repeat(&p, 2, 3).unwrap();
    assert_eq!((tiled.width(), tiled.height()), (3 * 3, 2 * 2));
    for tile_y in 0..2 {
        for tile_x in 0..3 {
            for y in 0..2 {
                for x in 0..3 {
                    assert_eq!(
                        tiled.pixel(tile_x * 3 + x, tile_y * 2 + y),
                        p.pixel(x, y),
                        "tile ({tile_x},{tile_y}) differs at ({x},{y})"
                    );
                }
            }
        }
    }
}

#[test]
fn repeat_identity_with_unit_counts() {
    let p = checker(4, 4);
    assert_eq!(repeat(&p, 1, 1).unwrap(), p);
}

#[test]
fn repeat_rejects_zero_counts_and_overflow() {
    let p = checker(2, 2);
    assert!(matches!(
        repeat(&p, 0, 1).unwrap_err(),
        KnitlineError::Transform(_)
    ));
    assert!(matches!(
        repeat(&p, 1, 0).unwrap_err(),
        KnitlineError::Transform(_)
    ));
    assert!(matches!(
        repeat(&p, u32::MAX, u32::MAX).unwrap_err(),
        KnitlineError::Transform(_)
    ));
}
