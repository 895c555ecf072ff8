use feature_map_viewer::grid::{GridConfig, Plane, build_grid};
use glam::Vec3;

const GRAY: [f32; 3] = [0.5, 0.5, 0.5];

#[test]
fn test_grid_counts() {
    for resolution in [0, 1, 3, 10] {
        let grid = build_grid(1.0, resolution, GRAY, Plane::Xy, 0.0, Vec3::ZERO);
        assert_eq!(grid.points.len(), 4 * (resolution + 1));
        assert_eq!(grid.segments.len(), 2 * (resolution + 1));
        assert_eq!(grid.colors.len(), grid.points.len() - 1);
        for (k, seg) in grid.segments.iter().enumerate() {
            assert_eq!(*seg, [2 * k as u32, 2 * k as u32 + 1]);
        }
    }
}

#[test]
fn test_zero_resolution_is_a_cross() {
    let grid = build_grid(2.0, 0, GRAY, Plane::Xy, 0.0, Vec3::ZERO);
    assert_eq!(grid.segments.len(), 2);
    let (a, b) = grid.segment_endpoints().next().unwrap();
    assert_eq!(a, Vec3::new(-1.0, -1.0, 0.0));
    assert_eq!(b, Vec3::new(-1.0, 1.0, 0.0));
}

#[test]
fn test_xz_swaps_second_and_third_coordinates() {
    let xy = build_grid(3.0, 5, GRAY, Plane::Xy, 0.25, Vec3::ZERO);
    let xz = build_grid(3.0, 5, GRAY, Plane::Xz, 0.25, Vec3::ZERO);
    assert_eq!(xy.points.len(), xz.points.len());
    for (p, q) in xy.points.iter().zip(&xz.points) {
        assert_eq!(p.x, q.x);
        assert_eq!(p.y, q.z);
        assert_eq!(p.z, q.y);
    }
}

#[test]
fn test_translate_shifts_every_point() {
    let t = Vec3::new(1.0, -2.0, 0.5);
    let base = build_grid(1.0, 4, GRAY, Plane::Xz, -1.0, Vec3::ZERO);
    let moved = build_grid(1.0, 4, GRAY, Plane::Xz, -1.0, t);
    for (p, q) in base.points.iter().zip(&moved.points) {
        assert!((*q - *p - t).length() < 1e-6);
    }
}

#[test]
fn test_plane_offset_and_flat_color() {
    let grid = build_grid(1.0, 2, [1.0, 0.0, 0.0], Plane::Xy, -1.0, Vec3::ZERO);
    assert!(grid.points.iter().all(|p| p.z == -1.0));
    assert!(grid.colors.iter().all(|c| *c == [1.0, 0.0, 0.0]));
    assert_eq!(grid.segment_colors().len(), grid.segments.len());
}

#[test]
fn test_default_config_matches_reference_grid() {
    let config = GridConfig::default();
    assert_eq!(config.build(), build_grid(1.0, 10, GRAY, Plane::Xy, 0.0, Vec3::ZERO));
    // deterministic
    assert_eq!(config.build(), config.build());
}

#[test]
fn test_grid_config_from_json() {
    let config: GridConfig =
        serde_json::from_str(r#"{"size": 4.0, "plane": "xz", "translate": [0.0, 1.0, 0.0]}"#)
            .unwrap();
    assert_eq!(config.plane, Plane::Xz);
    assert_eq!(config.resolution, 10);
    assert_eq!(config.translate, Vec3::new(0.0, 1.0, 0.0));
}
