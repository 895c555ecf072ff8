use feature_map_viewer::camera::{CameraPose, Extrinsic, get_extrinsics, set_initial_view};
use feature_map_viewer::grid::{GridConfig, Plane};
use feature_map_viewer::io::{object_from_json, object_to_json};
use feature_map_viewer::viewer::{
    Geometry, HeadlessViewer, PointCloud, Viewer, ViewerConfig, init_vis, init_vis_with,
    update_points,
};
use glam::Vec3;
use nalgebra as na;
use tempfile::TempDir;

#[test]
fn test_init_vis_registers_three_geometries() {
    let mut viewer = HeadlessViewer::new();
    let handle = init_vis(&mut viewer, -40.0, 800, 400).unwrap();

    assert_eq!(viewer.window, Some(("3D Viewer".to_string(), 800, 400)));
    let names: Vec<&str> = viewer.geometries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["points", "axis", "grid"]);
    assert!(handle.cloud.is_empty());
    assert!(matches!(
        viewer.geometry(handle.id),
        Some(Geometry::PointCloud(c)) if c.is_empty()
    ));
    match &viewer.geometries[2].1 {
        Geometry::LineSet(grid) => {
            assert_eq!(grid.points.len(), 44);
            assert_eq!(*grid, GridConfig::default().build());
        }
        other => panic!("unexpected geometry {other:?}"),
    }
    assert_eq!(
        viewer.geometries[1].1,
        Geometry::CoordinateFrame { size: 0.1 }
    );
}

#[test]
fn test_update_points_is_staged_until_pushed() {
    let mut viewer = HeadlessViewer::new();
    let mut handle = init_vis(&mut viewer, -40.0, 1200, 600).unwrap();
    let cloud = PointCloud {
        positions: vec![Vec3::ONE, Vec3::X],
        colors: vec![(1, 2, 3, 255), (4, 5, 6, 255)],
    };

    update_points(&mut handle, cloud.clone());
    assert_eq!(handle.cloud, cloud);
    assert!(viewer.point_cloud(handle.id).unwrap().is_empty());

    viewer.update_point_cloud(handle.id, &handle.cloud).unwrap();
    assert_eq!(viewer.point_cloud(handle.id), Some(&cloud));
}

#[test]
fn test_extrinsic_round_trip() {
    let mut viewer = HeadlessViewer::new();
    init_vis(&mut viewer, -40.0, 1200, 600).unwrap();

    let captured = get_extrinsics(&viewer);
    let moved = na::Isometry3::translation(0.0, 0.0, -3.0).to_homogeneous();
    set_initial_view(&mut viewer, &moved).unwrap();
    assert_eq!(get_extrinsics(&viewer), moved);

    set_initial_view(&mut viewer, &captured).unwrap();
    assert_eq!(get_extrinsics(&viewer), captured);
}

#[test]
fn test_config_applies_initial_view_and_grid() {
    let mut pose_matrix = Extrinsic::identity();
    pose_matrix[(1, 3)] = 2.0;
    let config = ViewerConfig {
        title: "map".to_string(),
        grid: GridConfig {
            plane: Plane::Xz,
            resolution: 4,
            ..Default::default()
        },
        initial_view: Some(CameraPose::from(&pose_matrix)),
        ..Default::default()
    };
    let mut viewer = HeadlessViewer::new();
    init_vis_with(&mut viewer, &config).unwrap();

    assert_eq!(viewer.camera_extrinsic(), pose_matrix);
    match &viewer.geometries[2].1 {
        Geometry::LineSet(grid) => assert_eq!(grid.points.len(), 20),
        other => panic!("unexpected geometry {other:?}"),
    }
}

#[test]
fn test_viewer_config_json_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("viewer.json");
    let mut m = Extrinsic::identity();
    m[(0, 3)] = 0.5;
    let config = ViewerConfig {
        width: 640,
        initial_view: Some(CameraPose::from(&m)),
        ..Default::default()
    };

    object_to_json(&path, &config).unwrap();
    let loaded: ViewerConfig = object_from_json(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(Extrinsic::from(loaded.initial_view.unwrap()), m);
}

#[test]
fn test_partial_viewer_config_uses_defaults() {
    let config: ViewerConfig = serde_json::from_str(r#"{"height": 300}"#).unwrap();
    assert_eq!(config.height, 300);
    assert_eq!(config.width, 1200);
    assert_eq!(config.title, "3D Viewer");
    assert!(config.initial_view.is_none());
}

#[test]
fn test_missing_json_is_io_error() {
    let result: feature_map_viewer::Result<ViewerConfig> =
        object_from_json(std::path::Path::new("non_existent_path/viewer.json"));
    assert!(matches!(result, Err(feature_map_viewer::Error::Io { .. })));
}
