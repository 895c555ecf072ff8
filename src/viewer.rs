use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::{self, CameraPose, Extrinsic};
use crate::error::Result;
use crate::grid::{GridConfig, GridGeometry};

pub type Rgba = (u8, u8, u8, u8);

/// Displayed points with one color per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgba>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends `other` below the current points.
    pub fn stack(&mut self, other: &PointCloud) {
        self.positions.extend_from_slice(&other.positions);
        self.colors.extend_from_slice(&other.colors);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    PointCloud(PointCloud),
    LineSet(GridGeometry),
    /// RGB axis marker at the origin.
    CoordinateFrame { size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// What the replay needs from a 3D viewer.
pub trait Viewer {
    fn create_window(&mut self, title: &str, width: u32, height: u32) -> Result<()>;
    fn add_geometry(&mut self, name: &str, geometry: &Geometry) -> Result<GeometryId>;
    fn update_point_cloud(&mut self, id: GeometryId, cloud: &PointCloud) -> Result<()>;
    /// Processes pending input. Returns `false` once the viewer has gone away.
    fn poll_events(&mut self) -> Result<bool>;
    fn render_frame(&mut self) -> Result<()>;
    fn camera_extrinsic(&self) -> Extrinsic;
    fn set_camera_extrinsic(&mut self, extrinsic: &Extrinsic) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Kept for command compatibility, no effect on the view.
    pub fov_step: f32,
    pub axis_size: f32,
    pub grid: GridConfig,
    pub initial_view: Option<CameraPose>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "3D Viewer".to_string(),
            width: 1200,
            height: 600,
            fov_step: -40.0,
            axis_size: 0.1,
            grid: GridConfig::default(),
            initial_view: None,
        }
    }
}

/// The mutable point cloud registered with a viewer.
#[derive(Debug, Clone)]
pub struct PointCloudHandle {
    pub id: GeometryId,
    pub cloud: PointCloud,
}

/// Opens a window and registers an empty point cloud, an axis marker and the
/// default reference grid.
pub fn init_vis<V: Viewer + ?Sized>(
    viewer: &mut V,
    fov_step: f32,
    width: u32,
    height: u32,
) -> Result<PointCloudHandle> {
    let config = ViewerConfig {
        fov_step,
        width,
        height,
        ..Default::default()
    };
    init_vis_with(viewer, &config)
}

pub fn init_vis_with<V: Viewer + ?Sized>(
    viewer: &mut V,
    config: &ViewerConfig,
) -> Result<PointCloudHandle> {
    log::debug!("fov_step {} ignored", config.fov_step);
    viewer.create_window(&config.title, config.width, config.height)?;

    let cloud = PointCloud::default();
    let id = viewer.add_geometry("points", &Geometry::PointCloud(cloud.clone()))?;
    viewer.add_geometry(
        "axis",
        &Geometry::CoordinateFrame {
            size: config.axis_size,
        },
    )?;
    viewer.add_geometry("grid", &Geometry::LineSet(config.grid.build()))?;

    if let Some(pose) = config.initial_view {
        camera::set_initial_view(viewer, &Extrinsic::from(pose))?;
    }
    Ok(PointCloudHandle { id, cloud })
}

/// Replaces every point of `handle`. The viewer only sees the change after
/// `Viewer::update_point_cloud`.
pub fn update_points(handle: &mut PointCloudHandle, cloud: PointCloud) {
    handle.cloud = cloud;
}

/// Viewer that keeps everything in memory and draws nothing.
#[derive(Debug, Clone)]
pub struct HeadlessViewer {
    pub window: Option<(String, u32, u32)>,
    pub geometries: Vec<(String, Geometry)>,
    pub rendered_frames: usize,
    pub polls: usize,
    close_after_polls: Option<usize>,
    extrinsic: Extrinsic,
}

impl Default for HeadlessViewer {
    fn default() -> Self {
        Self {
            window: None,
            geometries: Vec::new(),
            rendered_frames: 0,
            polls: 0,
            close_after_polls: None,
            extrinsic: camera::default_extrinsic(),
        }
    }
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports the window as closed from poll number `polls` onwards.
    pub fn closing_after(polls: usize) -> Self {
        Self {
            close_after_polls: Some(polls),
            ..Self::default()
        }
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0).map(|(_, g)| g)
    }

    pub fn point_cloud(&self, id: GeometryId) -> Option<&PointCloud> {
        match self.geometry(id) {
            Some(Geometry::PointCloud(cloud)) => Some(cloud),
            _ => None,
        }
    }
}

impl Viewer for HeadlessViewer {
    fn create_window(&mut self, title: &str, width: u32, height: u32) -> Result<()> {
        self.window = Some((title.to_string(), width, height));
        Ok(())
    }

    fn add_geometry(&mut self, name: &str, geometry: &Geometry) -> Result<GeometryId> {
        self.geometries.push((name.to_string(), geometry.clone()));
        Ok(GeometryId(self.geometries.len() - 1))
    }

    fn update_point_cloud(&mut self, id: GeometryId, cloud: &PointCloud) -> Result<()> {
        if let Some((_, geometry)) = self.geometries.get_mut(id.0) {
            *geometry = Geometry::PointCloud(cloud.clone());
        } else {
            log::warn!("no geometry registered under {:?}", id);
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Result<bool> {
        self.polls += 1;
        Ok(self.close_after_polls.is_none_or(|n| self.polls < n))
    }

    fn render_frame(&mut self) -> Result<()> {
        self.rendered_frames += 1;
        Ok(())
    }

    fn camera_extrinsic(&self) -> Extrinsic {
        self.extrinsic
    }

    fn set_camera_extrinsic(&mut self, extrinsic: &Extrinsic) -> Result<()> {
        self.extrinsic = *extrinsic;
        Ok(())
    }
}
