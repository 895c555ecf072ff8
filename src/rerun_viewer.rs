use std::path::PathBuf;

use rerun::{RecordingStream, RecordingStreamBuilder, TimeCell};

use crate::camera::{self, Extrinsic};
use crate::error::{Error, Result};
use crate::viewer::{Geometry, GeometryId, PointCloud, Viewer};
use crate::visualization::rgb_f32_to_u8;

const CAMERA_FOV_Y: f32 = std::f32::consts::FRAC_PI_3;
const POINT_RADIUS_UI: f32 = 3.0;

/// Where the recording goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RerunSink {
    /// Start a native viewer and stream to it.
    #[default]
    Spawn,
    /// Write an `.rrd` file.
    Save(PathBuf),
}

/// [`Viewer`] on top of a rerun recording stream.
///
/// Static geometry is logged once. Point cloud updates are staged and logged
/// on the `frame` timeline when the frame is rendered.
pub struct RerunViewer {
    sink: RerunSink,
    rec: Option<RecordingStream>,
    aspect_ratio: f32,
    entities: Vec<String>,
    pending: Vec<(GeometryId, PointCloud)>,
    frame: i64,
    extrinsic: Extrinsic,
}

impl RerunViewer {
    pub fn new(sink: RerunSink) -> Self {
        Self {
            sink,
            rec: None,
            aspect_ratio: 2.0,
            entities: Vec::new(),
            pending: Vec::new(),
            frame: 0,
            extrinsic: camera::default_extrinsic(),
        }
    }

    fn rec(&self) -> Result<&RecordingStream> {
        self.rec.as_ref().ok_or(Error::WindowNotOpen)
    }

    fn entity_path(&self, name: &str) -> String {
        format!("world/{}", name)
    }

    fn log_point_cloud(&self, path: &str, cloud: &PointCloud) -> Result<()> {
        let positions = cloud.positions.iter().map(|p| p.to_array());
        self.rec()?.log(
            path,
            &rerun::Points3D::new(positions)
                .with_colors(cloud.colors.iter().copied())
                .with_radii([rerun::Radius::new_ui_points(POINT_RADIUS_UI)]),
        )?;
        Ok(())
    }

    fn log_camera(&self) -> Result<()> {
        let rec = self.rec()?;
        let m = &self.extrinsic;
        let translation = [m[(0, 3)] as f32, m[(1, 3)] as f32, m[(2, 3)] as f32];
        // rerun matrices are column major
        let columns: [[f32; 3]; 3] =
            std::array::from_fn(|c| std::array::from_fn(|r| m[(r, c)] as f32));
        rec.log_static(
            "world/camera",
            &rerun::Transform3D::from_translation_mat3x3(translation, columns)
                .with_relation(rerun::components::TransformRelation::ChildFromParent),
        )?;
        rec.log_static(
            "world/camera",
            &rerun::Pinhole::from_fov_and_aspect_ratio(CAMERA_FOV_Y, self.aspect_ratio)
                .with_camera_xyz(rerun::components::ViewCoordinates::RDF)
                .with_image_plane_distance(0.1),
        )?;
        Ok(())
    }
}

impl Viewer for RerunViewer {
    fn create_window(&mut self, title: &str, width: u32, height: u32) -> Result<()> {
        let builder = RecordingStreamBuilder::new(title);
        let rec = match &self.sink {
            RerunSink::Spawn => builder.spawn()?,
            RerunSink::Save(path) => builder.save(path)?,
        };
        log::info!("opened {:?} ({}x{}) on {:?}", title, width, height, self.sink);
        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;
        self.aspect_ratio = width as f32 / height.max(1) as f32;
        self.rec = Some(rec);
        self.log_camera()
    }

    fn add_geometry(&mut self, name: &str, geometry: &Geometry) -> Result<GeometryId> {
        let path = self.entity_path(name);
        let rec = self.rec()?;
        match geometry {
            Geometry::PointCloud(cloud) => self.log_point_cloud(&path, cloud)?,
            Geometry::LineSet(grid) => {
                let strips = grid
                    .segment_endpoints()
                    .map(|(a, b)| vec![a.to_array(), b.to_array()]);
                let colors = grid.segment_colors().iter().map(|c| rgb_f32_to_u8(*c));
                rec.log_static(
                    path.as_str(),
                    &rerun::LineStrips3D::new(strips).with_colors(colors),
                )?;
            }
            Geometry::CoordinateFrame { size } => {
                let s = *size;
                rec.log_static(
                    path.as_str(),
                    &rerun::Arrows3D::from_vectors([[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]])
                        .with_colors([
                            rerun::Color::from_rgb(255, 0, 0),
                            rerun::Color::from_rgb(0, 255, 0),
                            rerun::Color::from_rgb(0, 0, 255),
                        ]),
                )?;
            }
        }
        self.entities.push(path);
        Ok(GeometryId(self.entities.len() - 1))
    }

    fn update_point_cloud(&mut self, id: GeometryId, cloud: &PointCloud) -> Result<()> {
        self.pending.retain(|(pending_id, _)| *pending_id != id);
        self.pending.push((id, cloud.clone()));
        Ok(())
    }

    /// rerun gives no close notification, so this stays `true` while the
    /// stream is enabled, even after a spawned viewer window is closed.
    fn poll_events(&mut self) -> Result<bool> {
        Ok(self.rec()?.is_enabled())
    }

    fn render_frame(&mut self) -> Result<()> {
        self.rec()?
            .set_time("frame", TimeCell::from_sequence(self.frame));
        for (id, cloud) in std::mem::take(&mut self.pending) {
            match self.entities.get(id.0) {
                Some(path) => self.log_point_cloud(path, &cloud)?,
                None => log::warn!("no geometry registered under {:?}", id),
            }
        }
        self.frame += 1;
        Ok(())
    }

    /// Last pose given to `set_camera_extrinsic`. The rerun view camera is
    /// driven by the user and is never read back.
    fn camera_extrinsic(&self) -> Extrinsic {
        self.extrinsic
    }

    /// Places a `world/camera` entity (transform and frustum) at `extrinsic`.
    /// The interactive 3D view itself does not move.
    fn set_camera_extrinsic(&mut self, extrinsic: &Extrinsic) -> Result<()> {
        self.extrinsic = *extrinsic;
        if self.rec.is_some() {
            self.log_camera()?;
        }
        Ok(())
    }
}
