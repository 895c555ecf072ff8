use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::viewer::Viewer;

/// World-to-camera rigid transform.
pub type Extrinsic = na::Matrix4<f64>;

/// Reads the current camera extrinsic from the viewer.
pub fn get_extrinsics<V: Viewer + ?Sized>(viewer: &V) -> Extrinsic {
    viewer.camera_extrinsic()
}

/// Restores a previously captured extrinsic. Intrinsics are left alone.
pub fn set_initial_view<V: Viewer + ?Sized>(viewer: &mut V, extrinsic: &Extrinsic) -> Result<()> {
    viewer.set_camera_extrinsic(extrinsic)
}

/// Camera pose as stored on disk, rows first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub extrinsic: [[f64; 4]; 4],
}

impl From<&Extrinsic> for CameraPose {
    fn from(m: &Extrinsic) -> Self {
        let mut extrinsic = [[0.0; 4]; 4];
        for (r, row) in extrinsic.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = m[(r, c)];
            }
        }
        CameraPose { extrinsic }
    }
}

impl From<CameraPose> for Extrinsic {
    fn from(pose: CameraPose) -> Self {
        Extrinsic::from_fn(|r, c| pose.extrinsic[r][c])
    }
}

/// Looks at the origin from above and behind, z up.
pub fn default_extrinsic() -> Extrinsic {
    let eye = na::Point3::new(0.0, -1.5, 1.5);
    let target = na::Point3::origin();
    let up = na::Vector3::z();
    na::Isometry3::look_at_rh(&eye, &target, &up).to_homogeneous()
}
