use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Axis-aligned plane spanned by the reference grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    #[default]
    Xy,
    Xz,
}

impl FromStr for Plane {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xy" => Ok(Plane::Xy),
            "xz" => Ok(Plane::Xz),
            _ => Err(Error::UnknownPlane(s.to_string())),
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Xy => write!(f, "xy"),
            Plane::Xz => write!(f, "xz"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: f32,
    pub resolution: usize,
    pub color: [f32; 3],
    pub plane: Plane,
    pub plane_offset: f32,
    pub translate: Vec3,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            resolution: 10,
            color: [0.5, 0.5, 0.5],
            plane: Plane::Xy,
            plane_offset: 0.0,
            translate: Vec3::ZERO,
        }
    }
}

impl GridConfig {
    pub fn build(&self) -> GridGeometry {
        build_grid(
            self.size,
            self.resolution,
            self.color,
            self.plane,
            self.plane_offset,
            self.translate,
        )
    }
}

/// Static wireframe plane. Segment `k` joins points `2k` and `2k + 1`.
///
/// `colors` holds one entry per point minus one, the first `segments.len()`
/// of which are the segment colors.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub points: Vec<Vec3>,
    pub segments: Vec<[u32; 2]>,
    pub colors: Vec<[f32; 3]>,
}

impl GridGeometry {
    /// Color of each segment, in segment order.
    pub fn segment_colors(&self) -> &[[f32; 3]] {
        &self.colors[..self.segments.len().min(self.colors.len())]
    }

    pub fn segment_endpoints(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.segments
            .iter()
            .map(|[a, b]| (self.points[*a as usize], self.points[*b as usize]))
    }
}

/// Builds a square cross-hatch of `size` with `resolution` subdivisions per axis.
///
/// Lines parallel to the second axis are emitted first, then lines parallel to
/// the first axis. An `Xz` grid is the `Xy` grid with the second and third
/// coordinates swapped; `translate` is applied last.
pub fn build_grid(
    size: f32,
    resolution: usize,
    color: [f32; 3],
    plane: Plane,
    plane_offset: f32,
    translate: Vec3,
) -> GridGeometry {
    let step = size / resolution.max(1) as f32;
    let half = 0.5 * size;
    let mut points = Vec::with_capacity(4 * (resolution + 1));

    for i in 0..=resolution {
        let x = -half + i as f32 * step;
        points.push(Vec3::new(x, -half, plane_offset));
        points.push(Vec3::new(x, half, plane_offset));
    }
    for i in 0..=resolution {
        let y = -half + i as f32 * step;
        points.push(Vec3::new(-half, y, plane_offset));
        points.push(Vec3::new(half, y, plane_offset));
    }

    let points: Vec<Vec3> = points
        .into_iter()
        .map(|p| match plane {
            Plane::Xy => p,
            Plane::Xz => Vec3::new(p.x, p.z, p.y),
        })
        .map(|p| p + translate)
        .collect();

    let segments = (0..points.len() as u32 / 2)
        .map(|k| [2 * k, 2 * k + 1])
        .collect();
    let colors = vec![color; points.len() - 1];

    GridGeometry {
        points,
        segments,
        colors,
    }
}
