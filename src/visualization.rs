use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::features::FeatureTable;
use crate::viewer::{PointCloud, Rgba};

pub const ORANGE: Rgba = (255, 188, 0, 255);

/// Stable pseudo-random color for a feature id.
pub fn id_to_color(id: u64) -> Rgba {
    let mut rng = ChaCha8Rng::seed_from_u64(id);
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

/// Points of `table`, each colored by its id column.
pub fn colored_by_id(table: &FeatureTable) -> PointCloud {
    PointCloud {
        positions: table.positions(),
        colors: table.ids().map(|id| id_to_color(id as u64)).collect(),
    }
}

/// Points of `table` in a single color.
pub fn colored_flat(table: &FeatureTable, color: Rgba) -> PointCloud {
    let positions = table.positions();
    let colors = vec![color; positions.len()];
    PointCloud { positions, colors }
}

pub(crate) fn rgb_f32_to_u8(c: [f32; 3]) -> Rgba {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    (to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), 255)
}
