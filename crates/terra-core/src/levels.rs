//! Level assignment (spec §4.4): maps the scalar height field to a small
//! set of level ids using soft boundaries, then quantizes to the integer
//! `levelId` plane. Writes `levelId` and derived flags only; never touches
//! `height`.

use crate::config::LevelConfig;
use crate::grid::Grid;

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < 1e-9 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Blend height into `[0, 1]` against the four configured thresholds,
/// producing the continuous "blended level" the spec buckets afterward.
fn blended_level(h01: f32, cfg: &LevelConfig) -> f32 {
    let tw = cfg.transition_width.max(1e-4);
    let water = smoothstep(cfg.water_threshold - tw, cfg.water_threshold + tw, h01);
    let lowland = smoothstep(cfg.lowland_threshold - tw, cfg.lowland_threshold + tw, h01);
    let hill = smoothstep(cfg.hill_threshold - tw, cfg.hill_threshold + tw, h01);
    let mountain = smoothstep(cfg.mountain_threshold - tw, cfg.mountain_threshold + tw, h01);
    (water + lowland + hill + mountain) / 4.0
}

fn bucket(blended: f32) -> i8 {
    if blended < 0.1 {
        0
    } else if blended < 0.4 {
        1
    } else if blended < 0.6 {
        2
    } else {
        3
    }
}

/// Run level assignment. `min_height`/`max_height` normalize the already
/// scaled height plane back to `[0, 1]` before thresholding; pass the
/// engine-unit range synthesis was scaled to (typically `(0, height_scale)`).
pub fn assign_levels(grid: &mut Grid, cfg: &LevelConfig, min_height: f32, max_height: f32) {
    let range = (max_height - min_height).max(1e-6);
    let cols = grid.cols;
    let rows = grid.rows;

    for y in 0..rows {
        for x in 0..cols {
            let h = grid.get_height(x, y);
            let h01 = ((h - min_height) / range).clamp(0.0, 1.0);
            let blended = blended_level(h01, cfg);
            let level_id = bucket(blended).clamp(cfg.min_level, cfg.max_level);
            grid.set_level_id_only(x, y, level_id);

            grid.with_flags(x, y, |flags| {
                flags.set_underwater(level_id < 0);
                flags.set_visual_only(level_id > cfg.max_walkable_level);
                // Playability is refined by later passes (borders, ramps);
                // here it only reflects level-derived eligibility.
                flags.set_playable(level_id >= 0 && level_id <= cfg.max_walkable_level);
                flags.set_water(level_id < 0);
            });
        }
    }
}
