//! Erosion (spec §4.7): thermal talus redistribution followed by a
//! hydraulic droplet pass, both operating purely on the height plane.

pub mod hydraulic;
pub mod thermal;

use crate::config::ErosionConfig;
use crate::grid::Grid;

/// Run the full erosion stage: thermal first (it stabilizes the steepest
/// slopes the droplet pass would otherwise race down unrealistically fast),
/// then hydraulic.
pub fn erode(grid: &mut Grid, cfg: &ErosionConfig, cell_size: f32, seed: u64) {
    if cfg.thermal_enabled {
        thermal::apply_thermal(grid, cfg, cell_size);
    }
    if cfg.hydraulic_enabled {
        hydraulic::apply_hydraulic(grid, cfg, cell_size, seed);
    }
}
