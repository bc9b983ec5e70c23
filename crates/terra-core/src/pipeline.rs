//! Generation pipeline orchestrator (spec §2): sequences every pass over a
//! freshly allocated grid and reports warnings for conditions the spec asks
//! to be recovered from rather than aborted on.

use crate::borders::apply_borders;
use crate::config::GenerationParams;
use crate::erosion::erode;
use crate::error::Result;
use crate::grid::Grid;
use crate::levels::assign_levels;
use crate::ramps::cut_ramps;
use crate::roads::build_roads;
use crate::stamps::{apply_stamps, StampCatalog};
use crate::synth::synthesize;

/// Output of a full generation run: the finished grid plus any warnings
/// raised along the way (e.g. a detail layer naming an unknown stamp id,
/// which degrades to a fallback shape rather than aborting the run).
#[derive(Debug)]
pub struct PipelineResult {
    pub grid: Grid,
    pub warnings: Vec<String>,
    /// Row-major height plane as it stood immediately before the detail
    /// stamp pass ran, so the export layer can reproduce the pre-stamp
    /// heightmap on demand (spec §4.8).
    pub pre_stamp_heights: Vec<f32>,
}

/// Run the full generation pipeline: validate parameters, then synthesize,
/// assign levels, cut borders and ramps, erode, stamp detail, and build
/// roads, in that order (spec §2).
pub fn generate(params: &GenerationParams, catalog: &StampCatalog, seed: u64) -> Result<PipelineResult> {
    params.validate()?;

    // This implementation has no GPU regime (spec's design notes sanction a
    // CPU-only build); record the fallback once, synthetically, rather than
    // pretending a GPU path was attempted and failed.
    let mut warnings = vec![crate::error::Error::GpuUnavailable { reason: "CPU-only build".into() }.to_string()];
    let mut grid = Grid::new(params.grid.cols, params.grid.rows)?;

    synthesize(&mut grid, &params.noise);

    let (min_h, max_h) = height_extent(&grid);
    assign_levels(&mut grid, &params.level, min_h, max_h.max(min_h + 1e-3));

    apply_borders(&mut grid, &params.border, (seed & 0xFFFF_FFFF) as u32);

    cut_ramps(&mut grid, &params.ramp, params.level.level_step, params.grid.cell_size_units, seed);

    erode(&mut grid, &params.erosion, params.grid.cell_size_units, seed ^ 0xA5A5_A5A5_A5A5_A5A5);

    for layer in &params.detail.layers {
        if catalog.get(&layer.stamp_id).is_none() {
            warnings.push(format!("detail layer references unknown stamp id '{}', using fallback shape", layer.stamp_id));
        }
    }
    let pre_stamp_heights = grid.height_plane().to_vec();
    apply_stamps(&mut grid, &params.detail, catalog);

    for err in build_roads(&mut grid, &params.road, params.level.max_walkable_level, params.level.level_step) {
        warnings.push(err.to_string());
    }

    Ok(PipelineResult { grid, warnings, pre_stamp_heights })
}

fn height_extent(grid: &Grid) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &h in grid.height_plane() {
        min = min.min(h);
        max = max.max(h);
    }
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}
