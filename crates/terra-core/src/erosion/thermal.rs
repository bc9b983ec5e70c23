//! Thermal erosion: redistributes material from a cell to every downhill
//! 8-neighbour whose grade exceeds the talus angle, proportional to each
//! neighbour's share of the total excess. Double-buffered so every cell in
//! a pass reads only the previous pass's heights, never a neighbour already
//! written this pass.

use crate::config::ErosionConfig;
use crate::grid::Grid;

pub fn apply_thermal(grid: &mut Grid, cfg: &ErosionConfig, cell_size: f32) {
    let cols = grid.cols;
    let rows = grid.rows;
    let talus_slope = cfg.talus_angle.to_radians().tan();
    let diag = cell_size * std::f32::consts::SQRT_2;

    let mut heights = grid.height_plane().to_vec();

    for _ in 0..cfg.thermal_iterations {
        let prev = heights.clone();
        let mut delta = vec![0.0f32; cols * rows];

        for y in 0..rows {
            for x in 0..cols {
                let i = y * cols + x;
                let h = prev[i];

                // Collect every downhill neighbour exceeding talus angle,
                // with its excess height (not slope) over the talus line.
                let mut qualifying: Vec<(usize, f32)> = Vec::new();
                for (nx, ny) in grid.neighbors8(x, y) {
                    let nj = ny * cols + nx;
                    let nh = prev[nj];
                    if nh >= h {
                        continue;
                    }
                    let run = if nx != x && ny != y { diag } else { cell_size };
                    let slope = (h - nh) / run.max(1e-6);
                    if slope > talus_slope {
                        let excess_height = (slope - talus_slope) * run;
                        qualifying.push((nj, excess_height));
                    }
                }

                if qualifying.is_empty() {
                    continue;
                }

                let total_excess: f32 = qualifying.iter().map(|&(_, e)| e).sum();
                let max_excess = qualifying.iter().fold(0.0f32, |m, &(_, e)| m.max(e));
                let mean_excess = total_excess / qualifying.len() as f32;
                let remove = (max_excess * 0.5).min(mean_excess * cfg.erosion_strength * 0.5).max(0.0);

                delta[i] -= remove;
                for (nj, excess_height) in qualifying {
                    delta[nj] += remove * excess_height / total_excess;
                }
            }
        }

        for i in 0..heights.len() {
            heights[i] = prev[i] + delta[i];
        }
    }

    grid.height_plane_mut().copy_from_slice(&heights);
}
