//! Ramp cutter (spec §4.6): two-stage pass that lowers sheer level
//! transitions into walkable grades, then carves explicit S-curve ramps
//! across the widest remaining transitions.
//!
//! Stage 1 runs `ramp.iterations` monotone-lowering sweeps with
//! double-buffering, so no cell ever reads a neighbour already written this
//! sweep: each cell is pulled 40% of the way toward the lowest height among
//! its 4-neighbours on a strictly lower level, never raised. Stage 2 places
//! `ramps_per_transition` explicit ramps per level-boundary pair, each a
//! short S-curve blend across `ramp_width` cells, and flags the cells it
//! touches.

use crate::config::RampConfig;
use crate::grid::Grid;

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < 1e-9 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Stage 1: iteratively pull each cell 40% of the way toward the lowest
/// height among its 4-neighbours that sit on a strictly lower level id,
/// monotonically lowering sheer level steps without ever raising a cell or
/// touching same-level terrain. Cells flagged road or blocked are left
/// untouched so an already-placed road grade survives this pass.
fn monotone_lower(grid: &mut Grid, cfg: &RampConfig, _cell_size: f32) {
    let cols = grid.cols;
    let rows = grid.rows;

    let mut buf = grid.height_plane().to_vec();
    for _ in 0..cfg.iterations {
        let prev = buf.clone();
        for y in 0..rows {
            for x in 0..cols {
                let i = y * cols + x;
                let flags = grid.get_flags(x, y);
                if flags.road() || flags.blocked() {
                    continue;
                }
                let level = grid.get_level_id(x, y);
                let h = prev[i];
                let mut min_neighbor_height = f32::INFINITY;
                for (nx, ny) in grid.neighbors4(x, y) {
                    if grid.get_level_id(nx, ny) < level {
                        min_neighbor_height = min_neighbor_height.min(prev[ny * cols + nx]);
                    }
                }
                if min_neighbor_height.is_finite() {
                    let target = 0.4 * min_neighbor_height + 0.6 * h;
                    buf[i] = h.min(target);
                }
            }
        }
    }
    grid.height_plane_mut().copy_from_slice(&buf);
}

/// A boundary run between two distinct level ids, used as a candidate site
/// for an explicit ramp.
struct TransitionSite {
    x: usize,
    y: usize,
    from_level: i8,
    to_level: i8,
    dx: i64,
    dy: i64,
}

fn find_transition_sites(grid: &Grid) -> Vec<TransitionSite> {
    let cols = grid.cols;
    let rows = grid.rows;
    let mut sites = Vec::new();
    for y in 0..rows {
        for x in 0..cols {
            let here = grid.get_level_id(x, y);
            if x + 1 < cols {
                let right = grid.get_level_id(x + 1, y);
                if right != here {
                    sites.push(TransitionSite { x, y, from_level: here, to_level: right, dx: 1, dy: 0 });
                }
            }
            if y + 1 < rows {
                let down = grid.get_level_id(x, y + 1);
                if down != here {
                    sites.push(TransitionSite { x, y, from_level: here, to_level: down, dx: 0, dy: 1 });
                }
            }
        }
    }
    sites
}

/// Stage 2: carve an explicit S-curve ramp of `ramp_width` cells starting at
/// `site`, perpendicular to the transition direction, blending between the
/// two levels' nominal heights.
fn carve_ramp(grid: &mut Grid, site: &TransitionSite, cfg: &RampConfig, level_step: f32, seed: u64) {
    let width = cfg.ramp_width.max(2);
    // Perpendicular direction to the transition edge, along which the ramp
    // actually runs (transitions are detected along dx/dy, the ramp itself
    // runs the other axis so it crosses the seam end-on).
    let (rdx, rdy): (i64, i64) = if site.dx != 0 { (0, 1) } else { (1, 0) };

    let from_h = site.from_level as f32 * level_step;
    let to_h = site.to_level as f32 * level_step;

    for step in 0..width {
        let t = step as f32 / (width - 1) as f32;
        // Quintic S-curve: flatter approach/departure than a plain smoothstep.
        let s = t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
        let base_x = site.x as i64 + rdx * step as i64 - (rdx * width as i64) / 2;
        let base_y = site.y as i64 + rdy * step as i64 - (rdy * width as i64) / 2;
        for lane in -1i64..=1 {
            let (x, y) = if site.dx != 0 {
                (base_x + lane, base_y)
            } else {
                (base_x, base_y + lane)
            };
            if !grid.in_bounds(x, y) {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            let existing = grid.get_flags(x, y);
            if existing.road() || existing.blocked() {
                continue;
            }
            let noise = (crate::noise::hash2(x as i64, y as i64, seed as u32) as f32 - 0.5) * cfg.noise_amplitude;
            let h = from_h + (to_h - from_h) * s + noise;
            grid.set_height(x, y, h);
            grid.with_flags(x, y, |f| {
                f.set_ramp(true);
                f.set_playable(true);
                f.set_blocked(false);
            });
        }
    }
}

/// Run the ramp cutter pass.
pub fn cut_ramps(grid: &mut Grid, cfg: &RampConfig, level_step: f32, cell_size: f32, seed: u64) {
    monotone_lower(grid, cfg, cell_size);

    let sites = find_transition_sites(grid);
    if sites.is_empty() {
        return;
    }

    use std::collections::HashMap;
    let mut by_pair: HashMap<(i8, i8), Vec<&TransitionSite>> = HashMap::new();
    for site in &sites {
        let key = (site.from_level.min(site.to_level), site.from_level.max(site.to_level));
        by_pair.entry(key).or_default().push(site);
    }

    for (_, candidates) in by_pair {
        let n = candidates.len();
        if n == 0 {
            continue;
        }
        let want = cfg.ramps_per_transition.max(1) as usize;
        for k in 0..want.min(n) {
            let idx = (k * n) / want.min(n).max(1);
            carve_ramp(grid, candidates[idx.min(n - 1)], cfg, level_step, seed ^ (k as u64).wrapping_mul(0x9E3779B1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped_grid() -> Grid {
        let mut g = Grid::new(32, 32).unwrap();
        for y in 0..32usize {
            for x in 0..32usize {
                let level = if x < 16 { 0 } else { 1 };
                g.set_level_id(x, y, level, level as f32 * 270.0);
            }
        }
        g
    }

    #[test]
    fn monotone_lowering_never_raises_height() {
        let mut g = stepped_grid();
        let before: Vec<f32> = g.height_plane().to_vec();
        monotone_lower(&mut g, &RampConfig::default(), 100.0);
        for (b, a) in before.iter().zip(g.height_plane()) {
            assert!(*a <= *b + 1e-4, "height increased: {b} -> {a}");
        }
    }

    #[test]
    fn carved_ramps_are_flagged_playable_and_not_blocked() {
        let mut g = stepped_grid();
        cut_ramps(&mut g, &RampConfig::default(), 270.0, 100.0, 42);
        let mut any_ramp = false;
        for y in 0..32 {
            for x in 0..32 {
                let f = g.get_flags(x, y);
                if f.ramp() {
                    any_ramp = true;
                    assert!(f.playable());
                    assert!(!f.blocked());
                }
            }
        }
        assert!(any_ramp, "expected at least one ramp cell to be carved");
    }

    #[test]
    fn no_transitions_is_a_no_op_for_stage_two() {
        let mut g = Grid::new(8, 8).unwrap();
        cut_ramps(&mut g, &RampConfig::default(), 270.0, 100.0, 1);
        for &f in g.flags_plane() {
            assert!(!f.ramp());
        }
    }
}
