//! Border barriers (spec §4.5): enforce map-edge impassability with
//! deliberate exits threaded through for roads.

use crate::config::{BorderConfig, BorderKind};
use crate::grid::{BoundaryType, Grid};
use crate::noise::fbm_fn;

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < 1e-9 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    North,
    South,
    West,
    East,
}

struct ExitSpec {
    edge: Edge,
    center: usize,
    width: usize,
}

/// Auto-distribute `exit_count` exits across edges following spec §4.5's
/// rule: 1 → south only; 2 → north+south; 3 → north+east+south; 4+ → one
/// per edge then extras distributed round-robin.
fn auto_exit_specs(exit_count: u32, cols: usize, rows: usize, exit_width: usize) -> Vec<ExitSpec> {
    let mid_x = cols / 2;
    let mid_y = rows / 2;
    let mut edges: Vec<Edge> = match exit_count {
        0 => vec![],
        1 => vec![Edge::South],
        2 => vec![Edge::North, Edge::South],
        3 => vec![Edge::North, Edge::East, Edge::South],
        n => {
            let base = vec![Edge::North, Edge::East, Edge::South, Edge::West];
            let mut v = base.clone();
            let mut i = 0usize;
            while v.len() < n as usize {
                v.push(base[i % 4]);
                i += 1;
            }
            v
        }
    };
    edges.truncate(exit_count as usize);

    // When multiple exits land on the same edge, spread them evenly along it.
    let mut per_edge_count: std::collections::HashMap<Edge, usize> = std::collections::HashMap::new();
    for e in &edges {
        *per_edge_count.entry(*e).or_insert(0) += 1;
    }
    let mut per_edge_seen: std::collections::HashMap<Edge, usize> = std::collections::HashMap::new();

    edges
        .into_iter()
        .map(|edge| {
            let count = per_edge_count[&edge];
            let seen = per_edge_seen.entry(edge).or_insert(0);
            let idx = *seen;
            *seen += 1;
            let span = match edge {
                Edge::North | Edge::South => cols,
                Edge::West | Edge::East => rows,
            };
            let center = if count == 1 {
                match edge {
                    Edge::North | Edge::South => mid_x,
                    Edge::West | Edge::East => mid_y,
                }
            } else {
                ((idx + 1) * span / (count + 1)).min(span.saturating_sub(1))
            };
            ExitSpec { edge, center, width: exit_width.max(1) }
        })
        .collect()
}

fn explicit_exit_specs(positions: &[(usize, usize)], cols: usize, rows: usize, exit_width: usize) -> Vec<ExitSpec> {
    positions
        .iter()
        .map(|&(x, y)| {
            let dn = y;
            let ds = rows.saturating_sub(1).saturating_sub(y);
            let dw = x;
            let de = cols.saturating_sub(1).saturating_sub(x);
            let min = dn.min(ds).min(dw).min(de);
            let (edge, center) = if min == dn {
                (Edge::North, x)
            } else if min == ds {
                (Edge::South, x)
            } else if min == dw {
                (Edge::West, y)
            } else {
                (Edge::East, y)
            };
            ExitSpec { edge, center, width: exit_width.max(1) }
        })
        .collect()
}

/// Distance of cell `(x, y)` from `edge`, and the cell's coordinate along
/// that edge (used to test exit proximity).
fn edge_distance_and_coord(edge: Edge, x: usize, y: usize, cols: usize, rows: usize) -> (usize, usize) {
    match edge {
        Edge::North => (y, x),
        Edge::South => (rows.saturating_sub(1).saturating_sub(y), x),
        Edge::West => (x, y),
        Edge::East => (cols.saturating_sub(1).saturating_sub(x), y),
    }
}

/// Suppression factor in `[0, 1]`: 0 fully inside an exit's opening, 1 far
/// from every exit on this edge.
fn exit_suppression(edge: Edge, coord: usize, exits: &[ExitSpec]) -> f32 {
    let mut min_factor = 1.0f32;
    for ex in exits {
        if ex.edge != edge {
            continue;
        }
        let dist = (coord as i64 - ex.center as i64).unsigned_abs() as f32;
        let half = ex.width as f32 * 0.5;
        let factor = smoothstep(0.0, half.max(1.0), dist);
        min_factor = min_factor.min(factor);
    }
    min_factor
}

/// Run the border barrier pass.
pub fn apply_borders(grid: &mut Grid, cfg: &BorderConfig, seed32: u32) {
    if !cfg.enabled || cfg.kind == BorderKind::None {
        return;
    }

    let cols = grid.cols;
    let rows = grid.rows;
    let border_width = cfg.width.max(1);

    let exits = if !cfg.exit_positions.is_empty() {
        explicit_exit_specs(&cfg.exit_positions, cols, rows, cfg.exit_width)
    } else {
        auto_exit_specs(cfg.exit_count, cols, rows, cfg.exit_width)
    };

    const EDGES: [Edge; 4] = [Edge::North, Edge::South, Edge::West, Edge::East];

    for y in 0..rows {
        for x in 0..cols {
            // Combine barrier factor across whichever edges are within range
            // (handles corners, which are near two edges at once).
            let mut barrier_factor = 0.0f32;
            let mut is_boundary = false;

            for &edge in &EDGES {
                let (d, coord) = edge_distance_and_coord(edge, x, y, cols, rows);
                if d >= border_width {
                    continue;
                }
                is_boundary = true;
                let t = d as f32 / border_width as f32;
                let smooth_t = 3.0 * t * t - 2.0 * t * t * t;
                let exponent = 1.0 / (cfg.smoothness + 0.1);
                let mut factor = (1.0 - smooth_t).max(0.0).powf(exponent);
                factor *= exit_suppression(edge, coord, &exits);
                barrier_factor = barrier_factor.max(factor);
            }

            if !is_boundary {
                continue;
            }

            grid.set_boundary_type(x, y, Some(BoundaryType::Edge));
            grid.with_flags(x, y, |f| f.set_boundary(true));

            let noise_offset = (fbm_fn(x as f64 * 0.05, y as f64 * 0.05, seed32, 3, 0.5, 2.0) as f32 - 0.5) * 40.0;
            let is_exit = barrier_factor < 0.05;

            if is_exit {
                // Smoothly lower toward the exit floor so roads can thread
                // through without a sheer drop at the barrier's inner edge.
                let h = grid.get_height(x, y);
                let exit_floor = match cfg.kind {
                    BorderKind::Water => -cfg.height * 0.5,
                    _ => h * 0.3,
                };
                grid.set_height(x, y, h + (exit_floor - h) * (1.0 - barrier_factor));
                grid.with_flags(x, y, |f| {
                    f.set_road(true);
                    f.set_playable(true);
                    f.set_visual_only(false);
                    f.set_cliff(false);
                    f.set_water(false);
                });
                continue;
            }

            match cfg.kind {
                BorderKind::Mountain => {
                    let h = grid.get_height(x, y);
                    let target = barrier_factor * cfg.height + noise_offset;
                    grid.set_height(x, y, h.max(target));
                    if barrier_factor > 0.3 {
                        grid.with_flags(x, y, |f| {
                            f.set_visual_only(true);
                            f.set_playable(false);
                        });
                    }
                }
                BorderKind::Cliff => {
                    let h = grid.get_height(x, y);
                    let floor = -cfg.height * 0.5 + noise_offset * 0.25;
                    grid.set_height(x, y, h - barrier_factor * (h - floor).max(0.0));
                    grid.with_flags(x, y, |f| {
                        f.set_visual_only(true);
                        f.set_cliff(true);
                        f.set_playable(false);
                    });
                }
                BorderKind::Water => {
                    let h = grid.get_height(x, y);
                    let target = -cfg.height * 0.5 + noise_offset * 0.25;
                    grid.set_height(x, y, h + (target - h) * barrier_factor);
                    grid.with_flags(x, y, |f| {
                        f.set_water(true);
                        f.set_playable(false);
                    });
                }
                BorderKind::None => unreachable!(),
            }
        }
    }
}
