//! A* pathfinding across the grid (spec §4.9): cost is distance plus a
//! slope penalty, with boundary and water cells impassable. Hand-rolled
//! with a `BinaryHeap`, same approach the rest of the crate uses for
//! anything graph-shaped rather than pulling in a pathfinding crate.

use crate::grid::Grid;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoredNode {
    cost: f32,
    x: usize,
    y: usize,
}

impl Eq for ScoredNode {}

impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap via reversed partial_cmp; NaN cost is never produced.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(x: usize, y: usize, gx: usize, gy: usize) -> f32 {
    (((x as f32 - gx as f32).powi(2) + (y as f32 - gy as f32).powi(2)).sqrt())
}

/// Step cost from `from` to `to` (spec §4.9.3): impassable terrain returns
/// `None`; otherwise distance (diagonal ×1.2) times a terrain-preference
/// multiplier (ramp cheapest, then road, then playable, default worst),
/// plus a height-difference surcharge and a proximity surcharge near
/// cliffs/visual-only terrain.
fn step_cost(grid: &Grid, from: (usize, usize), to: (usize, usize), walkable_cap: i8) -> Option<f32> {
    let f = grid.get_flags(to.0, to.1);
    if f.boundary() || f.water() || f.blocked() || f.visual_only() {
        return None;
    }
    if grid.get_level_id(to.0, to.1) > walkable_cap {
        return None;
    }

    let from_flags = grid.get_flags(from.0, from.1);
    let diagonal = from.0 != to.0 && from.1 != to.1;
    let dist = if diagonal { std::f32::consts::SQRT_2 } else { 1.0 };

    let dh = (grid.get_height(to.0, to.1) - grid.get_height(from.0, from.1)).abs();
    let ramp_adjacent = f.ramp() || from_flags.ramp();
    let level_diff = (grid.get_level_id(to.0, to.1) - grid.get_level_id(from.0, from.1)).abs();

    if dh > 30.0 && !ramp_adjacent {
        return None;
    }
    if level_diff > 0 && !ramp_adjacent {
        return None;
    }

    let mut mult = if f.ramp() {
        0.1
    } else if f.road() {
        0.2
    } else if f.playable() {
        0.5
    } else {
        1.0
    };
    if diagonal {
        mult *= 1.2;
    }

    let mut cost = dist * mult;
    if dh > 5.0 {
        cost += dh / 100.0;
    }

    let near_hazard = grid.neighbors8(to.0, to.1).any(|(nx, ny)| {
        let nf = grid.get_flags(nx, ny);
        nf.visual_only() || nf.cliff()
    });
    if near_hazard {
        cost += 20.0 / dist.max(1e-6);
    }

    Some(cost)
}

/// Find a cost-minimizing path from `start` to `goal` across `grid`,
/// returning the sequence of cell centres from start to goal inclusive, or
/// `None` if no path exists (goal unreachable within `walkable_cap` through
/// non-boundary, non-water, non-blocked, non-visual-only cells).
pub fn find_path(grid: &Grid, start: (usize, usize), goal: (usize, usize), walkable_cap: i8) -> Option<Vec<(f32, f32)>> {
    if start == goal {
        return Some(vec![(start.0 as f32, start.1 as f32)]);
    }

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<(usize, usize), f32> = HashMap::new();
    let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();

    g_score.insert(start, 0.0);
    open.push(ScoredNode { cost: heuristic(start.0, start.1, goal.0, goal.1), x: start.0, y: start.1 });

    while let Some(ScoredNode { x, y, .. }) = open.pop() {
        if (x, y) == goal {
            let mut path = vec![(x as f32, y as f32)];
            let mut cur = (x, y);
            while let Some(&prev) = came_from.get(&cur) {
                path.push((prev.0 as f32, prev.1 as f32));
                cur = prev;
            }
            path.reverse();
            return Some(path);
        }

        let current_g = *g_score.get(&(x, y)).unwrap_or(&f32::INFINITY);
        for (nx, ny) in grid.neighbors8(x, y) {
            let Some(c) = step_cost(grid, (x, y), (nx, ny), walkable_cap) else { continue };
            let tentative = current_g + c;
            if tentative < *g_score.get(&(nx, ny)).unwrap_or(&f32::INFINITY) {
                g_score.insert((nx, ny), tentative);
                came_from.insert((nx, ny), (x, y));
                open.push(ScoredNode { cost: tentative + heuristic(nx, ny, goal.0, goal.1), x: nx, y: ny });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_straight_path_on_open_grid() {
        let g = Grid::new(16, 16).unwrap();
        let path = find_path(&g, (0, 0), (15, 15), i8::MAX).unwrap();
        assert_eq!(*path.first().unwrap(), (0.0, 0.0));
        assert_eq!(*path.last().unwrap(), (15.0, 15.0));
    }

    #[test]
    fn returns_none_when_goal_is_unreachable() {
        let mut g = Grid::new(8, 8).unwrap();
        for y in 0..8 {
            g.with_flags(4, y, |f| f.set_blocked(true));
        }
        assert!(find_path(&g, (0, 0), (7, 0), i8::MAX).is_none());
    }

    #[test]
    fn avoids_water_cells() {
        let mut g = Grid::new(10, 3).unwrap();
        for x in 0..10 {
            g.with_flags(x, 1, |f| f.set_water(true));
        }
        let path = find_path(&g, (0, 0), (9, 0), i8::MAX).unwrap();
        assert!(path.iter().all(|&(x, y)| !(y.round() as usize == 1)));
    }

    #[test]
    fn refuses_a_level_boundary_without_a_ramp() {
        let mut g = Grid::new(8, 8).unwrap();
        for y in 0..8 {
            for x in 4..8 {
                g.set_level_id(x, y, 1, 270.0);
            }
        }
        assert!(find_path(&g, (0, 0), (7, 0), i8::MAX).is_none());
    }

    #[test]
    fn a_ramp_cell_allows_crossing_a_level_boundary() {
        let mut g = Grid::new(8, 8).unwrap();
        for y in 0..8 {
            for x in 4..8 {
                g.set_level_id(x, y, 1, 270.0);
            }
        }
        for y in 0..8 {
            g.with_flags(4, y, |f| f.set_ramp(true));
        }
        assert!(find_path(&g, (0, 0), (7, 0), i8::MAX).is_some());
    }

    #[test]
    fn cells_above_the_walkable_cap_are_impassable() {
        let g = Grid::new(16, 16).unwrap();
        assert!(find_path(&g, (0, 0), (15, 15), -1).is_none());
    }
}
