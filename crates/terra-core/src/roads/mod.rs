//! Road network construction (spec §4.9): discover points of interest,
//! connect them with a minimum spanning tree plus a few extra edges,
//! pathfind each edge across the terrain, simplify and smooth the result,
//! then rasterize it onto the grid.

pub mod astar;
pub mod graph;
pub mod poi;
pub mod simplify;
pub mod smooth;
pub mod write;

use crate::config::RoadConfig;
use crate::error::Error;
use crate::grid::Grid;
use poi::Poi;

/// Run the full road network pass. Returns one `Error::PathNotFound` per
/// edge the MST/extra-edge set could not actually route, which the caller
/// surfaces as a `PipelineResult` warning rather than a fatal error.
pub fn build_roads(grid: &mut Grid, cfg: &RoadConfig, walkable_cap: i8, level_step: f32) -> Vec<Error> {
    let mut warnings = Vec::new();
    let mut next_id: u32 = 0;
    let mut points: Vec<Poi> = Vec::new();

    points.extend(poi::find_exit_pois(grid, &mut next_id));

    let ramp_base = points.len();
    points.extend(poi::find_ramp_pois(grid, &mut next_id));
    let forced_pairs: Vec<(usize, usize)> = (ramp_base..points.len())
        .step_by(2)
        .filter(|&i| i + 1 < points.len())
        .map(|i| (i, i + 1))
        .collect();

    let random = poi::find_random_pois(grid, cfg, &points, walkable_cap, &mut next_id);
    points.extend(random);

    if points.len() < 2 {
        return warnings;
    }

    let edges = graph::build_graph(&points, cfg.max_extra_edges, cfg.level_penalty, &forced_pairs);

    let mut next_road_id: u16 = 1;
    for edge in edges {
        let a = points[edge.a];
        let b = points[edge.b];
        let start = (a.x.round().max(0.0) as usize, a.y.round().max(0.0) as usize);
        let goal = (b.x.round().max(0.0) as usize, b.y.round().max(0.0) as usize);
        let (start, goal) = (clamp_cell(grid, start), clamp_cell(grid, goal));

        let Some(path) = astar::find_path(grid, start, goal, walkable_cap) else {
            warnings.push(Error::PathNotFound { from_id: a.id, to_id: b.id });
            continue;
        };
        let simplified = simplify::simplify(&path, cfg.simplification_epsilon);
        let smoothed = smooth::chaikin_smooth(&simplified, cfg.smoothing_passes);
        write::write_road(grid, &smoothed, cfg, next_road_id, level_step);
        next_road_id = next_road_id.wrapping_add(1);
    }

    warnings
}

fn clamp_cell(grid: &Grid, (x, y): (usize, usize)) -> (usize, usize) {
    (x.min(grid.cols - 1), y.min(grid.rows - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_exits() -> Grid {
        let mut g = Grid::new(48, 48).unwrap();
        for y in 0..48 {
            for x in 0..48 {
                g.with_flags(x, y, |f| f.set_playable(true));
            }
        }
        for x in 22..26 {
            g.with_flags(x, 0, |f| {
                f.set_boundary(true);
                f.set_road(true);
            });
            g.with_flags(x, 47, |f| {
                f.set_boundary(true);
                f.set_road(true);
            });
        }
        g
    }

    #[test]
    fn connects_two_exits_with_a_road() {
        let mut g = grid_with_exits();
        let cfg = RoadConfig::default();
        build_roads(&mut g, &cfg, i8::MAX, 270.0);
        let mut any_interior_road = false;
        for y in 10..38 {
            for x in 0..48 {
                if g.get_flags(x, y).road() {
                    any_interior_road = true;
                }
            }
        }
        assert!(any_interior_road, "expected a road threading between the two exits");
    }

    #[test]
    fn fewer_than_two_pois_is_a_no_op() {
        let mut g = Grid::new(16, 16).unwrap();
        build_roads(&mut g, &RoadConfig::default(), i8::MAX, 270.0);
        for &f in g.flags_plane() {
            assert!(!f.road());
        }
    }
}
