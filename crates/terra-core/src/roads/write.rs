//! Road rasterization (spec §4.9.5): walks each road segment and writes the
//! grid's road flags and id everywhere, overwriting height only across the
//! single sub-segment that crosses a level boundary — the ramp-interpolation
//! band — which it also flags `ramp`.

use crate::config::{RoadConfig, SlopeCurve};
use crate::grid::Grid;

fn ease(curve: SlopeCurve, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match curve {
        SlopeCurve::Linear => t,
        SlopeCurve::EaseIn => t * t,
        SlopeCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        SlopeCurve::EaseInOut => t * t * (3.0 - 2.0 * t),
        SlopeCurve::Exponential => t * t * t,
    }
}

/// The single sub-segment of a polyline, expressed as a `t`-range over the
/// whole path length, where the path crosses one level boundary.
struct Crossing {
    from_level: i8,
    to_level: i8,
    start_t: f32,
    end_t: f32,
}

fn sample_level(grid: &Grid, p: (f32, f32)) -> i8 {
    let x = (p.0.round().max(0.0) as usize).min(grid.cols - 1);
    let y = (p.1.round().max(0.0) as usize).min(grid.rows - 1);
    grid.get_level_id(x, y)
}

/// Scan the polyline for the first single-step (`|Δlevel| <= 1`) level
/// transition and record its `t`-range. A transition spanning more than one
/// level is refused (skipped over, not interpolated) rather than blended.
fn find_level_crossing(grid: &Grid, points: &[(f32, f32)]) -> Option<Crossing> {
    let total_len: f32 = points.windows(2).map(|w| dist(w[0], w[1])).sum();
    if total_len < 1e-6 {
        return None;
    }

    let mut traveled = 0.0f32;
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg_len = dist(a, b);
        let from_level = sample_level(grid, a);
        let to_level = sample_level(grid, b);
        if from_level != to_level {
            let diff = (to_level - from_level).unsigned_abs();
            if diff <= 1 {
                let start_t = (traveled / total_len).clamp(0.0, 1.0);
                let end_t = ((traveled + seg_len) / total_len).clamp(0.0, 1.0);
                return Some(Crossing { from_level, to_level, start_t, end_t });
            }
        }
        traveled += seg_len;
    }
    None
}

/// Rasterize one already-smoothed polyline as a road with id `road_id`,
/// writing cells within `road.road_width / 2` of each segment.
pub fn write_road(grid: &mut Grid, points: &[(f32, f32)], road: &RoadConfig, road_id: u16, level_step: f32) {
    if points.len() < 2 {
        return;
    }

    let total_len: f32 = points.windows(2).map(|w| dist(w[0], w[1])).sum();
    if total_len < 1e-6 {
        return;
    }

    let crossing = find_level_crossing(grid, points);
    let half_width = (road.road_width / 2.0).max(0.5);
    let mut traveled = 0.0f32;

    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg_len = dist(a, b);
        if seg_len < 1e-6 {
            continue;
        }

        let x_min = (a.0.min(b.0) - half_width).floor().max(0.0) as i64;
        let x_max = (a.0.max(b.0) + half_width).ceil() as i64;
        let y_min = (a.1.min(b.1) - half_width).floor().max(0.0) as i64;
        let y_max = (a.1.max(b.1) + half_width).ceil() as i64;

        for gy in y_min..=y_max {
            for gx in x_min..=x_max {
                if !grid.in_bounds(gx, gy) {
                    continue;
                }
                let p = (gx as f32, gy as f32);
                let (t, perp_dist) = project_onto_segment(p, a, b);
                if perp_dist > half_width {
                    continue;
                }

                let (x, y) = (gx as usize, gy as usize);
                let global_t = ((traveled + t * seg_len) / total_len).clamp(0.0, 1.0);

                if let Some(c) = &crossing {
                    if global_t >= c.start_t && global_t <= c.end_t {
                        let span = (c.end_t - c.start_t).max(1e-6);
                        let local_t = ((global_t - c.start_t) / span).clamp(0.0, 1.0);
                        let eased_t = ease(road.slope_curve, local_t);
                        let from_h = c.from_level as f32 * level_step;
                        let to_h = c.to_level as f32 * level_step;
                        let target_height = from_h + (to_h - from_h) * eased_t;

                        let edge_blend = 1.0 - (perp_dist / half_width).clamp(0.0, 1.0);
                        let h = grid.get_height(x, y);
                        grid.set_height(x, y, h + (target_height - h) * edge_blend);
                        grid.with_flags(x, y, |f| f.set_ramp(true));
                    }
                }

                grid.with_flags(x, y, |f| {
                    f.set_road(true);
                    f.set_playable(true);
                    f.set_blocked(false);
                });
                grid.set_road_id(x, y, Some(road_id));
            }
        }

        traveled += seg_len;
    }
}

fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Project `p` onto segment `a..b`, returning `(t, perpendicular_distance)`
/// where `t` is clamped to `[0, 1]`.
fn project_onto_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len_sq = (dx * dx + dy * dy).max(1e-9);
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    let proj = (a.0 + dx * t, a.1 + dy * t);
    let perp = dist(p, proj);
    (t, perp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_road_flags_along_a_straight_segment() {
        let mut g = Grid::new(32, 32).unwrap();
        let points = vec![(2.0, 16.0), (29.0, 16.0)];
        write_road(&mut g, &points, &RoadConfig::default(), 1, 270.0);
        assert!(g.get_flags(16, 16).road());
        assert_eq!(g.at(16, 16).unwrap().road_id, Some(1));
    }

    #[test]
    fn cells_far_from_path_are_untouched() {
        let mut g = Grid::new(32, 32).unwrap();
        let points = vec![(2.0, 2.0), (5.0, 2.0)];
        write_road(&mut g, &points, &RoadConfig::default(), 1, 270.0);
        assert!(!g.get_flags(30, 30).road());
    }

    #[test]
    fn single_point_is_a_no_op() {
        let mut g = Grid::new(8, 8).unwrap();
        write_road(&mut g, &[(1.0, 1.0)], &RoadConfig::default(), 1, 270.0);
        for &f in g.flags_plane() {
            assert!(!f.road());
        }
    }

    #[test]
    fn flat_single_level_road_leaves_height_untouched() {
        let mut g = Grid::new(32, 32).unwrap();
        for y in 0..32usize {
            for x in 0..32usize {
                g.set_height(x, y, 7.0);
            }
        }
        let before: Vec<f32> = g.height_plane().to_vec();
        let points = vec![(2.0, 16.0), (29.0, 16.0)];
        write_road(&mut g, &points, &RoadConfig::default(), 1, 270.0);
        assert_eq!(g.height_plane(), before.as_slice());
    }

    #[test]
    fn a_road_crossing_one_level_blends_height_and_flags_ramp_only_in_the_crossing_band() {
        let mut g = Grid::new(32, 8).unwrap();
        for y in 0..8usize {
            for x in 0..16usize {
                g.set_level_id(x, y, 0, 0.0);
            }
            for x in 16..32usize {
                g.set_level_id(x, y, 1, 270.0);
            }
        }
        let points = vec![(2.0, 4.0), (15.0, 4.0), (17.0, 4.0), (29.0, 4.0)];
        write_road(&mut g, &points, &RoadConfig::default(), 1, 270.0);

        assert!(g.get_flags(16, 4).ramp());
        assert!(!g.get_flags(2, 4).ramp());
        assert!(!g.get_flags(29, 4).ramp());
        assert_eq!(g.get_height(2, 4), 0.0);
        assert_eq!(g.get_height(29, 4), 270.0);
    }
}
