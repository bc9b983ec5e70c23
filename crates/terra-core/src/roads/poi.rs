//! Road network point-of-interest discovery (spec §4.9): collapses the
//! border pass's exit cells into single representative points, splits each
//! qualifying ramp cluster into an entry/exit waypoint pair, then adds
//! random POIs up to the configured count.

use crate::config::RoadConfig;
use crate::grid::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ramp clusters smaller than this many cells are too minor to warrant a
/// dedicated waypoint pair and are skipped.
const MIN_RAMP_CLUSTER_SIZE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poi {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub level_id: i8,
    pub kind: PoiKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiKind {
    Exit,
    RampEntry,
    RampExit,
    Random,
}

/// Flood-fill connected cells matching `pred` into clusters of cell
/// coordinates.
fn clusters(grid: &Grid, pred: impl Fn(usize, usize) -> bool) -> Vec<Vec<(usize, usize)>> {
    let cols = grid.cols;
    let rows = grid.rows;
    let mut visited = vec![false; cols * rows];
    let mut out = Vec::new();

    for y0 in 0..rows {
        for x0 in 0..cols {
            let i0 = y0 * cols + x0;
            if visited[i0] || !pred(x0, y0) {
                continue;
            }
            let mut stack = vec![(x0, y0)];
            visited[i0] = true;
            let mut cluster = Vec::new();
            while let Some((x, y)) = stack.pop() {
                cluster.push((x, y));
                for (nx, ny) in grid.neighbors8(x, y) {
                    let ni = ny * cols + nx;
                    if !visited[ni] && pred(nx, ny) {
                        visited[ni] = true;
                        stack.push((nx, ny));
                    }
                }
            }
            out.push(cluster);
        }
    }
    out
}

fn centroid(cluster: &[(usize, usize)]) -> (f32, f32) {
    let (mut sx, mut sy) = (0.0f64, 0.0f64);
    for &(x, y) in cluster {
        sx += x as f64;
        sy += y as f64;
    }
    let n = cluster.len() as f64;
    ((sx / n) as f32, (sy / n) as f32)
}

/// Discover exit POIs: centroids of connected `boundary && road` clusters.
pub fn find_exit_pois(grid: &Grid, next_id: &mut u32) -> Vec<Poi> {
    clusters(grid, |x, y| {
        let f = grid.get_flags(x, y);
        f.boundary() && f.road()
    })
    .into_iter()
    .map(|cluster| {
        let (x, y) = centroid(&cluster);
        let level_id = grid.get_level_id(x.round().max(0.0) as usize, y.round().max(0.0) as usize);
        let poi = Poi { id: *next_id, x, y, level_id, kind: PoiKind::Exit };
        *next_id += 1;
        poi
    })
    .collect()
}

/// Discover ramp waypoints: every ramp cluster at least `MIN_RAMP_CLUSTER_SIZE`
/// cells large contributes a pair of POIs — one at the cluster's lowest cell
/// (the entry side) and one at its highest (the exit side) — rather than a
/// single collapsed centroid, so the road network can wire both ends.
pub fn find_ramp_pois(grid: &Grid, next_id: &mut u32) -> Vec<Poi> {
    let mut pois = Vec::new();
    for cluster in clusters(grid, |x, y| {
        let f = grid.get_flags(x, y);
        f.ramp() && !f.boundary()
    }) {
        if cluster.len() < MIN_RAMP_CLUSTER_SIZE {
            continue;
        }
        let low = *cluster
            .iter()
            .min_by(|a, b| grid.get_height(a.0, a.1).partial_cmp(&grid.get_height(b.0, b.1)).unwrap())
            .unwrap();
        let high = *cluster
            .iter()
            .max_by(|a, b| grid.get_height(a.0, a.1).partial_cmp(&grid.get_height(b.0, b.1)).unwrap())
            .unwrap();

        pois.push(Poi {
            id: *next_id,
            x: low.0 as f32,
            y: low.1 as f32,
            level_id: grid.get_level_id(low.0, low.1),
            kind: PoiKind::RampEntry,
        });
        *next_id += 1;
        pois.push(Poi {
            id: *next_id,
            x: high.0 as f32,
            y: high.1 as f32,
            level_id: grid.get_level_id(high.0, high.1),
            kind: PoiKind::RampExit,
        });
        *next_id += 1;
    }
    pois
}

/// Scatter `count` random POIs on playable, non-boundary, non-water,
/// walkable-cap-respecting cells, rejecting candidates closer than
/// `min_distance` to any already-chosen point (existing or random).
pub fn find_random_pois(grid: &Grid, cfg: &RoadConfig, existing: &[Poi], walkable_cap: i8, next_id: &mut u32) -> Vec<Poi> {
    if cfg.random_poi_count == 0 {
        return Vec::new();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.random_poi_seed);
    let cols = grid.cols;
    let rows = grid.rows;
    let mut chosen: Vec<(f32, f32)> = existing.iter().map(|p| (p.x, p.y)).collect();
    let mut result = Vec::new();

    let max_attempts = cfg.random_poi_count * 200 + 200;
    let mut attempts = 0;
    while result.len() < cfg.random_poi_count as usize && attempts < max_attempts {
        attempts += 1;
        let x = rng.gen_range(0..cols);
        let y = rng.gen_range(0..rows);
        let f = grid.get_flags(x, y);
        if f.boundary() || f.water() || !f.playable() || grid.get_level_id(x, y) > walkable_cap {
            continue;
        }
        let (fx, fy) = (x as f32, y as f32);
        if chosen.iter().any(|&(cx, cy)| ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt() < cfg.min_poi_distance) {
            continue;
        }
        chosen.push((fx, fy));
        result.push(Poi { id: *next_id, x: fx, y: fy, level_id: grid.get_level_id(x, y), kind: PoiKind::Random });
        *next_id += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_one_exit_cluster() {
        let mut g = Grid::new(16, 16).unwrap();
        for x in 6..10 {
            g.with_flags(x, 0, |f| {
                f.set_boundary(true);
                f.set_road(true);
            });
        }
        let mut next_id = 0;
        let pois = find_exit_pois(&g, &mut next_id);
        assert_eq!(pois.len(), 1);
        assert!((pois[0].y - 0.0).abs() < 1.0);
        assert_eq!(pois[0].id, 0);
    }

    #[test]
    fn ramp_clusters_below_minimum_size_are_skipped() {
        let mut g = Grid::new(16, 16).unwrap();
        g.with_flags(4, 4, |f| f.set_ramp(true));
        let mut next_id = 0;
        assert!(find_ramp_pois(&g, &mut next_id).is_empty());
    }

    #[test]
    fn a_qualifying_ramp_cluster_yields_an_entry_exit_pair() {
        let mut g = Grid::new(16, 16).unwrap();
        for y in 0..16 {
            for x in 4..6 {
                g.with_flags(x, y, |f| f.set_ramp(true));
                g.set_level_id(x, y, 0, 0.0);
                g.set_height(x, y, y as f32 * 10.0);
            }
        }
        let mut next_id = 0;
        let pois = find_ramp_pois(&g, &mut next_id);
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].kind, PoiKind::RampEntry);
        assert_eq!(pois[1].kind, PoiKind::RampExit);
        assert!(pois[0].y < pois[1].y);
    }

    #[test]
    fn random_pois_respect_min_distance() {
        let mut g = Grid::new(64, 64).unwrap();
        for y in 0..64 {
            for x in 0..64 {
                g.with_flags(x, y, |f| f.set_playable(true));
            }
        }
        let cfg = RoadConfig { random_poi_count: 10, min_poi_distance: 5.0, ..RoadConfig::default() };
        let mut next_id = 0;
        let pois = find_random_pois(&g, &cfg, &[], i8::MAX, &mut next_id);
        for i in 0..pois.len() {
            for j in (i + 1)..pois.len() {
                let d = ((pois[i].x - pois[j].x).powi(2) + (pois[i].y - pois[j].y).powi(2)).sqrt();
                assert!(d >= cfg.min_poi_distance - 1e-3);
            }
        }
    }

    #[test]
    fn random_pois_respect_walkable_cap() {
        let mut g = Grid::new(32, 32).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                g.with_flags(x, y, |f| f.set_playable(true));
                g.set_level_id(x, y, 2, 0.0);
            }
        }
        let cfg = RoadConfig { random_poi_count: 5, ..RoadConfig::default() };
        let mut next_id = 0;
        let pois = find_random_pois(&g, &cfg, &[], 1, &mut next_id);
        assert!(pois.is_empty());
    }
}
