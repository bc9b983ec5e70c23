//! Road graph construction (spec §4.9): ramp entry/exit pairs are wired
//! first, then a minimum spanning tree over the remaining POI pairs via
//! Kruskal's algorithm, plus a handful of extra cheapest edges so the
//! network has a few loops rather than being a bare tree. Two repair passes
//! afterward guarantee every exit has at least one connection and every
//! ramp waypoint has at least two (spec §8.8).

use super::poi::{Poi, PoiKind};

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    /// Returns `true` if the union happened (the two were in different sets).
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f32,
}

fn euclidean(a: &Poi, b: &Poi) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Edge weight (spec §4.9.2): straight-line distance plus a surcharge
/// proportional to the level-id gap between the two POIs.
fn weighted(a: &Poi, b: &Poi, level_penalty: f32) -> f32 {
    euclidean(a, b) + level_penalty * (a.level_id - b.level_id).unsigned_abs() as f32
}

fn degree(edges: &[Edge], i: usize) -> usize {
    edges.iter().filter(|e| e.a == i || e.b == i).count()
}

fn connected(edges: &[Edge], a: usize, b: usize) -> bool {
    edges.iter().any(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
}

fn nearest(pois: &[Poi], edges: &[Edge], from: usize, predicate: impl Fn(usize) -> bool) -> Option<usize> {
    (0..pois.len())
        .filter(|&j| j != from && predicate(j) && !connected(edges, from, j))
        .min_by(|&j, &k| euclidean(&pois[from], &pois[j]).partial_cmp(&euclidean(&pois[from], &pois[k])).unwrap())
}

/// Build the road graph. `forced_pairs` (ramp entry/exit indices) are wired
/// before the general MST runs over every remaining POI pair, weighted by
/// [`weighted`]; `max_extra_edges` of the next-cheapest leftover edges are
/// appended for loops. Two repair passes then run: every `Exit` POI gets at
/// least one connection (preferring a ramp waypoint), and every ramp
/// waypoint gets at least two.
pub fn build_graph(pois: &[Poi], max_extra_edges: u32, level_penalty: f32, forced_pairs: &[(usize, usize)]) -> Vec<Edge> {
    let n = pois.len();
    if n < 2 {
        return Vec::new();
    }

    let mut uf = UnionFind::new(n);
    let mut mst = Vec::new();

    for &(a, b) in forced_pairs {
        if uf.union(a, b) {
            mst.push(Edge { a, b, weight: weighted(&pois[a], &pois[b], level_penalty) });
        }
    }

    let forced_set: std::collections::HashSet<(usize, usize)> =
        forced_pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();

    let mut candidates = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            if forced_set.contains(&(i, j)) {
                continue;
            }
            candidates.push(Edge { a: i, b: j, weight: weighted(&pois[i], &pois[j], level_penalty) });
        }
    }
    candidates.sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap());

    let mut leftover = Vec::new();
    for edge in candidates {
        if uf.union(edge.a, edge.b) {
            mst.push(edge);
        } else {
            leftover.push(edge);
        }
    }

    leftover.truncate(max_extra_edges as usize);
    mst.extend(leftover);

    // Repair pass 1: every exit POI gets at least one connection, preferring
    // a ramp waypoint over any other POI.
    for i in 0..n {
        if pois[i].kind != PoiKind::Exit || degree(&mst, i) > 0 {
            continue;
        }
        let target = nearest(pois, &mst, i, |j| matches!(pois[j].kind, PoiKind::RampEntry | PoiKind::RampExit))
            .or_else(|| nearest(pois, &mst, i, |_| true));
        if let Some(j) = target {
            mst.push(Edge { a: i, b: j, weight: weighted(&pois[i], &pois[j], level_penalty) });
        }
    }

    // Repair pass 2: every ramp waypoint gets at least two connections
    // (entry side and exit side each appear in >=2 road segments).
    for i in 0..n {
        if !matches!(pois[i].kind, PoiKind::RampEntry | PoiKind::RampExit) {
            continue;
        }
        while degree(&mst, i) < 2 {
            let Some(j) = nearest(pois, &mst, i, |_| true) else { break };
            mst.push(Edge { a: i, b: j, weight: weighted(&pois[i], &pois[j], level_penalty) });
        }
    }

    mst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi(x: f32, y: f32) -> Poi {
        Poi { id: 0, x, y, level_id: 0, kind: PoiKind::Random }
    }

    #[test]
    fn mst_connects_all_points_with_n_minus_one_edges() {
        let pois = vec![poi(0.0, 0.0), poi(10.0, 0.0), poi(10.0, 10.0), poi(0.0, 10.0)];
        let edges = build_graph(&pois, 0, 0.0, &[]);
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn extra_edges_add_loops_without_duplicating_mst() {
        let pois = vec![poi(0.0, 0.0), poi(10.0, 0.0), poi(10.0, 10.0), poi(0.0, 10.0)];
        let edges = build_graph(&pois, 2, 0.0, &[]);
        assert_eq!(edges.len(), 5);
    }

    #[test]
    fn single_poi_has_no_edges() {
        let pois = vec![poi(1.0, 1.0)];
        assert!(build_graph(&pois, 5, 0.0, &[]).is_empty());
    }

    #[test]
    fn level_penalty_favours_same_level_pairs() {
        let mut a = poi(0.0, 0.0);
        a.level_id = 0;
        let mut b = poi(10.0, 0.0);
        b.level_id = 0;
        let mut c = poi(10.001, 0.0);
        c.level_id = 1;
        assert!(weighted(&a, &b, 50.0) < weighted(&a, &c, 50.0));
    }

    #[test]
    fn every_exit_gets_at_least_one_connection() {
        let mut pois = vec![poi(0.0, 0.0), poi(50.0, 50.0), poi(25.0, 25.0)];
        pois[0].kind = PoiKind::Exit;
        let edges = build_graph(&pois, 0, 0.0, &[]);
        assert!(degree(&edges, 0) >= 1);
    }

    #[test]
    fn every_ramp_waypoint_gets_at_least_two_connections() {
        let mut pois = vec![poi(0.0, 0.0), poi(10.0, 0.0), poi(20.0, 0.0), poi(30.0, 0.0)];
        pois[1].kind = PoiKind::RampEntry;
        pois[2].kind = PoiKind::RampExit;
        let forced = vec![(1usize, 2usize)];
        let edges = build_graph(&pois, 0, 0.0, &forced);
        assert!(degree(&edges, 1) >= 2);
        assert!(degree(&edges, 2) >= 2);
    }
}
