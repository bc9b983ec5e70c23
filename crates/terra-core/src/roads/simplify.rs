//! Douglas-Peucker polyline simplification (spec §4.9), used to collapse
//! an A* path's cell-by-cell staircase into a handful of control points
//! before smoothing.

fn perpendicular_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let (px, py) = p;
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-9 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let num = (dy * px - dx * py + bx * ay - by * ax).abs();
    num / len_sq.sqrt()
}

fn simplify_range(points: &[(f32, f32)], epsilon: f32, out: &mut Vec<(f32, f32)>) {
    if points.len() < 3 {
        out.extend_from_slice(points);
        return;
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    let mut max_dist = 0.0f32;
    let mut max_idx = 0;
    for (i, &p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = perpendicular_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = Vec::new();
        simplify_range(&points[..=max_idx], epsilon, &mut left);
        left.pop();
        out.extend(left);
        simplify_range(&points[max_idx..], epsilon, out);
    } else {
        out.push(first);
        out.push(last);
    }
}

/// Simplify `points` to the subset whose perpendicular deviation from the
/// straight line between its neighbours exceeds `epsilon`.
pub fn simplify(points: &[(f32, f32)], epsilon: f32) -> Vec<(f32, f32)> {
    let mut out = Vec::new();
    simplify_range(points, epsilon, &mut out);
    out
}
