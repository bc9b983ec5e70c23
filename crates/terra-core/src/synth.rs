//! Heightmap synthesis (spec §4.3): composes the noise primitives into a
//! normalized `[0, 1]` field, then scales by `heightScale` into engine
//! units and writes the grid's height plane.

use crate::config::NoiseConfig;
use crate::grid::Grid;
use crate::noise::{billow_noise, fbm_fn, hash2, ridged_multifractal, turbulence, voronoi, voronoi_edges, warp};

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Evaluate the normalized `[0, 1]` composite height at one grid cell,
/// following spec §4.3 steps 1-11 (step 12's `heightScale` multiply is
/// applied by the caller once the whole plane is filled).
fn sample_height01(x: usize, y: usize, cols: usize, rows: usize, cfg: &NoiseConfig, seed32: u32) -> f32 {
    // Step 1: uv * resolution * noiseScale, then cascade domain warp.
    let u = x as f64 / cols.max(1) as f64;
    let v = y as f64 / rows.max(1) as f64;
    let px = u * cols as f64 * cfg.noise_scale;
    let py = v * rows as f64 * cfg.noise_scale;
    let (wx, wy) = warp(px, py, cfg.warp_strength * 40.0, seed32);

    let seed = cfg.seed;

    // Step 2: continental base.
    let continental_base = smoothstep(
        0.35,
        0.65,
        fbm_fn(
            wx * 0.3 + seed as f64,
            wy * 0.3 + seed as f64,
            seed32,
            4,
            0.6,
            2.0,
        ) as f32,
    );

    // Step 3: ridges.
    let ridges = ridged_multifractal(
        wx * 0.8 + seed as f64 * 1.1,
        wy * 0.8 + seed as f64 * 1.1,
        seed32.wrapping_add(1),
        6,
        2.2,
        0.5,
    )
    .powf(1.5) as f32;

    // Step 4: hills.
    let hills = 0.6
        * billow_noise(
            wx * 1.5 + seed as f64 * 2.0,
            wy * 1.5 + seed as f64 * 2.0,
            seed32.wrapping_add(2),
            5,
            0.45,
            2.0,
        ) as f32;

    // Step 5: Voronoi plateaus.
    let voronoi_plateaus = 0.2
        * smoothstep(
            0.1,
            0.4,
            voronoi(wx * 0.5 + seed as f64, wy * 0.5 + seed as f64, seed32.wrapping_add(3)) as f32,
        );

    // Step 6: cracks (voronoi edges).
    let edges = voronoi_edges(
        wx * 1.2 + seed as f64 * 0.3,
        wy * 1.2 + seed as f64 * 0.3,
        seed32.wrapping_add(4),
    ) as f32;
    let cracks = 1.0 - 0.15 * (1.0 - smoothstep(0.0, 0.15, edges));

    // Step 7: meso + micro detail.
    let meso = 0.12
        * fbm_fn(
            wx * 4.0 + seed as f64 * 4.0,
            wy * 4.0 + seed as f64 * 4.0,
            seed32.wrapping_add(5),
            4,
            0.5,
            2.0,
        ) as f32;
    let micro = 0.08
        * turbulence(
            wx * 8.0 + seed as f64 * 3.0,
            wy * 8.0 + seed as f64 * 3.0,
            seed32.wrapping_add(6),
            3,
        ) as f32;

    // Step 8: combine. `mountainMask` grows with ridge strength, giving
    // ridges/plateaus room in mountainous configurations without
    // overpowering flat ones.
    let mountain_mask = cfg.ridge_strength.clamp(0.0, 1.0);
    let mut h = 0.3 * continental_base
        + ridges * cfg.ridge_strength * mountain_mask
        + hills * cfg.hill_strength
        + voronoi_plateaus * mountain_mask;
    h *= cracks;
    h += meso + micro * cfg.hill_strength.max(0.2);

    // Step 9: plains flattening.
    let m = 0.35f32;
    let plains_flat = cfg.plains_flat.clamp(0.0, 1.0);
    let delta = h - m;
    h = m + delta.signum() * delta.abs().powf(1.0 + 2.0 * plains_flat) * 0.8;

    // Step 10: sea level compression/renormalization.
    let sea_level = cfg.sea_level.clamp(0.0, 1.0);
    if h < sea_level {
        h = (h / sea_level.max(1e-6)) * (0.5 * sea_level);
    } else if sea_level < 1.0 {
        h = sea_level + (h - sea_level) / (1.0 - sea_level) * (1.0 - sea_level);
    }

    // Step 11: clamp, then anti-banding dither.
    h = h.clamp(0.0, 1.0);
    let dither = (hash2(x as i64, y as i64, seed32.wrapping_add(9999)) as f32 - 0.5) * 0.002;
    (h + dither).clamp(0.0, 1.0)
}

/// Run the heightmap synthesis pass: fill `grid`'s height plane from noise,
/// scaled to engine units by `height_scale`. Writes `height` only.
pub fn synthesize(grid: &mut Grid, cfg: &NoiseConfig) {
    let seed32 = (cfg.seed & 0xFFFF_FFFF) as u32;
    let cols = grid.cols;
    let rows = grid.rows;

    #[cfg(feature = "threading")]
    {
        let mut buf = vec![0.0f32; cols * rows];
        rayon::scope(|s| {
            for (row_idx, row) in buf.chunks_mut(cols).enumerate() {
                s.spawn(move |_| {
                    for (x, cell) in row.iter_mut().enumerate() {
                        *cell = sample_height01(x, row_idx, cols, rows, cfg, seed32) * cfg.height_scale;
                    }
                });
            }
        });
        grid.height_plane_mut().copy_from_slice(&buf);
    }

    #[cfg(not(feature = "threading"))]
    {
        for y in 0..rows {
            for x in 0..cols {
                let h01 = sample_height01(x, y, cols, rows, cfg, seed32);
                grid.set_height(x, y, h01 * cfg.height_scale);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> NoiseConfig {
        NoiseConfig::default()
    }

    #[test]
    fn produces_finite_heights_in_range() {
        let mut grid = Grid::new(64, 64).unwrap();
        synthesize(&mut grid, &cfg());
        for &h in grid.height_plane() {
            assert!(h.is_finite());
            assert!(h >= -1.0 && h <= cfg().height_scale + 1.0);
        }
    }

    #[test]
    fn deterministic_same_seed() {
        let mut g1 = Grid::new(32, 32).unwrap();
        let mut g2 = Grid::new(32, 32).unwrap();
        synthesize(&mut g1, &cfg());
        synthesize(&mut g2, &cfg());
        for (a, b) in g1.height_plane().iter().zip(g2.height_plane()) {
            assert!((a - b).abs() < 1e-5 * cfg().height_scale);
        }
    }

    #[test]
    fn different_seed_changes_output() {
        let mut g1 = Grid::new(32, 32).unwrap();
        let mut c2 = cfg();
        c2.seed = 999;
        let mut g2 = Grid::new(32, 32).unwrap();
        synthesize(&mut g1, &cfg());
        synthesize(&mut g2, &c2);
        let differs = g1.height_plane().iter().zip(g2.height_plane()).any(|(a, b)| (a - b).abs() > 1e-3);
        assert!(differs, "different seeds should produce different terrain");
    }

    #[test]
    fn non_flat_output() {
        let mut grid = Grid::new(96, 96).unwrap();
        synthesize(&mut grid, &cfg());
        let min = grid.height_plane().iter().cloned().fold(f32::INFINITY, f32::min);
        let max = grid.height_plane().iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max - min > 10.0, "expected varied terrain, got flat range {min}..{max}");
    }
}
