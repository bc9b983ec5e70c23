//! Detail stamps (spec §4.8): small, reusable height/flag overlays applied
//! on top of the synthesized terrain — rocks, plateaus, craters, scatter
//! clusters — gated by placement mode and clamped so a stamp can never push
//! a cell outside the ramp band it straddles.

use crate::config::{DetailConfig, DetailLayerConfig, StampMode};
use crate::grid::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Cells within this many grid cells of a ramp are partially or fully
/// protected from stamp contribution; `ramp_mask` decays to 0 at the edge
/// of this radius.
const RAMP_PROTECT_RADIUS: f32 = 6.0;

/// `rampMask[c]` (spec §4.8): 1.0 on a ramp cell itself, decaying with
/// distance to the nearest ramp cell, 0.0 once `RAMP_PROTECT_RADIUS` cells
/// away. A cell with `ramp_mask > 0.95` is treated as fully protected.
fn ramp_mask(grid: &Grid, x: usize, y: usize) -> f32 {
    if grid.get_flags(x, y).ramp() {
        return 1.0;
    }
    let r = RAMP_PROTECT_RADIUS.ceil() as i64;
    let mut nearest = f32::INFINITY;
    for dy in -r..=r {
        for dx in -r..=r {
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            if grid.get_flags(nx as usize, ny as usize).ramp() {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                if d < nearest {
                    nearest = d;
                }
            }
        }
    }
    if !nearest.is_finite() {
        return 0.0;
    }
    let t = (nearest / RAMP_PROTECT_RADIUS).clamp(0.0, 1.0);
    let mask = 1.0 - t;
    mask * mask * (3.0 - 2.0 * mask)
}

/// A single reusable stamp: a square height-delta kernel sampled bilinearly
/// so it can be placed off-grid, rotated, and rescaled.
#[derive(Debug, Clone)]
pub struct DetailStamp {
    pub id: String,
    pub size: usize,
    /// Row-major height deltas in `[-1, 1]`, `size * size` entries.
    pub kernel: Vec<f32>,
    pub max_amplitude: f32,
}

impl DetailStamp {
    pub fn new(id: impl Into<String>, size: usize, kernel: Vec<f32>, max_amplitude: f32) -> Self {
        assert_eq!(kernel.len(), size * size, "stamp kernel must be size*size");
        Self { id: id.into(), size, kernel, max_amplitude }
    }

    /// Procedural radial bump: a common fallback stamp shape (conical with a
    /// smooth shoulder), used when a catalog has no baked kernel for an id.
    pub fn radial_bump(id: impl Into<String>, size: usize, max_amplitude: f32) -> Self {
        let mut kernel = vec![0.0; size * size];
        let c = (size as f32 - 1.0) / 2.0;
        let r = c.max(1.0);
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - c) / r;
                let dy = (y as f32 - c) / r;
                let d = (dx * dx + dy * dy).sqrt().min(1.0);
                let t = 1.0 - d;
                kernel[y * size + x] = t * t * (3.0 - 2.0 * t);
            }
        }
        Self { id: id.into(), size, kernel, max_amplitude }
    }

    /// Bilinear sample of the kernel at normalized coordinates in `[0, 1)`,
    /// after applying `rotation_deg` about the kernel centre.
    fn sample(&self, u: f32, v: f32, rotation_deg: f32) -> f32 {
        let c = (self.size as f32 - 1.0) / 2.0;
        let (su, sv) = if rotation_deg != 0.0 {
            let rad = -rotation_deg.to_radians();
            let (sin, cos) = rad.sin_cos();
            let du = u - 0.5;
            let dv = v - 0.5;
            (0.5 + du * cos - dv * sin, 0.5 + du * sin + dv * cos)
        } else {
            (u, v)
        };

        let fx = su * (self.size as f32 - 1.0);
        let fy = sv * (self.size as f32 - 1.0);
        if fx < 0.0 || fy < 0.0 || fx > (self.size - 1) as f32 || fy > (self.size - 1) as f32 {
            return 0.0;
        }
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;
        let _ = c;

        let k = |x: usize, y: usize| self.kernel[y * self.size + x];
        let top = k(x0, y0) * (1.0 - tx) + k(x1, y0) * tx;
        let bot = k(x0, y1) * (1.0 - tx) + k(x1, y1) * tx;
        top * (1.0 - ty) + bot * ty
    }
}

/// Lookup table of stamps available to a generation run, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StampCatalog {
    stamps: std::collections::HashMap<String, DetailStamp>,
}

impl StampCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stamp: DetailStamp) {
        self.stamps.insert(stamp.id.clone(), stamp);
    }

    pub fn get(&self, id: &str) -> Option<&DetailStamp> {
        self.stamps.get(id)
    }
}

/// Apply one stamp instance centred at `(layer.x, layer.y)` in grid cells,
/// scaled by `layer.scale` (footprint radius in cells) and rotated by
/// `layer.rotation_deg`. The overlay is additive, amplitude-bounded by the
/// stamp's `max_amplitude` and `layer.intensity`, and never writes outside
/// cells that are currently playable and non-boundary — nor onto a ramp or
/// its protected apron, per `rampMask` (spec §4.8).
fn stamp_single(grid: &mut Grid, stamp: &DetailStamp, layer: &DetailLayerConfig, overall_intensity: f32) {
    let radius = (layer.scale.max(1.0)) * stamp.size as f32 / 2.0;
    let cx = layer.x;
    let cy = layer.y;
    let x_min = (cx - radius).floor().max(0.0) as i64;
    let x_max = (cx + radius).ceil() as i64;
    let y_min = (cy - radius).floor().max(0.0) as i64;
    let y_max = (cy + radius).ceil() as i64;

    for gy in y_min..=y_max {
        for gx in x_min..=x_max {
            if !grid.in_bounds(gx, gy) {
                continue;
            }
            let (x, y) = (gx as usize, gy as usize);
            let flags = grid.get_flags(x, y);
            if flags.boundary() || !flags.playable() {
                continue;
            }

            let mask = ramp_mask(grid, x, y);
            if mask > 0.95 {
                continue;
            }

            let u = 0.5 + (gx as f32 - cx) / (2.0 * radius).max(1e-6);
            let v = 0.5 + (gy as f32 - cy) / (2.0 * radius).max(1e-6);
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }

            let safe_amplitude = stamp.max_amplitude * (1.0 - mask) * layer.intensity * overall_intensity;
            let delta = stamp.sample(u, v, layer.rotation_deg) * safe_amplitude;
            if delta.abs() < 1e-5 {
                continue;
            }
            let h = grid.get_height(x, y);
            grid.set_height(x, y, h + delta);
        }
    }
}

/// Apply a layer whose mode tiles the stamp across every cell of a given
/// level id (or every playable cell when `target_level` selects no level,
/// per `TilePlateaus`).
fn apply_tiled(grid: &mut Grid, stamp: &DetailStamp, layer: &DetailLayerConfig, overall_intensity: f32, only_target_level: bool) {
    let spacing = (layer.scale.max(1.0) * stamp.size as f32).max(1.0);
    let cols = grid.cols;
    let rows = grid.rows;

    let mut gy = 0.0f32;
    while gy < rows as f32 {
        let mut gx = 0.0f32;
        while gx < cols as f32 {
            let ix = gx as usize;
            let iy = gy as usize;
            if ix < cols && iy < rows {
                let level_ok = !only_target_level || grid.get_level_id(ix, iy) == layer.target_level;
                if level_ok {
                    let instance = DetailLayerConfig { x: gx, y: gy, ..layer.clone() };
                    stamp_single(grid, stamp, &instance, overall_intensity);
                }
            }
            gx += spacing;
        }
        gy += spacing;
    }
}

fn apply_scatter(grid: &mut Grid, stamp: &DetailStamp, layer: &DetailLayerConfig, overall_intensity: f32) {
    let mut rng = ChaCha8Rng::seed_from_u64(layer.scatter_seed);
    let cols = grid.cols as f32;
    let rows = grid.rows as f32;
    for _ in 0..layer.scatter_count {
        let x = rng.gen_range(0.0..cols);
        let y = rng.gen_range(0.0..rows);
        let rotation = rng.gen_range(0.0..360.0);
        let instance = DetailLayerConfig { x, y, rotation_deg: rotation, ..layer.clone() };
        stamp_single(grid, stamp, &instance, overall_intensity);
    }
}

/// Run the detail stamp pass: apply every configured layer, in order, using
/// stamps resolved from `catalog`. Layers naming an unknown stamp id fall
/// back to a procedural radial bump so a missing catalog entry degrades
/// gracefully instead of silently dropping the layer.
pub fn apply_stamps(grid: &mut Grid, cfg: &DetailConfig, catalog: &StampCatalog) {
    for layer in &cfg.layers {
        let owned_fallback;
        let stamp = match catalog.get(&layer.stamp_id) {
            Some(s) => s,
            None => {
                owned_fallback = DetailStamp::radial_bump(layer.stamp_id.clone(), 16, 20.0);
                &owned_fallback
            }
        };

        match layer.mode {
            StampMode::Single => stamp_single(grid, stamp, layer, cfg.intensity),
            StampMode::TileLevel => apply_tiled(grid, stamp, layer, cfg.intensity, true),
            StampMode::TilePlateaus => apply_tiled(grid, stamp, layer, cfg.intensity, false),
            StampMode::Scatter => apply_scatter(grid, stamp, layer, cfg.intensity),
            StampMode::Paint => stamp_single(grid, stamp, layer, cfg.intensity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playable_grid(cols: i64, rows: i64) -> Grid {
        let mut g = Grid::new(cols, rows).unwrap();
        for y in 0..rows as usize {
            for x in 0..cols as usize {
                g.with_flags(x, y, |f| f.set_playable(true));
            }
        }
        g
    }

    #[test]
    fn single_stamp_raises_centre_height() {
        let mut g = playable_grid(32, 32);
        let mut catalog = StampCatalog::new();
        catalog.insert(DetailStamp::radial_bump("rock", 8, 50.0));
        let layer = DetailLayerConfig {
            stamp_id: "rock".into(),
            mode: StampMode::Single,
            x: 16.0,
            y: 16.0,
            scale: 2.0,
            rotation_deg: 0.0,
            intensity: 1.0,
            target_level: 0,
            scatter_seed: 0,
            scatter_count: 0,
        };
        let cfg = DetailConfig { layers: vec![layer], intensity: 1.0 };
        apply_stamps(&mut g, &cfg, &catalog);
        assert!(g.get_height(16, 16) > 0.0);
    }

    #[test]
    fn boundary_cells_are_never_stamped() {
        let mut g = playable_grid(16, 16);
        g.with_flags(8, 8, |f| f.set_boundary(true));
        let before = g.get_height(8, 8);
        let mut catalog = StampCatalog::new();
        catalog.insert(DetailStamp::radial_bump("rock", 8, 999.0));
        let layer = DetailLayerConfig {
            stamp_id: "rock".into(),
            mode: StampMode::Single,
            x: 8.0,
            y: 8.0,
            scale: 4.0,
            rotation_deg: 0.0,
            intensity: 1.0,
            target_level: 0,
            scatter_seed: 0,
            scatter_count: 0,
        };
        let cfg = DetailConfig { layers: vec![layer], intensity: 1.0 };
        apply_stamps(&mut g, &cfg, &catalog);
        assert_eq!(g.get_height(8, 8), before);
    }

    #[test]
    fn ramp_cells_are_never_stamped() {
        let mut g = playable_grid(32, 32);
        g.with_flags(16, 16, |f| f.set_ramp(true));
        let before = g.get_height(16, 16);
        let mut catalog = StampCatalog::new();
        catalog.insert(DetailStamp::radial_bump("rock", 8, 999.0));
        let layer = DetailLayerConfig {
            stamp_id: "rock".into(),
            mode: StampMode::Single,
            x: 16.0,
            y: 16.0,
            scale: 2.0,
            rotation_deg: 0.0,
            intensity: 1.0,
            target_level: 0,
            scatter_seed: 0,
            scatter_count: 0,
        };
        let cfg = DetailConfig { layers: vec![layer], intensity: 1.0 };
        apply_stamps(&mut g, &cfg, &catalog);
        assert_eq!(g.get_height(16, 16), before);
    }

    #[test]
    fn ramp_apron_dampens_nearby_stamps() {
        let mut far = playable_grid(32, 32);
        let mut near = playable_grid(32, 32);
        near.with_flags(18, 16, |f| f.set_ramp(true));

        let mut catalog = StampCatalog::new();
        catalog.insert(DetailStamp::radial_bump("rock", 8, 50.0));
        let layer = DetailLayerConfig {
            stamp_id: "rock".into(),
            mode: StampMode::Single,
            x: 16.0,
            y: 16.0,
            scale: 2.0,
            rotation_deg: 0.0,
            intensity: 1.0,
            target_level: 0,
            scatter_seed: 0,
            scatter_count: 0,
        };
        let cfg = DetailConfig { layers: vec![layer], intensity: 1.0 };
        apply_stamps(&mut far, &cfg, &catalog);
        apply_stamps(&mut near, &cfg, &catalog);
        assert!(near.get_height(16, 16) < far.get_height(16, 16));
    }

    #[test]
    fn scatter_is_deterministic_for_same_seed() {
        let mut catalog = StampCatalog::new();
        catalog.insert(DetailStamp::radial_bump("rock", 6, 10.0));
        let layer = DetailLayerConfig {
            stamp_id: "rock".into(),
            mode: StampMode::Scatter,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation_deg: 0.0,
            intensity: 1.0,
            target_level: 0,
            scatter_seed: 99,
            scatter_count: 20,
        };
        let cfg = DetailConfig { layers: vec![layer], intensity: 1.0 };

        let mut g1 = playable_grid(64, 64);
        let mut g2 = playable_grid(64, 64);
        apply_stamps(&mut g1, &cfg, &catalog);
        apply_stamps(&mut g2, &cfg, &catalog);
        assert_eq!(g1.height_plane(), g2.height_plane());
    }
}
