//! Mask export (spec §4.10): serializes the finished grid to raw
//! little-endian byte buffers plus a JSON metadata sidecar. No image codec
//! is involved — encoding those buffers into a file format is left to the
//! engine's asset pipeline.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Heightmap quantized to 16 bits, normalized against `(min_height,
/// max_height)`. Little-endian `u16` per cell, row-major.
pub fn export_heightmap16(grid: &Grid, min_height: f32, max_height: f32) -> Vec<u8> {
    let range = (max_height - min_height).max(1e-6);
    let mut out = Vec::with_capacity(grid.cols * grid.rows * 2);
    for &h in grid.height_plane() {
        let norm = ((h - min_height) / range).clamp(0.0, 1.0);
        let q = (norm * u16::MAX as f32).round() as u16;
        out.extend_from_slice(&q.to_le_bytes());
    }
    out
}

/// Level id plane as raw signed bytes, row-major.
pub fn export_level_mask(grid: &Grid) -> Vec<u8> {
    grid.level_plane().iter().map(|&l| l as u8).collect()
}

/// A one-byte-per-cell mask, row-major: `255` where `pred` holds, `0`
/// otherwise. `rows * cols` bytes, pixel-exact with the grid itself.
fn export_byte_mask(grid: &Grid, pred: impl Fn(crate::grid::CellFlags) -> bool) -> Vec<u8> {
    grid.flags_plane().iter().map(|&flags| if pred(flags) { 255u8 } else { 0u8 }).collect()
}

pub fn export_road_mask(grid: &Grid) -> Vec<u8> {
    export_byte_mask(grid, |f| f.road())
}

pub fn export_cliff_mask(grid: &Grid) -> Vec<u8> {
    export_byte_mask(grid, |f| f.cliff())
}

pub fn export_playable_mask(grid: &Grid) -> Vec<u8> {
    export_byte_mask(grid, |f| f.playable())
}

pub fn export_water_mask(grid: &Grid) -> Vec<u8> {
    export_byte_mask(grid, |f| f.water())
}

/// Reconstructs the heightmap as it stood immediately before the detail
/// stamp pass ran (spec §4.8), quantized the same way as
/// [`export_heightmap16`]. `pre_stamp_heights` is the snapshot a
/// [`crate::pipeline::PipelineResult`] carries alongside the finished grid.
pub fn export_pre_stamp_heightmap16(pre_stamp_heights: &[f32], min_height: f32, max_height: f32) -> Vec<u8> {
    let range = (max_height - min_height).max(1e-6);
    let mut out = Vec::with_capacity(pre_stamp_heights.len() * 2);
    for &h in pre_stamp_heights {
        let norm = ((h - min_height) / range).clamp(0.0, 1.0);
        let q = (norm * u16::MAX as f32).round() as u16;
        out.extend_from_slice(&q.to_le_bytes());
    }
    out
}

/// Pack heightmap (high byte only, for a quick low-res preview), level id,
/// and a road/cliff/water/playable nibble into one RGBA byte per cell —
/// a convenience format for engines that want a single texture to preview
/// a generated tile.
pub fn pack_rgba(grid: &Grid, min_height: f32, max_height: f32) -> Vec<u8> {
    let range = (max_height - min_height).max(1e-6);
    let mut out = Vec::with_capacity(grid.cols * grid.rows * 4);
    for (i, &flags) in grid.flags_plane().iter().enumerate() {
        let h = grid.height_plane()[i];
        let norm = ((h - min_height) / range).clamp(0.0, 1.0);
        let r = (norm * 255.0).round() as u8;
        let g = grid.level_plane()[i] as u8;
        let mut b = 0u8;
        if flags.road() {
            b |= 1 << 0;
        }
        if flags.cliff() {
            b |= 1 << 1;
        }
        if flags.water() {
            b |= 1 << 2;
        }
        if flags.ramp() {
            b |= 1 << 3;
        }
        let a = if flags.playable() { 255 } else { 0 };
        out.extend_from_slice(&[r, g, b, a]);
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub cols: usize,
    pub rows: usize,
    pub cell_size_units: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub seed: u64,
    pub min_level: i8,
    pub max_level: i8,
}

pub fn export_metadata(
    grid: &Grid,
    cell_size_units: f32,
    min_height: f32,
    max_height: f32,
    seed: u64,
) -> ExportMetadata {
    let (mut min_level, mut max_level) = (i8::MAX, i8::MIN);
    for &l in grid.level_plane() {
        min_level = min_level.min(l);
        max_level = max_level.max(l);
    }
    if grid.level_plane().is_empty() {
        min_level = 0;
        max_level = 0;
    }
    ExportMetadata {
        cols: grid.cols,
        rows: grid.rows,
        cell_size_units,
        min_height,
        max_height,
        seed,
        min_level,
        max_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heightmap16_spans_full_range_at_extremes() {
        let mut g = Grid::new(2, 1).unwrap();
        g.set_height(0, 0, 0.0);
        g.set_height(1, 0, 100.0);
        let bytes = export_heightmap16(&g, 0.0, 100.0);
        assert_eq!(bytes.len(), 4);
        let first = u16::from_le_bytes([bytes[0], bytes[1]]);
        let second = u16::from_le_bytes([bytes[2], bytes[3]]);
        assert_eq!(first, 0);
        assert_eq!(second, u16::MAX);
    }

    #[test]
    fn byte_mask_is_one_byte_per_cell_255_or_0() {
        let mut g = Grid::new(8, 1).unwrap();
        g.with_flags(0, 0, |f| f.set_road(true));
        g.with_flags(7, 0, |f| f.set_road(true));
        let mask = export_road_mask(&g);
        assert_eq!(mask.len(), 8);
        assert_eq!(mask[0], 255);
        assert_eq!(mask[7], 255);
        for &b in &mask[1..7] {
            assert_eq!(b, 0);
        }
    }

    #[test]
    fn pre_stamp_heightmap_matches_heightmap16_format() {
        let heights = vec![0.0, 100.0];
        let a = export_pre_stamp_heightmap16(&heights, 0.0, 100.0);
        let mut g = Grid::new(2, 1).unwrap();
        g.set_height(0, 0, 0.0);
        g.set_height(1, 0, 100.0);
        let b = export_heightmap16(&g, 0.0, 100.0);
        assert_eq!(a, b);
    }

    #[test]
    fn rgba_pack_has_four_bytes_per_cell() {
        let g = Grid::new(4, 4).unwrap();
        let bytes = pack_rgba(&g, 0.0, 1.0);
        assert_eq!(bytes.len(), 4 * 4 * 4);
    }

    #[test]
    fn metadata_reports_grid_dimensions() {
        let g = Grid::new(17, 33).unwrap();
        let meta = export_metadata(&g, 100.0, 0.0, 1000.0, 42);
        assert_eq!(meta.cols, 17);
        assert_eq!(meta.rows, 33);
        assert_eq!(meta.seed, 42);
    }
}
