//! Two-pass cascade domain warp, used to break up the periodicity of a raw
//! lattice noise field and produce organic coastlines.

use super::fbm::fbm;

const WARP_OCTAVES: u32 = 4;
const WARP_PERSISTENCE: f64 = 0.5;
const WARP_LACUNARITY: f64 = 2.0;

/// One warp pass: offset `(x, y)` by `strength * (fbm(x+seed, y), fbm(x, y+seed+100))`.
fn warp_pass(x: f64, y: f64, strength: f64, seed: u32) -> (f64, f64) {
    let dx = fbm(x + seed as f64, y, seed, WARP_OCTAVES, WARP_PERSISTENCE, WARP_LACUNARITY) * 2.0 - 1.0;
    let dy = fbm(x, y + seed as f64 + 100.0, seed.wrapping_add(1), WARP_OCTAVES, WARP_PERSISTENCE, WARP_LACUNARITY) * 2.0 - 1.0;
    (x + dx * strength, y + dy * strength)
}

/// Two-pass cascade domain warp: apply `warp_pass` once, then apply it
/// again to the already-displaced coordinates (spec §4.2's "repeat on the
/// result"). Returns warped `(x', y')` for use as subsequent noise input.
pub fn warp(x: f64, y: f64, strength: f64, seed: u32) -> (f64, f64) {
    let (x1, y1) = warp_pass(x, y, strength, seed);
    warp_pass(x1, y1, strength, seed.wrapping_add(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_strength_is_identity() {
        let (xo, yo) = warp(1.23, 4.56, 0.0, 42);
        assert!((xo - 1.23).abs() < 1e-9 && (yo - 4.56).abs() < 1e-9);
    }

    #[test]
    fn nonzero_strength_moves_point() {
        let (xo, yo) = warp(0.5, 0.5, 0.2, 7);
        let moved = (xo - 0.5).abs() > 1e-9 || (yo - 0.5).abs() > 1e-9;
        assert!(moved, "non-zero warp strength must displace the point");
    }

    #[test]
    fn deterministic() {
        assert_eq!(warp(2.0, 3.0, 0.3, 11), warp(2.0, 3.0, 0.3, 11));
    }
}
