//! Hydraulic erosion: a seeded droplet simulation. Each droplet walks
//! downhill across the height plane, picking up sediment in proportion to
//! its speed and carry capacity, depositing the excess when capacity drops,
//! and evaporating until its water runs out. Fully seeded by
//! `rand_chacha::ChaCha8Rng` so two runs with the same seed erode
//! identically (spec's named reproducibility fix: the original engine
//! reached for `Math.random()` here).

use crate::config::ErosionConfig;
use crate::grid::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const INERTIA: f32 = 0.3;
const MIN_SLOPE: f32 = 1e-3;
const CAPACITY_FACTOR: f32 = 8.0;
const DEPOSIT_SPEED: f32 = 0.3;
const ERODE_SPEED: f32 = 0.3;
const MAX_STEPS: u32 = 64;
const INITIAL_SPEED: f32 = 1.0;
const INITIAL_WATER: f32 = 1.0;
const MIN_HEIGHT_DELTA: f32 = -1.0e6;

struct Droplet {
    x: f32,
    y: f32,
    dir_x: f32,
    dir_y: f32,
    speed: f32,
    water: f32,
    sediment: f32,
}

/// Bilinear height and gradient sample at a continuous position.
fn height_and_gradient(grid: &Grid, x: f32, y: f32) -> (f32, f32, f32) {
    let cols = grid.cols;
    let rows = grid.rows;
    let x0 = x.floor().clamp(0.0, (cols - 2) as f32) as usize;
    let y0 = y.floor().clamp(0.0, (rows - 2) as f32) as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let h00 = grid.get_height(x0, y0);
    let h10 = grid.get_height(x0 + 1, y0);
    let h01 = grid.get_height(x0, y0 + 1);
    let h11 = grid.get_height(x0 + 1, y0 + 1);

    let grad_x = (h10 - h00) * (1.0 - fy) + (h11 - h01) * fy;
    let grad_y = (h01 - h00) * (1.0 - fx) + (h11 - h10) * fx;
    let height = h00 * (1.0 - fx) * (1.0 - fy) + h10 * fx * (1.0 - fy) + h01 * (1.0 - fx) * fy + h11 * fx * fy;
    (height, grad_x, grad_y)
}

fn deposit_or_erode(grid: &mut Grid, x: f32, y: f32, amount: f32) {
    // Distribute across the four cells the droplet currently straddles,
    // weighted by bilinear proximity, matching how height was sampled.
    let cols = grid.cols;
    let rows = grid.rows;
    let x0 = x.floor().clamp(0.0, (cols - 2) as f32) as usize;
    let y0 = y.floor().clamp(0.0, (rows - 2) as f32) as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let weights = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];
    for (wx, wy, w) in weights {
        let h = grid.get_height(wx, wy);
        grid.set_height(wx, wy, (h + amount * w).max(MIN_HEIGHT_DELTA));
    }
}

fn simulate_droplet(grid: &mut Grid, rng: &mut ChaCha8Rng, cfg: &ErosionConfig) {
    let cols = grid.cols as f32;
    let rows = grid.rows as f32;
    let mut d = Droplet {
        x: rng.gen_range(1.0..(cols - 2.0).max(2.0)),
        y: rng.gen_range(1.0..(rows - 2.0).max(2.0)),
        dir_x: 0.0,
        dir_y: 0.0,
        speed: INITIAL_SPEED,
        water: INITIAL_WATER * cfg.rain_rate.max(0.01) / 0.1,
        sediment: 0.0,
    };

    for _ in 0..MAX_STEPS {
        if d.water <= 1e-4 {
            break;
        }
        let (h0, grad_x, grad_y) = height_and_gradient(grid, d.x, d.y);

        d.dir_x = d.dir_x * INERTIA - grad_x * (1.0 - INERTIA);
        d.dir_y = d.dir_y * INERTIA - grad_y * (1.0 - INERTIA);
        let len = (d.dir_x * d.dir_x + d.dir_y * d.dir_y).sqrt();
        if len < 1e-6 {
            break;
        }
        d.dir_x /= len;
        d.dir_y /= len;

        let new_x = d.x + d.dir_x;
        let new_y = d.y + d.dir_y;
        if new_x < 1.0 || new_y < 1.0 || new_x > cols - 2.0 || new_y > rows - 2.0 {
            break;
        }

        let (h1, _, _) = height_and_gradient(grid, new_x, new_y);
        let height_delta = h1 - h0;

        let capacity = (-height_delta).max(MIN_SLOPE) * d.speed * d.water * CAPACITY_FACTOR;

        if height_delta >= 0.0 || d.sediment > capacity {
            // Flowing uphill, or carrying more than capacity: deposit.
            let deposit = if height_delta >= 0.0 {
                (height_delta.min(d.sediment)).max(0.0)
            } else {
                (d.sediment - capacity) * DEPOSIT_SPEED
            };
            d.sediment -= deposit;
            deposit_or_erode(grid, d.x, d.y, deposit);
        } else {
            let erode = ((capacity - d.sediment) * ERODE_SPEED).min(-height_delta);
            deposit_or_erode(grid, d.x, d.y, -erode);
            d.sediment += erode;
        }

        d.speed = (d.speed * d.speed + height_delta.abs() * 2.0).sqrt().max(0.01);
        d.water *= 1.0 - cfg.evaporation_rate.clamp(0.0, 0.99);
        d.x = new_x;
        d.y = new_y;
    }
}

pub fn apply_hydraulic(grid: &mut Grid, cfg: &ErosionConfig, _cell_size: f32, seed: u64) {
    if grid.cols < 3 || grid.rows < 3 {
        return;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..cfg.hydraulic_iterations {
        simulate_droplet(grid, &mut rng, cfg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_with_same_seed() {
        let mut g1 = Grid::new(32, 32).unwrap();
        let mut g2 = Grid::new(32, 32).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                let h = ((x as f32 - 16.0).powi(2) + (y as f32 - 16.0).powi(2)).sqrt() * -5.0 + 400.0;
                g1.set_height(x, y, h);
                g2.set_height(x, y, h);
            }
        }
        let cfg = ErosionConfig { hydraulic_iterations: 50, ..ErosionConfig::default() };
        apply_hydraulic(&mut g1, &cfg, 10.0, 77);
        apply_hydraulic(&mut g2, &cfg, 10.0, 77);
        assert_eq!(g1.height_plane(), g2.height_plane());
    }

    #[test]
    fn different_seed_differs() {
        let base = |seed: u64| {
            let mut g = Grid::new(32, 32).unwrap();
            for y in 0..32 {
                for x in 0..32 {
                    let h = ((x as f32 - 16.0).powi(2) + (y as f32 - 16.0).powi(2)).sqrt() * -5.0 + 400.0;
                    g.set_height(x, y, h);
                }
            }
            let cfg = ErosionConfig { hydraulic_iterations: 50, ..ErosionConfig::default() };
            apply_hydraulic(&mut g, &cfg, 10.0, seed);
            g
        };
        let g1 = base(1);
        let g2 = base(2);
        let differs = g1.height_plane().iter().zip(g2.height_plane()).any(|(a, b)| (a - b).abs() > 1e-4);
        assert!(differs);
    }

    #[test]
    fn tiny_grid_is_a_no_op() {
        let mut g = Grid::new(2, 2).unwrap();
        apply_hydraulic(&mut g, &ErosionConfig::default(), 10.0, 1);
        for &h in g.height_plane() {
            assert_eq!(h, 0.0);
        }
    }
}
