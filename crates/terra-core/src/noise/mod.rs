//! Deterministic, seedable 2D noise primitives (spec §4.2).
//!
//! Every primitive here is a pure function of its arguments — no global
//! state, no RNG drift between calls — so the same `(position, seed)` pair
//! always reproduces the same value, on any target.

pub mod billow;
pub mod fbm;
pub mod gradient;
pub mod hash;
pub mod ridged;
pub mod voronoi;
pub mod warp;

pub use billow::billow_noise;
pub use fbm::{fbm as fbm_fn, turbulence};
pub use gradient::gradient_noise;
pub use hash::{hash2, hash3};
pub use ridged::ridged_multifractal;
pub use voronoi::{voronoi, voronoi_edges};
pub use warp::warp;
