//! Parameter record partitions (spec §6) plus validation.
//!
//! Each struct mirrors one `spec.md` §6 partition and derives `serde` with
//! `deny_unknown_fields`, so a malformed or stale config is rejected at
//! parameter-validation time rather than silently ignored (spec §9).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub rows: i64,
    pub cols: i64,
    pub cell_size_units: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 256, cols: 256, cell_size_units: 100.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    pub seed: u64,
    pub noise_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub warp_strength: f64,
    pub ridge_strength: f32,
    pub hill_strength: f32,
    pub sea_level: f32,
    pub height_scale: f32,
    pub plains_flat: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            noise_scale: 1.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            warp_strength: 0.5,
            ridge_strength: 0.6,
            hill_strength: 0.5,
            sea_level: 0.12,
            height_scale: 2000.0,
            plains_flat: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    pub min_level: i8,
    pub max_level: i8,
    pub max_walkable_level: i8,
    pub transition_width: f32,
    /// Continuous-blend thresholds before bucketing: water, lowland, hill, mountain.
    pub water_threshold: f32,
    pub lowland_threshold: f32,
    pub hill_threshold: f32,
    pub mountain_threshold: f32,
    /// Nominal vertical spacing between adjacent levels, engine units.
    pub level_step: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            min_level: -1,
            max_level: 3,
            max_walkable_level: 3,
            transition_width: 0.05,
            water_threshold: 0.02,
            lowland_threshold: 0.25,
            hill_threshold: 0.5,
            mountain_threshold: 0.75,
            level_step: 270.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    Mountain,
    Cliff,
    Water,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BorderConfig {
    pub enabled: bool,
    pub kind: BorderKind,
    pub height: f32,
    pub width: usize,
    pub smoothness: f32,
    pub exit_count: u32,
    pub exit_width: usize,
    pub exit_positions: Vec<(usize, usize)>,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: BorderKind::Mountain,
            height: 1200.0,
            width: 24,
            smoothness: 0.5,
            exit_count: 2,
            exit_width: 8,
            exit_positions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RampConfig {
    pub ramp_width: usize,
    pub max_angle_deg: f32,
    pub min_angle_deg: f32,
    pub noise_amplitude: f32,
    pub ramps_per_transition: u32,
    pub iterations: u32,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            ramp_width: 6,
            max_angle_deg: 35.0,
            min_angle_deg: 5.0,
            noise_amplitude: 4.0,
            ramps_per_transition: 2,
            iterations: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErosionConfig {
    pub thermal_enabled: bool,
    pub talus_angle: f32,
    pub erosion_strength: f32,
    pub thermal_iterations: u32,
    pub hydraulic_enabled: bool,
    pub hydraulic_iterations: u32,
    pub evaporation_rate: f32,
    pub rain_rate: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            thermal_enabled: true,
            talus_angle: 40.0,
            erosion_strength: 0.5,
            thermal_iterations: 3,
            hydraulic_enabled: true,
            hydraulic_iterations: 20,
            evaporation_rate: 0.02,
            rain_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampMode {
    Single,
    TileLevel,
    TilePlateaus,
    Scatter,
    Paint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailLayerConfig {
    pub stamp_id: String,
    pub mode: StampMode,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation_deg: f32,
    pub intensity: f32,
    /// Target level id for `TileLevel` mode; ignored otherwise.
    pub target_level: i8,
    /// Random seed for `Scatter` mode placements.
    pub scatter_seed: u64,
    pub scatter_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailConfig {
    pub layers: Vec<DetailLayerConfig>,
    pub intensity: f32,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self { layers: Vec::new(), intensity: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeCurve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoadConfig {
    pub road_width: f32,
    pub simplification_epsilon: f32,
    pub max_extra_edges: u32,
    pub smoothing_passes: u32,
    pub slope_curve: SlopeCurve,
    pub random_poi_count: u32,
    pub random_poi_seed: u64,
    pub min_poi_distance: f32,
    /// Edge-weight surcharge per level of difference between two POIs, on
    /// top of straight-line distance, so the MST favours same-level routes.
    pub level_penalty: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            road_width: 6.0,
            simplification_epsilon: 1.5,
            max_extra_edges: 3,
            smoothing_passes: 2,
            slope_curve: SlopeCurve::EaseInOut,
            random_poi_count: 0,
            random_poi_seed: 7,
            min_poi_distance: 20.0,
            level_penalty: 50.0,
        }
    }
}

/// The full generation parameter record (spec §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationParams {
    pub grid: GridConfig,
    pub noise: NoiseConfig,
    pub level: LevelConfig,
    pub border: BorderConfig,
    pub ramp: RampConfig,
    pub erosion: ErosionConfig,
    pub detail: DetailConfig,
    pub road: RoadConfig,
}

impl GenerationParams {
    /// Validate cross-field invariants not expressible in the type system
    /// alone. Called once, before pass 1, by `Pipeline::generate`.
    pub fn validate(&self) -> Result<()> {
        if self.grid.cols <= 0 || self.grid.rows <= 0 {
            return Err(Error::InvalidDimensions { cols: self.grid.cols, rows: self.grid.rows });
        }
        if self.level.max_level < self.level.min_level {
            return Err(Error::InvalidParameter {
                name: "level.max_level",
                reason: format!(
                    "max_level ({}) < min_level ({})",
                    self.level.max_level, self.level.min_level
                ),
            });
        }
        if self.noise.persistence <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "noise.persistence",
                reason: "must be > 0".into(),
            });
        }
        if self.noise.lacunarity <= 1.0 {
            return Err(Error::InvalidParameter {
                name: "noise.lacunarity",
                reason: "must be > 1".into(),
            });
        }
        if self.noise.octaves == 0 {
            return Err(Error::InvalidParameter {
                name: "noise.octaves",
                reason: "must be >= 1".into(),
            });
        }
        if self.ramp.min_angle_deg >= self.ramp.max_angle_deg {
            return Err(Error::InvalidParameter {
                name: "ramp.min_angle_deg",
                reason: "must be < ramp.max_angle_deg".into(),
            });
        }
        for layer in &self.detail.layers {
            if layer.intensity < 0.0 || layer.intensity > 1.0 {
                return Err(Error::InvalidParameter {
                    name: "detail.layers[].intensity",
                    reason: "must be within [0, 1]".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(GenerationParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_max_level_below_min_level() {
        let mut p = GenerationParams::default();
        p.level.min_level = 3;
        p.level.max_level = 1;
        assert!(matches!(p.validate(), Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let mut p = GenerationParams::default();
        p.grid.cols = 0;
        assert!(matches!(p.validate(), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn rejects_zero_persistence() {
        let mut p = GenerationParams::default();
        p.noise.persistence = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn json_roundtrip_rejects_unknown_fields() {
        let json = r#"{"unknown_field": 1}"#;
        let result: std::result::Result<GridConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
