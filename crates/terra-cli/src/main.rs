//! Command-line shell over the terrain generation parameter record.
//!
//! Subcommands mirror the pipeline's natural checkpoints: `generate` runs
//! the whole thing and writes every export format, `export` re-projects a
//! freshly regenerated grid into one requested packing, and `apply-stamp`
//! demonstrates the coarse regenerate-then-overlay workflow the detail
//! stamp system is built for.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use terra_core::config::GenerationParams;
use terra_core::export;
use terra_core::stamps::{DetailStamp, StampCatalog};

#[derive(Parser, Debug)]
#[command(name = "terra-cli", about = "Terrain heightmap generation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and write every export format to `--out-dir`.
    Generate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Regenerate from `--config` and write one requested export format.
    Export {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = Format::R16)]
        format: Format,
    },
    /// Regenerate, apply one detail stamp post-hoc, and re-export.
    ApplyStamp {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long)]
        stamp: String,
        #[arg(long)]
        x: f32,
        #[arg(long)]
        y: f32,
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        #[arg(long = "rotation-deg", default_value_t = 0.0)]
        rotation_deg: f32,
        #[arg(long, default_value_t = 0.5)]
        intensity: f32,
    },
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum Format {
    R16,
    Rgba,
}

fn load_params(config: &Option<PathBuf>) -> Result<GenerationParams> {
    match config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(GenerationParams::default()),
    }
}

fn write_all_exports(grid: &terra_core::Grid, params: &GenerationParams, seed: u64, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let (min_h, max_h) = height_extent(grid);

    fs::write(out_dir.join("heightmap.r16"), export::export_heightmap16(grid, min_h, max_h))?;
    fs::write(out_dir.join("levelMask.u8"), export::export_level_mask(grid))?;
    fs::write(out_dir.join("roadMask.u8"), export::export_road_mask(grid))?;
    fs::write(out_dir.join("cliffMask.u8"), export::export_cliff_mask(grid))?;
    fs::write(out_dir.join("playableMask.u8"), export::export_playable_mask(grid))?;

    let meta = export::export_metadata(grid, params.grid.cell_size_units, min_h, max_h, seed);
    fs::write(out_dir.join("metadata.json"), serde_json::to_vec_pretty(&meta)?)?;
    Ok(())
}

fn height_extent(grid: &terra_core::Grid) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &h in grid.height_plane() {
        min = min.min(h);
        max = max.max(h);
    }
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else {
        (min, max)
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let catalog = StampCatalog::new();

    match cli.command {
        Command::Generate { config, out_dir, seed } => {
            let params = load_params(&config)?;
            let result = terra_core::generate(&params, &catalog, seed)?;
            for w in &result.warnings {
                eprintln!("warning: {w}");
            }
            write_all_exports(&result.grid, &params, seed, &out_dir)?;
            println!("wrote terrain to {}", out_dir.display());
        }
        Command::Export { config, out_dir, seed, format } => {
            let params = load_params(&config)?;
            let result = terra_core::generate(&params, &catalog, seed)?;
            fs::create_dir_all(&out_dir)?;
            let (min_h, max_h) = height_extent(&result.grid);
            match format {
                Format::R16 => {
                    fs::write(out_dir.join("heightmap.r16"), export::export_heightmap16(&result.grid, min_h, max_h))?;
                }
                Format::Rgba => {
                    fs::write(out_dir.join("heightmap.rgba"), export::pack_rgba(&result.grid, min_h, max_h))?;
                }
            }
            println!("wrote {:?} export to {}", format, out_dir.display());
        }
        Command::ApplyStamp { config, out_dir, seed, stamp, x, y, scale, rotation_deg, intensity } => {
            let params = load_params(&config)?;
            let mut result = terra_core::generate(&params, &catalog, seed)?;

            let mut post_catalog = StampCatalog::new();
            post_catalog.insert(DetailStamp::radial_bump(stamp.clone(), 24, 30.0));
            let layer = terra_core::config::DetailLayerConfig {
                stamp_id: stamp,
                mode: terra_core::config::StampMode::Single,
                x,
                y,
                scale,
                rotation_deg,
                intensity,
                target_level: 0,
                scatter_seed: 0,
                scatter_count: 0,
            };
            let detail = terra_core::config::DetailConfig { layers: vec![layer], intensity: 1.0 };
            terra_core::stamps::apply_stamps(&mut result.grid, &detail, &post_catalog);

            write_all_exports(&result.grid, &params, seed, &out_dir)?;
            println!("applied stamp and wrote terrain to {}", out_dir.display());
        }
    }

    Ok(0)
}

fn main() -> Result<()> {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = match e.downcast_ref::<terra_core::Error>() {
                Some(terra_core::Error::InvalidParameter { .. }) | Some(terra_core::Error::InvalidDimensions { .. }) => 1,
                _ => 2,
            };
            std::process::exit(code);
        }
    }
}
