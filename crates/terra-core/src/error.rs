//! Error kinds shared by every pass in the pipeline.

use thiserror::Error;

/// Behavioural error kinds for the terrain pipeline.
///
/// `PathNotFound` and `StampDataMissing` are locally recovered by the
/// callers that can produce them (`roads::build_network`, `stamps::apply`)
/// and surfaced as warnings on `PipelineResult` rather than aborting
/// generation. Every other variant is fatal at the pass boundary that
/// detects it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid dimensions: {cols}x{rows}")]
    InvalidDimensions { cols: i64, rows: i64 },

    #[error("out of bounds: ({x}, {y}) not in {cols}x{rows}")]
    OutOfBounds { x: i64, y: i64, cols: usize, rows: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid level transition: |{from} - {to}| > 1")]
    InvalidLevelTransition { from: i8, to: i8 },

    #[error("no path found for segment {from_id} -> {to_id}")]
    PathNotFound { from_id: u32, to_id: u32 },

    #[error("stamp `{stamp_id}` has no loaded height data")]
    StampDataMissing { stamp_id: String },

    #[error("GPU regime unavailable, falling back to CPU: {reason}")]
    GpuUnavailable { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
