//! Error types for the Open Food Facts conversion pipeline.
//!
//! One error type per stage boundary:
//!
//! - [`LoadError`] - reading and decoding the source TSV
//! - [`WriteError`] - serializing and persisting chunk files
//! - [`PipelineError`] - top-level orchestration
//!
//! Row-level data defects are not errors. Rows missing a required field or
//! carrying an unusable identifier are dropped and counted in
//! [`crate::transform::pipeline::PipelineReport`].

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while reading the source table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to open or read the input file.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The TSV reader rejected the file (bad UTF-8, unreadable header, ...).
    #[error("Invalid TSV: {0}")]
    Csv(#[from] csv::Error),

    /// A column declared in the load schema is absent from the header.
    #[error("Missing column in header: {0}")]
    MissingColumn(String),

    /// A row has more fields than the header.
    #[error("Line {line}: expected {expected} fields, saw {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A cell could not be coerced to its declared type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Writer Errors
// =============================================================================

/// Errors while writing chunk files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Output directory or file could not be written.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The finished temporary file could not be moved into place.
    #[error("Failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file unreadable or not matching the load schema.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Output could not be written.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
