//! # off-to-mf - Open Food Facts to nutrition-fact JSONL
//!
//! Converts the Open Food Facts TSV export into the line-delimited JSON
//! format read by the food-database importer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌────────┐   ┌────────┐   ┌──────────┐   ┌────────────┐
//! │  Loader  │──▶│ Cleaner │──▶│ Mapper │──▶│ Filter │──▶│ Enricher │──▶│ ChunkWriter│
//! │  (TSV)   │   │         │   │        │   │ (UPC)  │   │ (boost)  │   │ off_mf_N   │
//! └──────────┘   └─────────┘   └────────┘   └────────┘   └──────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use off_to_mf::{run, PipelineOptions};
//!
//! let report = run(&PipelineOptions::default()).unwrap();
//! println!("Wrote {} records", report.written);
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Fixed constants and run options
//! - [`error`] - Error types per stage
//! - [`logs`] - Leveled logging
//! - [`models`] - Record shapes per stage
//! - [`parser`] - TSV loader
//! - [`transform`] - Cleaner, Mapper, Filter, Enricher, pipeline
//! - [`writer`] - Chunked JSONL output
//! - [`validation`] - Importer schema check

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod validation;
pub mod writer;

// =============================================================================
// Re-exports - Errors and configuration
// =============================================================================

pub use config::{PipelineOptions, CHUNK_SIZE, NAME_PREFIX, OUTPUT_DIR};
pub use error::{LoadError, PipelineError, WriteError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{DefaultServing, MappedRecord, NutritionFact, SourceRecord, Weight};

// =============================================================================
// Re-exports - Loader
// =============================================================================

pub use parser::{Loader, SOURCE_COLUMNS};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    preview,
    run,
    run_with_loader,
    transform_record,
    transform_records,
    Outcome,
    PipelineReport,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use validation::{is_valid_nutrition_fact, validate_jsonl_file, validate_nutrition_fact};
pub use writer::{write_jsonl_chunks, ChunkWriter};
