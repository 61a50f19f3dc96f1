//! Fixed conversion constants and run options.
//!
//! Chunk size and file prefix are part of the contract with the downstream
//! importer and are never exposed as CLI flags.

use std::path::PathBuf;

/// Maximum number of records per output file.
pub const CHUNK_SIZE: usize = 75_000;

/// Output file name prefix; files are `<prefix><index>.jsonl`.
pub const NAME_PREFIX: &str = "off_mf_";

/// Folder holding the Open Food Facts export.
pub const OFF_FOLDER_PATH: &str = "data";

/// File name of the Open Food Facts export (tab separated despite the extension).
pub const OFF_FILE_NAME: &str = "en.openfoodfacts.org.products.csv";

/// Directory receiving the chunk files.
pub const OUTPUT_DIR: &str = "output";

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Source TSV file
    pub input_path: PathBuf,

    /// Directory for chunk files, created if missing
    pub output_dir: PathBuf,

    /// Records per chunk file
    pub chunk_size: usize,

    /// Chunk file name prefix
    pub name_prefix: String,

    /// Skip the schema check of each output record
    pub skip_validation: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            chunk_size: CHUNK_SIZE,
            name_prefix: NAME_PREFIX.to_string(),
            skip_validation: false,
        }
    }
}

/// `data/en.openfoodfacts.org.products.csv`
pub fn default_input_path() -> PathBuf {
    PathBuf::from(OFF_FOLDER_PATH).join(OFF_FILE_NAME)
}
