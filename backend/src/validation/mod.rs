//! JSON Schema validation of output records.
//!
//! The importer contract is embedded at compile time from
//! `schemas/nutrition-fact.json` (Draft 7). The pipeline checks each record
//! before it is written; the `validate` CLI command checks existing files.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use off_to_mf::validation::is_valid_nutrition_fact;
//!
//! let fact = json!({ "mainUPC": "2001234567890", "foodDesc": "Store loaf" });
//! assert!(!is_valid_nutrition_fact(&fact));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::transform::mapper::MAIN_UPC;

static NUTRITION_FACT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/nutrition-fact.json"))
        .expect("Invalid embedded schema")
});

static NUTRITION_FACT_VALIDATOR: Lazy<jsonschema::Validator> = Lazy::new(|| {
    jsonschema::draft7::new(&NUTRITION_FACT_SCHEMA).expect("Invalid embedded schema")
});

/// Validate one output record against the importer contract.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate_nutrition_fact(data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = NUTRITION_FACT_VALIDATOR
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check against the importer contract.
pub fn is_valid_nutrition_fact(data: &Value) -> bool {
    NUTRITION_FACT_VALIDATOR.is_valid(data)
}

/// An invalid line in a JSONL file
#[derive(Debug, Clone)]
pub struct InvalidLine {
    /// 1-based line number
    pub line: usize,
    /// `mainUPC` of the record when it could be read
    pub main_upc: Option<String>,
    pub errors: Vec<String>,
}

/// Outcome of checking one JSONL file
#[derive(Debug, Clone, Default)]
pub struct FileValidation {
    pub valid: usize,
    pub invalid: Vec<InvalidLine>,
}

impl FileValidation {
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Check every line of a JSONL output file.
///
/// Lines that are not JSON count as invalid; only IO failures are errors.
pub fn validate_jsonl_file(path: &Path) -> std::io::Result<FileValidation> {
    let reader = BufReader::new(File::open(path)?);
    let mut result = FileValidation::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = idx + 1;

        let value: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                result.invalid.push(InvalidLine {
                    line: line_num,
                    main_upc: None,
                    errors: vec![format!("Not JSON: {}", e)],
                });
                continue;
            }
        };

        match validate_nutrition_fact(&value) {
            Ok(()) => result.valid += 1,
            Err(errors) => result.invalid.push(InvalidLine {
                line: line_num,
                main_upc: value.get(MAIN_UPC).and_then(Value::as_str).map(str::to_string),
                errors,
            }),
        }
    }

    Ok(result)
}
