//! High-level pipeline API: TSV export in, chunked JSONL out.
//!
//! # Example
//!
//! ```rust,ignore
//! use off_to_mf::{run, PipelineOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = run(&PipelineOptions::default())?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

use super::cleaner::clean;
use super::enricher::enrich;
use super::filter::{filter_record, Rejection};
use super::mapper::map_record;
use crate::config::PipelineOptions;
use crate::error::{LoadResult, PipelineResult};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::{NutritionFact, SourceRecord};
use crate::parser::Loader;
use crate::validation::validate_nutrition_fact;
use crate::writer::ChunkWriter;

/// Invalid output records logged in detail before only counting.
const MAX_LOGGED_INVALID: usize = 3;

/// What happened to one loaded row
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Kept(NutritionFact),
    /// A required column was empty
    MissingRequired(&'static str),
    InvalidIdentifier(Rejection),
}

/// Run one row through Cleaner, Mapper, Filter and Enricher.
pub fn transform_record(row: SourceRecord) -> Outcome {
    let clean = match clean(row) {
        Ok(clean) => clean,
        Err(column) => return Outcome::MissingRequired(column),
    };

    match filter_record(map_record(clean)) {
        Ok(mapped) => Outcome::Kept(enrich(mapped)),
        Err(rejection) => Outcome::InvalidIdentifier(rejection),
    }
}

/// Statistics of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub rows_read: usize,
    pub missing_required: usize,
    pub invalid_identifier: usize,
    pub written: usize,
    /// Records failing the importer schema (0 unless a stage is broken)
    pub invalid_output: usize,
    pub files: Vec<PathBuf>,
}

impl PipelineReport {
    /// Count an outcome; returns the record when it is kept.
    pub fn record(&mut self, outcome: Outcome) -> Option<NutritionFact> {
        self.rows_read += 1;
        match outcome {
            Outcome::Kept(fact) => Some(fact),
            Outcome::MissingRequired(_) => {
                self.missing_required += 1;
                None
            }
            Outcome::InvalidIdentifier(_) => {
                self.invalid_identifier += 1;
                None
            }
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Read: {} rows, {} missing required fields, {} invalid identifiers, {} written to {} files",
            self.rows_read,
            self.missing_required,
            self.invalid_identifier,
            self.written,
            self.files.len()
        )
    }
}

/// Transform a stream of loaded rows, skipping dropped ones.
pub fn transform_records<I>(rows: I) -> impl Iterator<Item = NutritionFact>
where
    I: IntoIterator<Item = SourceRecord>,
{
    rows.into_iter().filter_map(|row| match transform_record(row) {
        Outcome::Kept(fact) => Some(fact),
        _ => None,
    })
}

/// Run the pipeline on the configured input file.
pub fn run(options: &PipelineOptions) -> PipelineResult<PipelineReport> {
    log_info(format!("📖 Reading {}", options.input_path.display()));
    let loader = Loader::open(&options.input_path)?;
    run_with_loader(loader, options)
}

/// Run the pipeline on an already opened loader.
///
/// A load or write error aborts the run. Chunks written before the error
/// stay complete; the chunk being buffered is discarded.
pub fn run_with_loader<R: Read>(loader: Loader<R>, options: &PipelineOptions) -> PipelineResult<PipelineReport> {
    log_success(format!("Resolved {} schema columns", loader.resolved_count()));

    let mut report = PipelineReport::default();
    let mut writer = ChunkWriter::create(&options.output_dir, options.name_prefix.clone(), options.chunk_size)?;

    log_info(format!(
        "⚙️  Transforming into {} (chunks of {})",
        options.output_dir.display(),
        options.chunk_size
    ));

    for row in loader {
        let Some(fact) = report.record(transform_record(row?)) else {
            continue;
        };

        if !options.skip_validation {
            check_output(&fact, &mut report);
        }

        report.written += 1;
        writer.push(fact)?;
    }

    report.files = writer.finish()?;

    if report.missing_required > 0 {
        log_warning(format!("{} rows skipped (missing required fields)", report.missing_required));
    }
    if report.invalid_identifier > 0 {
        log_warning(format!("{} rows skipped (invalid identifier)", report.invalid_identifier));
    }
    if report.invalid_output > 0 {
        log_error(format!("{} records failed schema validation", report.invalid_output));
    }
    log_success(report.summary());

    Ok(report)
}

/// Transform the first `limit` kept records without writing anything.
pub fn preview<R: Read>(loader: Loader<R>, limit: usize) -> LoadResult<Vec<NutritionFact>> {
    let mut kept = Vec::new();
    for row in loader {
        if kept.len() >= limit {
            break;
        }
        if let Outcome::Kept(fact) = transform_record(row?) {
            kept.push(fact);
        }
    }
    Ok(kept)
}

fn check_output(fact: &NutritionFact, report: &mut PipelineReport) {
    let errors = match serde_json::to_value(fact) {
        Ok(value) => match validate_nutrition_fact(&value) {
            Ok(()) => return,
            Err(errors) => errors,
        },
        Err(e) => vec![e.to_string()],
    };

    report.invalid_output += 1;
    if report.invalid_output <= MAX_LOGGED_INVALID {
        log_error(format!("Record {}: {}", fact.main_upc, errors.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fixtures::{full_header, row};
    use serde_json::Value;
    use std::fs;
    use std::path::Path;

    fn options(dir: &Path, chunk_size: usize) -> PipelineOptions {
        PipelineOptions {
            input_path: dir.join("products.csv"),
            output_dir: dir.join("output"),
            chunk_size,
            ..Default::default()
        }
    }

    fn product(code: &str, name: &str, extra: &[(&'static str, &'static str)]) -> String {
        let mut values: Vec<(&str, &str)> = vec![
            ("code", code),
            ("product_name", name),
            ("energy-kcal_100g", "400"),
            ("proteins_100g", "8"),
            ("fat_100g", "12"),
            ("carbohydrates_100g", "55"),
        ];
        values.extend_from_slice(extra);
        row(&values)
    }

    fn read_all(files: &[PathBuf]) -> Vec<Value> {
        files
            .iter()
            .flat_map(|f| {
                fs::read_to_string(f)
                    .unwrap()
                    .lines()
                    .map(|l| serde_json::from_str::<Value>(l).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_worked_example() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), 75_000);
        let content = format!(
            "{}\n{}\n",
            full_header(),
            product("01234567", "Granola Bar", &[("brands", "Acme"), ("serving_size", "40g")])
        );
        fs::write(&opts.input_path, content).unwrap();

        let report = run(&opts).unwrap();

        assert_eq!(report.written, 1);
        assert_eq!(report.invalid_output, 0);
        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].ends_with("output/off_mf_0.jsonl"));

        let facts = read_all(&report.files);
        let fact = &facts[0];
        assert_eq!(fact["mainUPC"], "01234567");
        assert_eq!(fact["foodDesc"], "Granola Bar by Acme");
        assert_eq!(fact["208"], 400.0);
        assert_eq!(fact["203"], 8.0);
        assert_eq!(fact["204"], 12.0);
        assert_eq!(fact["205"], 55.0);
        assert_eq!(fact["291"], 0.0);
        assert_eq!(fact["boost"], 125);
        assert_eq!(fact["source"], "OFF");
        assert_eq!(fact["common"], false);
        assert_eq!(fact["weights"].as_array().unwrap().len(), 3);
        assert_eq!(fact["dfSrv"]["gmWgt"], "100.");
        assert!(fact.get("brands").is_none());
        assert!(fact.get("serving_size").is_none());
        assert!(fact.get("countries_tags").is_none());
    }

    #[test]
    fn test_only_loaded_nutrient_codes_emitted() {
        let content = format!("{}\n{}\n", full_header(), product("01234567", "Granola Bar", &[]));
        let facts = preview(Loader::from_reader(content.as_bytes()).unwrap(), 1).unwrap();
        let value = serde_json::to_value(&facts[0]).unwrap();

        let codes: Vec<&String> = value
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| k.chars().all(|c| c.is_ascii_digit()))
            .collect();
        assert_eq!(codes.len(), 35);
        assert!(value.get("406").is_none());
    }

    #[test]
    fn test_escape_only_fields_count_as_empty() {
        let content = format!(
            "{}\n{}\n",
            full_header(),
            product(
                "01234567",
                "Granola Bar",
                &[("brands", "\\N"), ("ingredients_text", "\\N"), ("image_small_url", "\\N")]
            )
        );
        let facts = preview(Loader::from_reader(content.as_bytes()).unwrap(), 1).unwrap();

        assert_eq!(facts[0].food_desc, "Granola Bar");
        assert_eq!(facts[0].boost, 25);
    }

    #[test]
    fn test_filters_and_chunking() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), 2);
        let lines = vec![
            full_header(),
            product("00000001", "A", &[]),
            product("1234567", "too short", &[]),
            product("00000002", "B", &[("image_small_url", "https://img/b.jpg")]),
            product("2001234567890", "in-store", &[]),
            row(&[("code", "00000009"), ("product_name", "no energy")]),
            product("00000003", "C", &[("brands", "Acme, Beta")]),
            product("12345678901234", "too long", &[]),
            product("00000004", "D", &[]),
            product("00000005", "E", &[]),
        ];
        fs::write(&opts.input_path, lines.join("\n") + "\n").unwrap();

        let report = run(&opts).unwrap();

        assert_eq!(report.rows_read, 9);
        assert_eq!(report.missing_required, 1);
        assert_eq!(report.invalid_identifier, 3);
        assert_eq!(report.written, 5);
        assert_eq!(report.files.len(), 3);

        let facts = read_all(&report.files);
        let upcs: Vec<&str> = facts.iter().map(|f| f["mainUPC"].as_str().unwrap()).collect();
        assert_eq!(upcs, vec!["00000001", "00000002", "00000003", "00000004", "00000005"]);
        assert_eq!(facts[1]["boost"], 50);
        assert_eq!(facts[2]["foodDesc"], "C");
        assert_eq!(facts[2]["boost"], 100);
    }

    #[test]
    fn test_escape_in_name_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), 10);
        let content = format!("{}\n{}\n", full_header(), product("00000004", "Oat\\N Bar", &[]));
        fs::write(&opts.input_path, content).unwrap();

        let report = run(&opts).unwrap();
        let facts = read_all(&report.files);
        assert_eq!(facts[0]["foodDesc"], "Oat Bar");
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), 2);
        let content = format!(
            "{}\n{}\n{}\n{}\n",
            full_header(),
            product("00000001", "A", &[("brands", "Acme")]),
            product("00000002", "B", &[]),
            product("00000003", "C", &[("ingredients_text", "oats")]),
        );
        fs::write(&opts.input_path, content).unwrap();

        let first = run(&opts).unwrap();
        let before: Vec<String> = first.files.iter().map(|f| fs::read_to_string(f).unwrap()).collect();
        let second = run(&opts).unwrap();
        let after: Vec<String> = second.files.iter().map(|f| fs::read_to_string(f).unwrap()).collect();

        assert_eq!(first.files, second.files);
        assert_eq!(before, after);
    }

    #[test]
    fn test_malformed_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), 10);
        let content = format!(
            "{}\n{}\n{}\n",
            full_header(),
            product("00000001", "A", &[]),
            product("00000002", "B", &[("sugars_100g", "plenty")]),
        );
        fs::write(&opts.input_path, content).unwrap();

        let result = run(&opts);
        assert!(matches!(result, Err(crate::error::PipelineError::Load(_))));
        // The first record was still buffered, so nothing was persisted
        assert!(!opts.output_dir.join("off_mf_0.jsonl").exists());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path(), 10);
        assert!(run(&opts).is_err());
    }

    #[test]
    fn test_transform_records_skips_dropped() {
        let rows = vec![
            SourceRecord {
                code: Some("01234567".into()),
                product_name: Some("Granola".into()),
                nutrients: vec![
                    ("energy-kcal_100g", Some(1.0)),
                    ("proteins_100g", Some(1.0)),
                    ("fat_100g", Some(1.0)),
                    ("carbohydrates_100g", Some(1.0)),
                ],
                ..Default::default()
            },
            SourceRecord::default(),
        ];
        let facts: Vec<_> = transform_records(rows).collect();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].boost, 25);
    }

    #[test]
    fn test_preview_stops_at_limit() {
        let content = format!(
            "{}\n{}\n{}\n{}\n",
            full_header(),
            product("1", "dropped", &[]),
            product("00000001", "A", &[]),
            product("00000002", "B", &[]),
        );
        let loader = Loader::from_reader(content.as_bytes()).unwrap();
        let facts = preview(loader, 1).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].main_upc, "00000001");
    }

    #[test]
    fn test_report_summary() {
        let report = PipelineReport {
            rows_read: 10,
            missing_required: 2,
            invalid_identifier: 3,
            written: 5,
            ..Default::default()
        };
        let summary = report.summary();
        assert!(summary.contains("10 rows"));
        assert!(summary.contains("5 written"));
    }
}
