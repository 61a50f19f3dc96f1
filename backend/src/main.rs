//! off-to-mf CLI - Convert Open Food Facts exports to nutrition-fact JSONL
//!
//! ```bash
//! off-to-mf convert                        # data/en.openfoodfacts.org.products.csv -> output/
//! off-to-mf preview --limit 5              # Print the first records, write nothing
//! off-to-mf validate output/off_mf_0.jsonl # Check files against the importer schema
//! ```

use clap::{Parser, Subcommand};
use off_to_mf::logs::{init_logging, log_error, log_info, log_success};
use off_to_mf::{config::default_input_path, preview, run, validate_jsonl_file, Loader, PipelineOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "off-to-mf")]
#[command(about = "Convert Open Food Facts exports to nutrition-fact JSONL", long_about = None)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full conversion and write chunk files
    Convert {
        /// Input TSV export (default: data/en.openfoodfacts.org.products.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: output)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip the schema check of each record
        #[arg(long)]
        no_validate: bool,
    },

    /// Print the first converted records as JSONL, without writing files
    Preview {
        /// Input TSV export
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of records to print
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Validate JSONL output files against the importer schema
    Validate {
        /// JSONL files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input,
            output_dir,
            no_validate,
        } => cmd_convert(input, output_dir, no_validate),

        Commands::Preview { input, limit } => cmd_preview(input, limit),

        Commands::Validate { files } => cmd_validate(&files),
    };

    if let Err(e) = result {
        log_error(format!("❌ Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = PipelineOptions::default();
    let options = PipelineOptions {
        input_path: input.unwrap_or(defaults.input_path),
        output_dir: output_dir.unwrap_or(defaults.output_dir),
        skip_validation: no_validate,
        ..PipelineOptions::default()
    };

    let report = run(&options)?;

    if report.invalid_output > 0 {
        return Err(format!("{} records failed schema validation", report.invalid_output).into());
    }

    log_success("✨ Done!");
    Ok(())
}

fn cmd_preview(input: Option<PathBuf>, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let input = input.unwrap_or_else(default_input_path);
    log_info(format!("📄 Previewing {}", input.display()));

    let facts = preview(Loader::open(&input)?, limit)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for fact in &facts {
        writeln!(out, "{}", fact.to_json_line()?)?;
    }

    log_success(format!("{} records", facts.len()));
    Ok(())
}

fn cmd_validate(files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let mut invalid_total = 0;

    for path in files {
        invalid_total += validate_file(path)?;
    }

    if invalid_total > 0 {
        return Err(format!("{} invalid records", invalid_total).into());
    }

    log_success("All records valid!");
    Ok(())
}

fn validate_file(path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    log_info(format!("✔️  Validating: {}", path.display()));

    let result = validate_jsonl_file(path)?;

    for invalid in result.invalid.iter().take(5) {
        let upc = invalid.main_upc.as_deref().unwrap_or("?");
        log_error(format!("Line {} ({}):", invalid.line, upc));
        for err in invalid.errors.iter().take(3) {
            log_error(format!("   - {}", err));
        }
    }

    log_info(format!("📊 {} valid, {} invalid", result.valid, result.invalid.len()));
    Ok(result.invalid.len())
}
