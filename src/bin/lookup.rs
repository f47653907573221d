use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use density_lookup::config;
use density_lookup::data::{self, Query};

/// Find the corresponding density for a measured density and observed
/// temperature in a CSV, JSON or Parquet table.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Table with "Measured Density", "Observed Temperature" and
    /// "Corresponding Density" columns.
    file: PathBuf,

    /// Measured density to look up.
    #[arg(allow_hyphen_values = true)]
    density: String,

    /// Observed temperature to look up.
    #[arg(allow_hyphen_values = true)]
    temperature: String,
}

fn run(args: &Args) -> Result<bool> {
    let cfg = config::load_or_default().context("loading configuration")?;

    // Reject bad input before touching the file.
    let query = Query::parse(&args.density, &args.temperature)?;

    let dataset = data::load_file(&args.file, cfg.max_source_bytes)
        .with_context(|| format!("loading {}", args.file.display()))?;
    log::info!("loaded {} rows from {}", dataset.len(), args.file.display());

    match dataset.nearest(&query) {
        Some(m) => {
            println!(
                "Corresponding Density: {:.4} (Distance: {:.4})",
                m.corresponding_density, m.distance
            );
            Ok(true)
        }
        None => {
            println!("No matching data found for the given inputs");
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
