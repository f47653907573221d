use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use density_lookup::data::sample::{self, DEFAULT_ROWS, DEFAULT_SEED};

/// Write a synthetic density/temperature table.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Output file; `.xlsx` writes a workbook, `.parquet`/`.pq` Parquet,
    /// anything else CSV.
    #[arg(default_value = "sample_data.xlsx")]
    output: PathBuf,

    /// Number of rows.
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = sample::generate(args.seed, args.rows);
    sample::write_file(&rows, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("Created {} rows of sample data in {}", rows.len(), args.output.display());
    println!();
    println!("First 5 rows:");
    println!("Measured Density  Observed Temperature  Corresponding Density");
    for r in rows.iter().take(5) {
        println!(
            "{:>16.4}  {:>20.4}  {:>21.4}",
            r.measured_density, r.observed_temperature, r.corresponding_density
        );
    }
    Ok(())
}
