//! Synthetic fixture data in the layout the loader accepts.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rust_xlsxwriter::Workbook;

use super::error::FormatError;
use super::loader::SourceFormat;
use super::model::{Row, CORRESPONDING_DENSITY, MEASURED_DENSITY, OBSERVED_TEMPERATURE, REQUIRED_COLUMNS};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ROWS: usize = 50;

const NOISE_STD_DEV: f64 = 0.02;

fn round4(v: f64) -> f64 {
    (v * 1e4).round() / 1e4
}

/// Generate `n` rows deterministically from `seed`.
///
/// Densities are drawn from `[0.8, 1.2)`, temperatures from `[15, 35)`, and
/// the corresponding density follows
/// `0.9·md + 0.1·(1 − (ot − 20)/20)` plus N(0, 0.02) noise.
/// All values are rounded to 4 decimal places.
pub fn generate(seed: u64, n: usize) -> Vec<Row> {
    let mut rng = StdRng::seed_from_u64(seed);

    let densities: Vec<f64> = (0..n).map(|_| rng.random_range(0.8..1.2)).collect();
    let temperatures: Vec<f64> = (0..n).map(|_| rng.random_range(15.0..35.0)).collect();

    densities
        .into_iter()
        .zip(temperatures)
        .map(|(md, ot)| {
            let z: f64 = rng.sample(StandardNormal);
            let cd = 0.9 * md + 0.1 * (1.0 - (ot - 20.0) / 20.0) + NOISE_STD_DEV * z;
            Row::new(round4(md), round4(ot), round4(cd))
        })
        .collect()
}

/// Write rows as CSV with the required header.
pub fn write_csv<W: Write>(rows: &[Row], out: W) -> Result<(), FormatError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(REQUIRED_COLUMNS)?;
    for r in rows {
        writer.write_record([
            r.measured_density.to_string(),
            r.observed_temperature.to_string(),
            r.corresponding_density.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as a single-batch Parquet file with three `Float64` columns.
pub fn write_parquet<W: Write + Send>(rows: &[Row], out: W) -> Result<(), FormatError> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(MEASURED_DENSITY, DataType::Float64, false),
        Field::new(OBSERVED_TEMPERATURE, DataType::Float64, false),
        Field::new(CORRESPONDING_DENSITY, DataType::Float64, false),
    ]));

    let column = |f: fn(&Row) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(rows.iter().map(f)))
    };
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            column(|r| r.measured_density),
            column(|r| r.observed_temperature),
            column(|r| r.corresponding_density),
        ],
    )?;

    let mut writer = ArrowWriter::try_new(out, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Write rows as a single-sheet `.xlsx` workbook, header in the first row.
pub fn write_xlsx<W: Write>(rows: &[Row], mut out: W) -> Result<(), FormatError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in (0u16..).zip(REQUIRED_COLUMNS) {
        sheet.write_string(0, col, name)?;
    }
    for (row, r) in (1u32..).zip(rows) {
        sheet.write_number(row, 0, r.measured_density)?;
        sheet.write_number(row, 1, r.observed_temperature)?;
        sheet.write_number(row, 2, r.corresponding_density)?;
    }
    out.write_all(&workbook.save_to_buffer()?)?;
    Ok(())
}

/// Write rows to `path`: Parquet for `.parquet`/`.pq`, a workbook for
/// `.xlsx`, CSV otherwise.
pub fn write_file(rows: &[Row], path: &Path) -> Result<(), FormatError> {
    let format = SourceFormat::from_path(path).ok();
    let file = std::fs::File::create(path)?;
    match format {
        Some(SourceFormat::Parquet) => write_parquet(rows, file),
        Some(SourceFormat::Excel) => write_xlsx(rows, std::io::BufWriter::new(file)),
        _ => write_csv(rows, std::io::BufWriter::new(file)),
    }
}
