use std::io::{Cursor, Read};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use calamine::{Data as ExcelCell, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{FormatError, LookupError};
use super::model::{CellValue, Dataset, Table};

// ---------------------------------------------------------------------------
// Source formats
// ---------------------------------------------------------------------------

/// Tabular formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Header row followed by data rows.
    Csv,
    /// Records-oriented array: `[{ "Measured Density": 1.0, ... }, ...]`.
    Json,
    /// Flat scalar columns.
    Parquet,
    /// First worksheet of an Excel workbook, header in the first row.
    Excel,
}

impl SourceFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "parquet" | "pq" => Ok(SourceFormat::Parquet),
            "xlsx" | "xls" => Ok(SourceFormat::Excel),
            other => Err(FormatError::UnsupportedExtension(other.to_string())),
        }
    }

    /// File-dialog extensions for every supported format.
    pub const EXTENSIONS: [&'static str; 6] = ["csv", "json", "parquet", "pq", "xlsx", "xls"];
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and validate a dataset from a file. Dispatch by extension.
///
/// The reported file size is checked against `max_bytes` first; the read
/// itself is capped as well, since pipes and growing files report a length
/// that says nothing about what they will yield.
pub fn load_file(path: &Path, max_bytes: u64) -> Result<Dataset, LookupError> {
    let format = SourceFormat::from_path(path)?;

    let file = std::fs::File::open(path).map_err(FormatError::Io)?;
    let meta = file.metadata().map_err(FormatError::Io)?;
    if meta.is_file() {
        check_size(meta.len(), max_bytes)?;
    }

    let bytes = read_bounded(file, max_bytes)?;
    load_bytes(&bytes, format, max_bytes)
}

/// Read at most `max_bytes` from `reader`.
///
/// One byte past the limit is requested so an oversized source is detected
/// without draining it.
pub fn read_bounded<R: Read>(reader: R, max_bytes: u64) -> Result<Vec<u8>, LookupError> {
    let mut buf = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(FormatError::Io)?;
    let size = buf.len() as u64;
    if size > max_bytes {
        return Err(LookupError::SourceTooLarge { size, limit: max_bytes });
    }
    Ok(buf)
}

/// Load and validate a dataset from an in-memory buffer (e.g. an upload).
pub fn load_bytes(bytes: &[u8], format: SourceFormat, max_bytes: u64) -> Result<Dataset, LookupError> {
    check_size(bytes.len() as u64, max_bytes)?;
    let table = parse_table(bytes, format)?;
    log::debug!(
        "parsed {:?} table: {} rows, columns {:?}",
        format,
        table.rows.len(),
        table.columns
    );
    Dataset::from_table(table)
}

/// Parse a buffer into an unvalidated [`Table`].
pub fn parse_table(bytes: &[u8], format: SourceFormat) -> Result<Table, FormatError> {
    match format {
        SourceFormat::Csv => parse_csv(bytes),
        SourceFormat::Json => parse_json(bytes),
        SourceFormat::Parquet => parse_parquet(bytes),
        SourceFormat::Excel => parse_excel(bytes),
    }
}

fn check_size(size: u64, limit: u64) -> Result<(), LookupError> {
    if size > limit {
        return Err(LookupError::SourceTooLarge { size, limit });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row with column names, then one record per row.
/// Ragged records are rejected by the reader.
fn parse_csv(bytes: &[u8]) -> Result<Table, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Table { columns, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default of `df.to_json(orient='records')`.
/// Columns are collected in order of first appearance; a key missing from a
/// record becomes a null cell.
fn parse_json(bytes: &[u8]) -> Result<Table, FormatError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;

    let records = root
        .as_array()
        .ok_or_else(|| FormatError::Malformed("expected a top-level JSON array".into()))?;

    let mut objects = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| FormatError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(Table { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Parquet with one scalar column per table column.
///
/// Works with files written by **Pandas** (`df.to_parquet()`), **Polars**
/// (`df.write_parquet()`) and the bundled sample generator.
fn parse_parquet(bytes: &[u8]) -> Result<Table, FormatError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        if batch.num_columns() != columns.len() {
            return Err(FormatError::Malformed(format!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                columns.len()
            )));
        }
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(Table { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
/// Types without a dedicated variant fall back to Arrow's display text.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let typed = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    typed
        .or_else(|| array_value_to_string(col, row).ok().map(CellValue::Text))
        .unwrap_or(CellValue::Null)
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

/// First worksheet of an `.xlsx`/`.xls` workbook; row 0 holds the column
/// names. The workbook kind is detected from the content, not the extension.
fn parse_excel(bytes: &[u8]) -> Result<Table, FormatError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FormatError::Malformed("workbook has no worksheets".into()))??;

    let mut records = range.rows();
    let columns: Vec<String> = match records.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };

    let rows = records
        .map(|record| {
            let mut cells: Vec<CellValue> = record.iter().map(excel_to_cell).collect();
            cells.resize(columns.len(), CellValue::Null);
            cells
        })
        .collect();

    Ok(Table { columns, rows })
}

fn excel_to_cell(cell: &ExcelCell) -> CellValue {
    match cell {
        ExcelCell::Int(i) => CellValue::Integer(*i),
        ExcelCell::Float(f) => CellValue::Float(*f),
        ExcelCell::String(s) => CellValue::Text(s.clone()),
        ExcelCell::Bool(b) => CellValue::Bool(*b),
        ExcelCell::Empty => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{Row, CORRESPONDING_DENSITY};
    use crate::data::sample;

    const CSV: &str = "\
Measured Density,Observed Temperature,Corresponding Density,Batch
0.9,18,1.00,A
1.1,28.0,1.05,B
";

    #[test]
    fn csv_with_extra_column_loads() {
        let ds = load_bytes(CSV.as_bytes(), SourceFormat::Csv, 1024).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0], Row::new(0.9, 18.0, 1.0));
        assert_eq!(ds.columns().len(), 4);
        assert_eq!(ds.cells(1).unwrap()[3], CellValue::Text("B".into()));
    }

    #[test]
    fn csv_ragged_row_is_a_format_error() {
        let src = "Measured Density,Observed Temperature,Corresponding Density\n1.0,20.0\n";
        let err = load_bytes(src.as_bytes(), SourceFormat::Csv, 1024).unwrap_err();
        assert!(matches!(err, LookupError::Format(FormatError::Csv(_))), "{err:?}");
    }

    #[test]
    fn csv_missing_column_is_a_schema_error() {
        let src = "Measured Density,Observed Temperature\n1.0,20.0\n";
        let err = load_bytes(src.as_bytes(), SourceFormat::Csv, 1024).unwrap_err();
        match err {
            LookupError::Schema { missing, .. } => assert_eq!(missing, vec![CORRESPONDING_DENSITY]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_records_load() {
        let src = r#"[
            {"Measured Density": 0.9, "Observed Temperature": 18, "Corresponding Density": 1.0},
            {"Measured Density": 1.1, "Observed Temperature": 28.0, "Corresponding Density": 1.05, "Note": "x"}
        ]"#;
        let ds = load_bytes(src.as_bytes(), SourceFormat::Json, 1024).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1], Row::new(1.1, 28.0, 1.05));
        let note = ds.columns().iter().position(|c| c == "Note").unwrap();
        assert_eq!(ds.cells(0).unwrap()[note], CellValue::Null);
    }

    #[test]
    fn json_that_is_not_an_array_is_rejected() {
        let err = load_bytes(br#"{"a": 1}"#, SourceFormat::Json, 1024).unwrap_err();
        assert!(matches!(err, LookupError::Format(FormatError::Malformed(_))));
    }

    #[test]
    fn corrupt_json_is_a_format_error() {
        let err = load_bytes(b"[{", SourceFormat::Json, 1024).unwrap_err();
        assert!(matches!(err, LookupError::Format(FormatError::Json(_))));
    }

    #[test]
    fn parquet_scalar_columns_load() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Measured Density", DataType::Float64, false),
            Field::new("Observed Temperature", DataType::Int64, false),
            Field::new("Corresponding Density", DataType::Float64, false),
            Field::new("Operator", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.9, 1.1])),
                Arc::new(Int64Array::from(vec![18, 28])),
                Arc::new(Float64Array::from(vec![1.0, 1.05])),
                Arc::new(StringArray::from(vec!["Alice", "Bob"])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_bytes(&buf, SourceFormat::Parquet, buf.len() as u64).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1], Row::new(1.1, 28.0, 1.05));
        assert_eq!(ds.cells(0).unwrap()[3], CellValue::Text("Alice".into()));
    }

    #[test]
    fn garbage_parquet_is_a_format_error() {
        let err = load_bytes(b"not parquet at all", SourceFormat::Parquet, 1024).unwrap_err();
        assert!(matches!(err, LookupError::Format(FormatError::Parquet(_))));
    }

    #[test]
    fn oversized_buffer_is_rejected_before_parsing() {
        let err = load_bytes(CSV.as_bytes(), SourceFormat::Csv, 10).unwrap_err();
        assert!(matches!(err, LookupError::SourceTooLarge { limit: 10, .. }));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a/b.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("x.pq")).unwrap(), SourceFormat::Parquet);
        assert_eq!(SourceFormat::from_path(Path::new("sheet.xlsx")).unwrap(), SourceFormat::Excel);
        assert_eq!(SourceFormat::from_path(Path::new("OLD.XLS")).unwrap(), SourceFormat::Excel);
        assert!(matches!(
            SourceFormat::from_path(Path::new("notes.txt")),
            Err(FormatError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn xlsx_workbook_loads() {
        let rows = vec![Row::new(0.9, 18.0, 1.0), Row::new(1.1, 28.0, 1.05)];
        let mut buf = Vec::new();
        sample::write_xlsx(&rows, &mut buf).unwrap();

        let ds = load_bytes(&buf, SourceFormat::Excel, buf.len() as u64).unwrap();
        assert_eq!(ds.columns(), &["Measured Density", "Observed Temperature", "Corresponding Density"]);
        assert_eq!(ds.rows(), rows.as_slice());
    }

    #[test]
    fn xlsx_with_text_and_blank_cells() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Measured Density", "Observed Temperature", "Corresponding Density", "Operator"]
            .into_iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_string(1, 1, "20").unwrap();
        sheet.write_number(1, 2, 0.95).unwrap();
        sheet.write_number(2, 0, 1.1).unwrap();
        sheet.write_number(2, 1, 25.0).unwrap();
        sheet.write_number(2, 2, 1.0).unwrap();
        sheet.write_string(2, 3, "Bob").unwrap();
        let buf = workbook.save_to_buffer().unwrap();

        let ds = load_bytes(&buf, SourceFormat::Excel, buf.len() as u64).unwrap();
        assert_eq!(ds.rows()[0], Row::new(1.0, 20.0, 0.95));
        assert_eq!(ds.cells(0).unwrap()[3], CellValue::Null);
        assert_eq!(ds.cells(1).unwrap()[3], CellValue::Text("Bob".into()));
    }

    #[test]
    fn xlsx_missing_column_is_a_schema_error() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Measured Density").unwrap();
        sheet.write_string(0, 1, "Observed Temperature").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(1, 1, 20.0).unwrap();
        let buf = workbook.save_to_buffer().unwrap();

        let err = load_bytes(&buf, SourceFormat::Excel, buf.len() as u64).unwrap_err();
        match err {
            LookupError::Schema { missing, .. } => assert_eq!(missing, vec![CORRESPONDING_DENSITY]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_workbook_is_an_excel_error() {
        let err = load_bytes(b"not a workbook", SourceFormat::Excel, 1024).unwrap_err();
        assert!(matches!(err, LookupError::Format(FormatError::Excel(_))), "{err:?}");
    }

    #[test]
    fn bounded_read_stops_at_the_limit() {
        // An endless source: an unbounded read would never return.
        let err = read_bounded(std::io::repeat(b'x'), 64).unwrap_err();
        assert!(matches!(err, LookupError::SourceTooLarge { size: 65, limit: 64 }), "{err:?}");

        assert_eq!(read_bounded(&b"abc"[..], 3).unwrap(), b"abc");
    }

    #[cfg(unix)]
    #[test]
    fn fifo_larger_than_limit_is_rejected() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.csv");
        let status = std::process::Command::new("mkfifo").arg(&path).status().unwrap();
        assert!(status.success());

        let writer_path = path.clone();
        let writer = std::thread::spawn(move || {
            let mut pipe = std::fs::OpenOptions::new().write(true).open(writer_path).unwrap();
            let chunk = vec![b'1'; 64 * 1024];
            let mut written = 0usize;
            // The reader hangs up once it has seen enough.
            while written < 8 * 1024 * 1024 {
                if pipe.write_all(&chunk).is_err() {
                    break;
                }
                written += chunk.len();
            }
            written
        });

        let err = load_file(&path, 64).unwrap_err();
        assert!(matches!(err, LookupError::SourceTooLarge { size: 65, limit: 64 }), "{err:?}");
        assert!(writer.join().unwrap() < 8 * 1024 * 1024);
    }
}
