use std::fmt;

use super::error::{FormatError, LookupError};

pub const MEASURED_DENSITY: &str = "Measured Density";
pub const OBSERVED_TEMPERATURE: &str = "Observed Temperature";
pub const CORRESPONDING_DENSITY: &str = "Corresponding Density";

/// Column names every dataset must carry (exact, case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 3] = [MEASURED_DENSITY, OBSERVED_TEMPERATURE, CORRESPONDING_DENSITY];

// ---------------------------------------------------------------------------
// CellValue – a single parsed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a finite `f64`. Text is accepted when it parses.
    pub fn as_finite_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }
}

// ---------------------------------------------------------------------------
// Table – parsed but not yet validated
// ---------------------------------------------------------------------------

/// Header names plus rows of cells, in source order.
///
/// Every row has exactly `columns.len()` cells; loaders pad missing cells
/// with [`CellValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Row / Query / MatchResult
// ---------------------------------------------------------------------------

/// One numeric row of the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub measured_density: f64,
    pub observed_temperature: f64,
    pub corresponding_density: f64,
}

impl Row {
    pub fn new(measured_density: f64, observed_temperature: f64, corresponding_density: f64) -> Self {
        Row {
            measured_density,
            observed_temperature,
            corresponding_density,
        }
    }
}

/// A (density, temperature) point to match against the dataset.
///
/// Both components are guaranteed finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    measured_density: f64,
    observed_temperature: f64,
}

impl Query {
    pub fn new(measured_density: f64, observed_temperature: f64) -> Result<Self, LookupError> {
        if !measured_density.is_finite() {
            return Err(LookupError::InvalidQuery {
                field: MEASURED_DENSITY,
                input: measured_density.to_string(),
            });
        }
        if !observed_temperature.is_finite() {
            return Err(LookupError::InvalidQuery {
                field: OBSERVED_TEMPERATURE,
                input: observed_temperature.to_string(),
            });
        }
        Ok(Query {
            measured_density,
            observed_temperature,
        })
    }

    /// Parse user-entered text for both fields. Surrounding whitespace is ignored.
    pub fn parse(measured_density: &str, observed_temperature: &str) -> Result<Self, LookupError> {
        let density = parse_field(MEASURED_DENSITY, measured_density)?;
        let temperature = parse_field(OBSERVED_TEMPERATURE, observed_temperature)?;
        Query::new(density, temperature)
    }

    pub fn measured_density(&self) -> f64 {
        self.measured_density
    }

    pub fn observed_temperature(&self) -> f64 {
        self.observed_temperature
    }
}

fn parse_field(field: &'static str, input: &str) -> Result<f64, LookupError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LookupError::InvalidQuery {
            field,
            input: input.to_string(),
        })
}

/// The nearest row's corresponding density and its distance from the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Position of the matched row in dataset order.
    pub row_index: usize,
    pub corresponding_density: f64,
    pub distance: f64,
}

// ---------------------------------------------------------------------------
// Dataset – the validated, immutable table
// ---------------------------------------------------------------------------

/// A validated dataset. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
    /// All source column names, required ones included, in source order.
    columns: Vec<String>,
    /// Display cells for every source column, one `Vec` per row.
    cells: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Validate a parsed table and convert the required columns to numbers.
    pub fn from_table(table: Table) -> Result<Self, LookupError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| table.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LookupError::Schema {
                missing,
                found: table.columns,
            });
        }

        // Presence was checked above.
        let idx = REQUIRED_COLUMNS.map(|name| table.column_index(name).unwrap_or_default());

        let mut rows = Vec::with_capacity(table.rows.len());
        for (row_no, cells) in table.rows.iter().enumerate() {
            let mut values = [0.0; 3];
            for (slot, (&col_idx, name)) in values.iter_mut().zip(idx.iter().zip(REQUIRED_COLUMNS)) {
                let cell = cells.get(col_idx).unwrap_or(&CellValue::Null);
                *slot = cell.as_finite_f64().ok_or_else(|| FormatError::NonNumericCell {
                    row: row_no,
                    column: name.to_string(),
                    value: cell.to_string(),
                })?;
            }
            rows.push(Row::new(values[0], values[1], values[2]));
        }

        Ok(Dataset {
            rows,
            columns: table.columns,
            cells: table.rows,
        })
    }

    /// Build a dataset directly from numeric rows (three required columns only).
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let cells = rows
            .iter()
            .map(|r| {
                vec![
                    CellValue::Float(r.measured_density),
                    CellValue::Float(r.observed_temperature),
                    CellValue::Float(r.corresponding_density),
                ]
            })
            .collect();
        Dataset {
            rows,
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            cells,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Display cells of row `index`, aligned with [`Dataset::columns`].
    pub fn cells(&self, index: usize) -> Option<&[CellValue]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Min and max corresponding density, `None` when empty.
    pub fn corresponding_density_range(&self) -> Option<(f64, f64)> {
        self.rows.iter().map(|r| r.corresponding_density).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
