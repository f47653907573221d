use std::io::Write;

use density_lookup::data::model::{CORRESPONDING_DENSITY, REQUIRED_COLUMNS};
use density_lookup::data::sample::{self, DEFAULT_ROWS, DEFAULT_SEED};
use density_lookup::data::{self, find_nearest, Dataset, LookupError, Query, Row};

const LIMIT: u64 = 10 * 1024 * 1024;

fn query(d: f64, t: f64) -> Query {
    Query::new(d, t).expect("finite query")
}

#[test]
fn generated_csv_round_trips_through_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample_data.csv");
    let rows = sample::generate(DEFAULT_SEED, DEFAULT_ROWS);
    sample::write_file(&rows, &path).unwrap();

    let ds = data::load_file(&path, LIMIT).expect("sample data validates");
    assert_eq!(ds.len(), 50);
    for name in REQUIRED_COLUMNS {
        assert!(ds.columns().iter().any(|c| c == name), "missing {name}");
    }
    assert_eq!(ds.rows(), rows.as_slice());
}

#[test]
fn generated_parquet_round_trips_through_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample_data.parquet");
    let rows = sample::generate(DEFAULT_SEED, DEFAULT_ROWS);
    sample::write_file(&rows, &path).unwrap();

    let ds = data::load_file(&path, LIMIT).unwrap();
    assert_eq!(ds.len(), DEFAULT_ROWS);
    assert_eq!(ds.rows(), rows.as_slice());
}

#[test]
fn generated_xlsx_round_trips_through_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample_data.xlsx");
    let rows = sample::generate(DEFAULT_SEED, DEFAULT_ROWS);
    sample::write_file(&rows, &path).unwrap();

    let ds = data::load_file(&path, LIMIT).unwrap();
    assert_eq!(ds.len(), DEFAULT_ROWS);
    assert_eq!(ds.rows(), rows.as_slice());

    let m = ds.nearest(&query(1.0, 25.0)).unwrap();
    assert_eq!(m.corresponding_density, rows[m.row_index].corresponding_density);
}

#[test]
fn two_row_example() {
    let ds = Dataset::from_rows(vec![Row::new(0.9, 18.0, 1.00), Row::new(1.1, 28.0, 1.05)]);
    let q = query(1.0, 20.0);

    let d0 = ((0.9f64 - 1.0).powi(2) + (18.0f64 - 20.0).powi(2)).sqrt();
    let d1 = ((1.1f64 - 1.0).powi(2) + (28.0f64 - 20.0).powi(2)).sqrt();
    let (expected_row, expected_dist) = if d1 < d0 { (1, d1) } else { (0, d0) };

    let m = find_nearest(Some(&ds), &q).unwrap();
    assert_eq!(m.row_index, expected_row);
    assert_eq!(m.corresponding_density, ds.rows()[expected_row].corresponding_density);
    assert!((m.distance - expected_dist).abs() < 1e-9);
}

#[test]
fn missing_corresponding_density_never_reaches_the_finder() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "Measured Density,Observed Temperature\n1.0,20.0").unwrap();

    match data::load_file(file.path(), LIMIT) {
        Err(LookupError::Schema { missing, .. }) => {
            assert_eq!(missing, vec![CORRESPONDING_DENSITY.to_string()])
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn header_only_file_is_valid_but_never_matches() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", REQUIRED_COLUMNS.join(",")).unwrap();

    let ds = data::load_file(file.path(), LIMIT).unwrap();
    assert!(ds.is_empty());
    assert_eq!(ds.nearest(&query(1.0, 20.0)), None);
}

#[test]
fn file_over_the_limit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.csv");
    sample::write_file(&sample::generate(1, 200), &path).unwrap();

    let err = data::load_file(&path, 64).unwrap_err();
    assert!(matches!(err, LookupError::SourceTooLarge { limit: 64, .. }));
}

#[test]
fn missing_file_is_a_format_error() {
    let err = data::load_file(std::path::Path::new("/nonexistent/table.csv"), LIMIT).unwrap_err();
    assert!(matches!(err, LookupError::Format(_)));
}

#[test]
fn nearest_over_generated_data_is_a_true_minimum() {
    let ds = Dataset::from_rows(sample::generate(DEFAULT_SEED, DEFAULT_ROWS));
    for (d, t) in [(0.8, 15.0), (1.0, 25.0), (1.2, 35.0), (0.95, 100.0)] {
        let q = query(d, t);
        let m = ds.nearest(&q).unwrap();
        let min = ds
            .rows()
            .iter()
            .map(|r| data::lookup::distance(r, &q))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(m.distance, min);
        assert_eq!(m.corresponding_density, ds.rows()[m.row_index].corresponding_density);
    }
}
