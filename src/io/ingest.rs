//! CSV ingest and validation.
//!
//! Two loaders with different strictness:
//!
//! - `load_table` reads the training table and the ideal catalog. Those tables
//!   must be complete (every cell a finite number) because the selector relies
//!   on row alignment; any bad cell is a schema error.
//! - `load_observations` reads the test table. Bad rows are kept as
//!   observations with missing values plus a `RowError`, so the mapper can
//!   emit an unassigned record for them and carry on.
//!
//! Column names are resolved once here; nothing downstream looks columns up by
//! string except for reporting.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{info, warn};

use crate::domain::{Observation, ObservationTable, RowError, Series, Table};
use crate::error::AppError;

/// Load a complete numeric table with an `x` column and one or more value columns.
pub fn load_table(path: &Path, name: &str) -> Result<Table, AppError> {
    let file = open_input(path)?;
    let table = read_table(file, name).map_err(|e| e.context(format!("'{}'", path.display())))?;
    info!(
        "Loaded {name} table from '{}': {} rows, {} value columns.",
        path.display(),
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

/// Read a complete numeric table from any CSV source.
pub fn read_table<R: Read>(source: R, name: &str) -> Result<Table, AppError> {
    let mut reader = csv_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers)?;

    let x_idx = require_column(&header_map, "x")?;
    let value_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != x_idx)
        .map(|(idx, h)| (idx, normalize_header_name(h)))
        .collect();
    if value_cols.is_empty() {
        return Err(AppError::schema(
            "Expected at least one value column besides `x`.",
        ));
    }

    let mut x = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); value_cols.len()];

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        let record = result.map_err(|e| AppError::schema(format!("Line {line}: CSV parse error: {e}")))?;

        x.push(parse_cell(&record, x_idx, "x").map_err(|m| AppError::schema(format!("Line {line}: {m}")))?);
        for (slot, (col_idx, col_name)) in values.iter_mut().zip(&value_cols) {
            let v = parse_cell(&record, *col_idx, col_name)
                .map_err(|m| AppError::schema(format!("Line {line}: {m}")))?;
            slot.push(v);
        }
    }

    if x.is_empty() {
        return Err(AppError::empty_input(format!("Table `{name}` has no data rows.")));
    }

    let columns = value_cols
        .into_iter()
        .zip(values)
        .map(|((_, col_name), vals)| Series::new(col_name, vals))
        .collect();

    Table::new(name, x, columns)
}

/// Load test observations (`x`, `y`), keeping malformed rows as missing values.
pub fn load_observations(path: &Path) -> Result<ObservationTable, AppError> {
    let file = open_input(path)?;
    let table = read_observations(file).map_err(|e| e.context(format!("'{}'", path.display())))?;
    info!(
        "Loaded {} test rows from '{}' ({} with problems).",
        table.points.len(),
        path.display(),
        table.row_errors.len()
    );
    for e in table.row_errors.iter().take(10) {
        warn!("Test row at line {}: {}", e.line, e.message);
    }
    if table.row_errors.len() > 10 {
        warn!("... and {} more row problems.", table.row_errors.len() - 10);
    }
    Ok(table)
}

/// Read test observations from any CSV source.
pub fn read_observations<R: Read>(source: R) -> Result<ObservationTable, AppError> {
    let mut reader = csv_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::schema(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers)?;
    let x_idx = require_column(&header_map, "x")?;
    let y_idx = require_column(&header_map, "y")?;

    let mut out = ObservationTable::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.points.push(Observation { line, x: None, y: None });
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let x = parse_cell(&record, x_idx, "x");
        let y = parse_cell(&record, y_idx, "y");
        for msg in [&x, &y].into_iter().filter_map(|r| r.as_ref().err()) {
            out.row_errors.push(RowError {
                line,
                message: msg.clone(),
            });
        }
        out.points.push(Observation {
            line,
            x: x.ok(),
            y: y.ok(),
        });
    }

    Ok(out)
}

fn open_input(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::file_not_found(format!("Input file not found: '{}'", path.display()))
        } else {
            AppError::io(format!("Failed to open '{}': {e}", path.display()))
        }
    })
}

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

fn build_header_map(headers: &StringRecord) -> Result<HashMap<String, usize>, AppError> {
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let key = normalize_header_name(name);
        if key.is_empty() {
            return Err(AppError::schema(format!("Column {} has an empty header.", idx + 1)));
        }
        if map.insert(key.clone(), idx).is_some() {
            return Err(AppError::schema(format!("Duplicate column: `{key}`")));
        }
    }
    Ok(map)
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report a missing `x` column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::schema(format!("Missing required column: `{name}`")))
}

fn parse_cell(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value for `{name}`."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}' for `{name}`."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{raw}' for `{name}`."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn reads_table_with_bom_and_mixed_case_headers() {
        let csv = "\u{feff}X, Y1 ,y2\n0,1,2\n1,3,4\n";
        let table = read_table(csv.as_bytes(), "training").unwrap();

        assert_eq!(table.x, vec![0.0, 1.0]);
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.columns[0].name, "y1");
        assert_eq!(table.columns[1].values, vec![2.0, 4.0]);
    }

    #[test]
    fn x_need_not_be_first_column() {
        let table = read_table("y1,x\n5,0\n6,1\n".as_bytes(), "ideal").unwrap();
        assert_eq!(table.x, vec![0.0, 1.0]);
        assert_eq!(table.column("y1").unwrap().values, vec![5.0, 6.0]);
    }

    #[test]
    fn missing_x_is_schema_error() {
        let err = read_table("a,b\n1,2\n".as_bytes(), "ideal").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.message().contains("`x`"));
    }

    #[test]
    fn x_only_is_schema_error() {
        let err = read_table("x\n1\n2\n".as_bytes(), "ideal").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn duplicate_header_is_schema_error() {
        let err = read_table("x,y1,Y1\n1,2,3\n".as_bytes(), "ideal").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn bad_cell_names_line_and_column() {
        let err = read_table("x,y1\n0,1\n1,abc\n".as_bytes(), "training").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.message().contains("Line 3"));
        assert!(err.message().contains("`y1`"));
    }

    #[test]
    fn header_only_is_empty_input() {
        let err = read_table("x,y1\n".as_bytes(), "training").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load_table(Path::new("/definitely/not/here.csv"), "training").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn observations_keep_bad_rows() {
        let csv = "x,y\n1,2\nfoo,3\n4,\n5,6\n";
        let table = read_observations(csv.as_bytes()).unwrap();

        assert_eq!(table.points.len(), 4);
        assert_eq!(table.points[0], Observation::new(2, 1.0, 2.0));
        assert_eq!(table.points[1].x, None);
        assert_eq!(table.points[1].y, Some(3.0));
        assert_eq!(table.points[2].y, None);
        assert_eq!(table.points[3].line, 5);

        let lines: Vec<usize> = table.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn observations_require_y() {
        let err = read_observations("x,z\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn observations_may_be_empty() {
        let table = read_observations("x,y\n".as_bytes()).unwrap();
        assert!(table.points.is_empty());
    }
}
