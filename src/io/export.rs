//! CSV exports: mapped test points and plain numeric tables.
//!
//! The assignment export is meant to be easy to consume in spreadsheets or
//! downstream scripts: `x,y,chosen_function,deviation`, one row per test row,
//! in input order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::domain::{Assignment, Table};
use crate::error::AppError;

/// Column header of the assignment export.
pub const ASSIGNMENT_HEADER: [&str; 4] = ["x", "y", "chosen_function", "deviation"];

/// Write assignments to a CSV file.
pub fn write_assignments_csv(path: &Path, assignments: &[Assignment]) -> Result<(), AppError> {
    let file = create_output(path)?;
    write_assignments(file, assignments)?;
    info!("Wrote {} assignments to '{}'.", assignments.len(), path.display());
    Ok(())
}

/// Write assignments as CSV to any sink.
///
/// An absent function is an empty cell; non-finite numbers are written as
/// `NaN` / `inf`.
pub fn write_assignments<W: Write>(sink: W, assignments: &[Assignment]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(ASSIGNMENT_HEADER)
        .map_err(|e| AppError::io(format!("Failed to write assignment CSV header: {e}")))?;

    for a in assignments {
        writer
            .write_record([
                a.x.to_string(),
                a.y.to_string(),
                a.chosen_function.clone().unwrap_or_default(),
                a.deviation.to_string(),
            ])
            .map_err(|e| AppError::io(format!("Failed to write assignment CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush assignment CSV: {e}")))
}

/// Write a table (`x` followed by its value columns) to a CSV file.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = create_output(path)?;
    write_table(file, table)?;
    info!(
        "Wrote {} table ({} rows) to '{}'.",
        table.name,
        table.n_rows(),
        path.display()
    );
    Ok(())
}

/// Write a table as CSV to any sink.
pub fn write_table<W: Write>(sink: W, table: &Table) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);

    let header = std::iter::once("x").chain(table.columns.iter().map(|c| c.name.as_str()));
    writer
        .write_record(header)
        .map_err(|e| AppError::io(format!("Failed to write `{}` CSV header: {e}", table.name)))?;

    for (row, x) in table.x.iter().enumerate() {
        let record = std::iter::once(x.to_string()).chain(table.columns.iter().map(|c| c.values[row].to_string()));
        writer
            .write_record(record)
            .map_err(|e| AppError::io(format!("Failed to write `{}` CSV row: {e}", table.name)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush `{}` CSV: {e}", table.name)))
}

pub(crate) fn create_output(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    File::create(path).map_err(|e| AppError::io(format!("Failed to create '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;
    use crate::io::ingest::read_table;

    #[test]
    fn assignment_csv_layout() {
        let assignments = vec![
            Assignment {
                x: 3.0,
                y: 7.1,
                chosen_function: Some("y12".to_string()),
                deviation: 0.25,
            },
            Assignment::unassigned(f64::NAN, 2.0, f64::INFINITY),
        ];

        let mut buf = Vec::new();
        write_assignments(&mut buf, &assignments).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "x,y,chosen_function,deviation\n3,7.1,y12,0.25\nNaN,2,,inf\n"
        );
    }

    #[test]
    fn written_table_reads_back() {
        let table = Table::new(
            "training",
            vec![-1.5, 0.0, 2.25],
            vec![
                Series::new("y1", vec![1.0, 2.0, 3.0]),
                Series::new("y2", vec![0.1, 0.2, 0.3]),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let back = read_table(buf.as_slice(), "training").unwrap();
        assert_eq!(back, table);
    }
}
