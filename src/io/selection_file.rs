//! Read/write selection JSON files.
//!
//! Selection JSON is the "portable" representation of a selection run:
//! - every selected function with its fitted line and training errors
//! - run metadata (tool, timestamp, pairing mode, tolerance factor)
//! - the training x range, for plotting without the original tables
//!
//! The schema is defined by `domain::SelectionFile`.

use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use log::info;

use crate::domain::{PairingMode, SelectionFile, SelectionSet, Table};
use crate::error::AppError;
use crate::io::export::create_output;

/// Tool name stamped into selection files.
pub const TOOL_NAME: &str = "ideal";

/// Bundle a selection with run metadata.
pub fn bundle_selection(
    selection: &SelectionSet,
    train: &Table,
    pairing: PairingMode,
    tolerance_factor: Option<f64>,
) -> SelectionFile {
    SelectionFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        pairing,
        tolerance_factor,
        x_range: train.x_range().map(|(lo, hi)| [lo, hi]),
        selection: selection.clone(),
    }
}

/// Write a selection JSON file.
pub fn write_selection_json(path: &Path, file: &SelectionFile) -> Result<(), AppError> {
    let out = create_output(path)?;
    write_selection(out, file)?;
    info!("Wrote selection ({} functions) to '{}'.", file.selection.len(), path.display());
    Ok(())
}

pub fn write_selection<W: Write>(sink: W, file: &SelectionFile) -> Result<(), AppError> {
    serde_json::to_writer_pretty(sink, file)
        .map_err(|e| AppError::io(format!("Failed to write selection JSON: {e}")))
}

/// Read a selection JSON file.
pub fn read_selection_json(path: &Path) -> Result<SelectionFile, AppError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::file_not_found(format!("Selection file not found: '{}'", path.display()))
        } else {
            AppError::io(format!("Failed to open selection JSON '{}': {e}", path.display()))
        }
    })?;
    read_selection(file).map_err(|e| e.context(format!("'{}'", path.display())))
}

/// Parse a selection file and re-check that function names are unique.
pub fn read_selection<R: Read>(source: R) -> Result<SelectionFile, AppError> {
    let mut file: SelectionFile =
        serde_json::from_reader(source).map_err(|e| AppError::schema(format!("Invalid selection JSON: {e}")))?;
    file.selection = SelectionSet::from_entries(file.selection.iter().cloned().collect())?;
    Ok(file)
}
