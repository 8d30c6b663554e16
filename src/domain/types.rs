//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during selection and mapping
//! - exported to JSON/CSV
//! - reloaded later for mapping or plotting

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A named column of values aligned by row index to a table's x column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A fixed-schema numeric table: an `x` column plus named value columns.
///
/// Column names are resolved once at construction; everything downstream
/// works with indices and slices.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Label used in log lines and error messages (e.g. "training").
    pub name: String,
    pub x: Vec<f64>,
    pub columns: Vec<Series>,
}

impl Table {
    /// Build a table, checking that every column has one value per x and that
    /// column names are unique.
    pub fn new(name: impl Into<String>, x: Vec<f64>, columns: Vec<Series>) -> Result<Self, AppError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for col in &columns {
            if col.name.eq_ignore_ascii_case("x") {
                return Err(AppError::schema(format!(
                    "Table `{name}`: value column may not be named `x`."
                )));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(AppError::schema(format!(
                    "Table `{name}`: duplicate column `{}`.",
                    col.name
                )));
            }
            if col.len() != x.len() {
                return Err(AppError::schema(format!(
                    "Table `{name}`: column `{}` has {} values but x has {}.",
                    col.name,
                    col.len(),
                    x.len()
                )));
            }
        }
        Ok(Self { name, x, columns })
    }

    pub fn n_rows(&self) -> usize {
        self.x.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.x)
    }
}

/// Degree-1 polynomial `slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineCoefficients {
    pub slope: f64,
    pub intercept: f64,
}

impl LineCoefficients {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Evaluate the line at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// How selected candidates are paired with training series for the line fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PairingMode {
    /// The i-th selected candidate is fitted against the i-th training series.
    #[default]
    Positional,
    /// Each selected candidate is fitted against the training series it
    /// individually matches best (lowest squared deviation).
    BestMatch,
}

/// Fit output for one selected ideal function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Name of the selected ideal-function column.
    pub function_name: String,
    pub coefficients: LineCoefficients,
    /// Mean squared residual of the line against the paired training series.
    pub train_mse: f64,
    /// Largest absolute residual of the line against the paired training series.
    pub max_train_deviation: f64,
    /// Name of the training series the line was fitted to.
    pub train_series: String,
    /// Aggregate squared deviation of the candidate across all training series.
    pub score: f64,
}

/// The selected ideal functions, in selection (score) order.
///
/// Keys are unique. Order carries no meaning for lookups but fixes the
/// tie-break order of the mapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    entries: Vec<FitResult>,
}

impl SelectionSet {
    pub fn from_entries(entries: Vec<FitResult>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for e in &entries {
            if !seen.insert(e.function_name.as_str()) {
                return Err(AppError::schema(format!(
                    "Selection contains `{}` more than once.",
                    e.function_name
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, function_name: &str) -> Option<&FitResult> {
        self.entries.iter().find(|e| e.function_name == function_name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FitResult> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.function_name.as_str()).collect()
    }

    /// Position of a function in selection order.
    pub fn index_of(&self, function_name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.function_name == function_name)
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a FitResult;
    type IntoIter = std::slice::Iter<'a, FitResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One test-table row. A value is `None` when the cell was missing or not a
/// finite number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Observation {
    pub fn new(line: usize, x: f64, y: f64) -> Self {
        Self {
            line,
            x: Some(x),
            y: Some(y),
        }
    }
}

/// A row-level problem encountered while reading test observations.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Test observations in file order plus any row-level problems.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    pub points: Vec<Observation>,
    pub row_errors: Vec<RowError>,
}

/// Mapping outcome for one test row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Observed x (`NaN` when the row's x was unusable).
    pub x: f64,
    /// Observed y (`NaN` when the row's y was unusable).
    pub y: f64,
    pub chosen_function: Option<String>,
    /// Minimum absolute residual found, `+inf` when nothing was evaluable.
    pub deviation: f64,
}

impl Assignment {
    pub fn unassigned(x: f64, y: f64, deviation: f64) -> Self {
        Self {
            x,
            y,
            chosen_function: None,
            deviation,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.chosen_function.is_some()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train_path: PathBuf,
    pub ideal_path: PathBuf,
    pub test_path: PathBuf,
    pub out_dir: PathBuf,

    pub pairing: PairingMode,
    /// Optional acceptance criterion: a candidate may claim a test point only
    /// if its deviation is at most `factor * max_train_deviation`.
    pub tolerance_factor: Option<f64>,

    pub chart: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

/// A saved selection (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub pairing: PairingMode,
    /// Tolerance factor of the run that wrote the file; `map` and `plot` fall
    /// back to it when no `--tolerance-factor` is given.
    #[serde(default)]
    pub tolerance_factor: Option<f64>,
    /// x range of the training grid, used to size plots.
    pub x_range: Option<[f64; 2]>,
    pub selection: SelectionSet,
}

/// Smallest and largest finite value, if the range is non-degenerate.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn fit(name: &str) -> FitResult {
        FitResult {
            function_name: name.to_string(),
            coefficients: LineCoefficients::new(1.0, 0.0),
            train_mse: 0.0,
            max_train_deviation: 0.0,
            train_series: "y1".to_string(),
            score: 0.0,
        }
    }

    #[test]
    fn table_rejects_misaligned_column() {
        let err = Table::new("training", vec![1.0, 2.0], vec![Series::new("y1", vec![1.0])]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn table_rejects_duplicate_column() {
        let cols = vec![Series::new("y1", vec![1.0]), Series::new("y1", vec![2.0])];
        let err = Table::new("ideal", vec![0.0], cols).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn selection_set_rejects_duplicate_names() {
        let err = SelectionSet::from_entries(vec![fit("y3"), fit("y3")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn selection_set_lookup_by_name() {
        let set = SelectionSet::from_entries(vec![fit("y3"), fit("y9")]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of("y9"), Some(1));
        assert!(set.get("y4").is_none());
        assert_eq!(set.names(), vec!["y3", "y9"]);
    }

    #[test]
    fn line_eval() {
        let line = LineCoefficients::new(2.0, 1.0);
        assert_eq!(line.eval(3.0), 7.0);
    }

    #[test]
    fn finite_range_skips_nan() {
        assert_eq!(finite_range(&[f64::NAN, 1.0, 4.0]), Some((1.0, 4.0)));
        assert_eq!(finite_range(&[2.0, 2.0]), None);
    }
}
