//! Best-fit selection of ideal functions.
//!
//! For every candidate column `c` of the ideal catalog and every training
//! series `t` we compute the squared deviation
//!
//! ```text
//! D[c][t] = Σ_rows (ideal_c - train_t)^2
//! ```
//!
//! and score each candidate by `Σ_t D[c][t]`. The four lowest-scoring
//! candidates form the selection. A candidate only has to be good in
//! aggregate, not best for any single series.
//!
//! Each selected candidate is then paired with a training series and a line is
//! fitted to that series (see `PairingMode`).

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::domain::{FitResult, PairingMode, SelectionSet, Series, Table};
use crate::error::AppError;
use crate::math::{fit_line, max_abs_deviation, mean_squared_error, sum_squared_deviation};

/// Number of ideal functions kept by the selector.
pub const SELECTION_SIZE: usize = 4;

/// A candidate column with its aggregate score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    /// Column index in the ideal catalog.
    pub index: usize,
    pub score: f64,
}

/// Squared-deviation matrix, one row per candidate, one column per training series.
///
/// Rows are computed in parallel and collected in catalog order.
pub fn deviation_matrix(train: &[Series], candidates: &[Series]) -> Vec<Vec<f64>> {
    candidates
        .par_iter()
        .map(|c| {
            train
                .iter()
                .map(|t| sum_squared_deviation(&c.values, &t.values))
                .collect()
        })
        .collect()
}

/// Score candidates by row sum and sort ascending.
///
/// The sort is stable, so equal scores keep catalog order. NaN scores rank last.
pub fn rank_candidates(matrix: &[Vec<f64>]) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = matrix
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let score: f64 = row.iter().sum();
            RankedCandidate {
                index,
                score: if score.is_nan() { f64::INFINITY } else { score },
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked
}

/// Select up to `SELECTION_SIZE` ideal functions and fit a line for each.
///
/// Fails on an empty training table or when a line fit is degenerate; no
/// partial selection is returned in that case.
pub fn select_best_fit(train: &Table, ideal: &Table, pairing: PairingMode) -> Result<SelectionSet, AppError> {
    if train.n_columns() == 0 {
        return Err(AppError::empty_input(format!(
            "Table `{}` has no y series to fit.",
            train.name
        )));
    }
    if train.n_rows() == 0 {
        return Err(AppError::empty_input(format!("Table `{}` has no rows.", train.name)));
    }
    warn_on_misaligned_grids(train, ideal);

    let matrix = deviation_matrix(&train.columns, &ideal.columns);
    let ranked = rank_candidates(&matrix);
    let take = ranked.len().min(SELECTION_SIZE);

    if take < SELECTION_SIZE {
        warn!(
            "Ideal catalog `{}` has only {} candidate column(s); selecting {take}.",
            ideal.name,
            ideal.n_columns()
        );
    }
    if pairing == PairingMode::Positional && train.n_columns() < take {
        warn!(
            "Only {} training series for {take} selected functions; positional pairing wraps around.",
            train.n_columns()
        );
    }

    let mut entries = Vec::with_capacity(take);
    for (rank, candidate) in ranked.iter().take(take).enumerate() {
        let function = &ideal.columns[candidate.index];
        let series_idx = match pairing {
            PairingMode::Positional => rank % train.n_columns(),
            PairingMode::BestMatch => best_series(&matrix[candidate.index]),
        };
        let series = &train.columns[series_idx];

        let coefficients = fit_line(&train.x, &series.values).map_err(|e| {
            e.context(format!(
                "Fitting selected function `{}` (catalog column {}, rank {rank}) to training series `{}` (index {series_idx})",
                function.name, candidate.index, series.name
            ))
        })?;
        let train_mse = mean_squared_error(&coefficients, &train.x, &series.values);
        let max_train_deviation = max_abs_deviation(&coefficients, &train.x, &series.values);

        info!(
            "Selected `{}` (score {:.6}) paired with `{}`: slope={:.6} intercept={:.6} mse={:.6}",
            function.name, candidate.score, series.name, coefficients.slope, coefficients.intercept, train_mse
        );

        entries.push(FitResult {
            function_name: function.name.clone(),
            coefficients,
            train_mse,
            max_train_deviation,
            train_series: series.name.clone(),
            score: candidate.score,
        });
    }

    SelectionSet::from_entries(entries)
}

/// Index of the smallest entry; ties go to the lower index.
fn best_series(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, &d) in row.iter().enumerate().skip(1) {
        if d < row[best] {
            best = i;
        }
    }
    best
}

fn warn_on_misaligned_grids(train: &Table, ideal: &Table) {
    if train.n_rows() != ideal.n_rows() {
        warn!(
            "Row counts differ: `{}` has {} rows, `{}` has {}; deviations use the common prefix.",
            train.name,
            train.n_rows(),
            ideal.name,
            ideal.n_rows()
        );
        return;
    }
    let mismatched = train.x.iter().zip(&ideal.x).filter(|(a, b)| a != b).count();
    if mismatched > 0 {
        warn!(
            "x grids of `{}` and `{}` differ on {mismatched} row(s).",
            train.name, ideal.name
        );
    } else {
        debug!("x grids of `{}` and `{}` are aligned.", train.name, ideal.name);
    }
}
