//! Degree-1 least squares and residual statistics.
//!
//! The line is fitted on centred x (`x - x̄`) in closed form,
//! `slope = Sxy / Sxx`, so tiny but non-zero x spreads keep their slope; the
//! intercept is shifted back afterwards. Zero-variance x has
//! no defined slope and is reported as a numeric error instead of NaN
//! coefficients.

use nalgebra::DVector;

use crate::domain::LineCoefficients;
use crate::error::AppError;

/// Fit `y ≈ slope * x + intercept` by ordinary least squares.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineCoefficients, AppError> {
    if x.len() != y.len() {
        return Err(AppError::numeric(format!(
            "x and y lengths differ ({} vs {}).",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n == 0 {
        return Err(AppError::empty_input("Cannot fit a line to zero rows."));
    }
    if let Some(i) = x.iter().chain(y).position(|v| !v.is_finite()) {
        let (col, row) = if i < n { ("x", i) } else { ("y", i - n) };
        return Err(AppError::numeric(format!("Non-finite {col} value at row {row}.")));
    }

    let (x_min, x_max) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let scale = x_min.abs().max(x_max.abs()).max(1.0);
    if x_max - x_min <= f64::EPSILON * scale {
        return Err(AppError::numeric(format!(
            "x has zero variance (all values ≈ {x_min}); slope is undefined."
        )));
    }

    let x = DVector::from_column_slice(x);
    let y = DVector::from_column_slice(y);
    let x_mean = x.mean();
    let y_mean = y.mean();
    let xc = x.add_scalar(-x_mean);
    let yc = y.add_scalar(-y_mean);

    let sxx = xc.dot(&xc);
    if !(sxx.is_finite() && sxx > 0.0) {
        return Err(AppError::numeric(format!(
            "x spread too small to fit a line (Sxx = {sxx})."
        )));
    }
    let slope = xc.dot(&yc) / sxx;
    let intercept = y_mean - slope * x_mean;
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(AppError::numeric("Line fit produced non-finite coefficients."));
    }

    Ok(LineCoefficients::new(slope, intercept))
}

/// `Σ (a_i - b_i)^2` over the common prefix of the two slices.
pub fn sum_squared_deviation(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&u, &v)| (u - v) * (u - v)).sum()
}

/// Mean of `(line(x_i) - y_i)^2`.
///
/// Returns NaN for empty input.
pub fn mean_squared_error(line: &LineCoefficients, x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = line.eval(xi) - yi;
            r * r
        })
        .sum();
    sse / n as f64
}

/// Largest `|line(x_i) - y_i|`, or 0 for empty input.
pub fn max_abs_deviation(line: &LineCoefficients, x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| (line.eval(xi) - yi).abs())
        .fold(0.0, f64::max)
}
