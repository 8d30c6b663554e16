//! Assignment of test points to the selected functions.
//!
//! Every test row is visited once. Each selected line is evaluated at the
//! row's x and the function with the smallest `|predicted - y|` wins; on exact
//! ties the earlier entry of the selection wins.
//!
//! Failures are row-scoped: a row with an unusable x or y, or an empty
//! selection, yields an unassigned record with `deviation = +inf` and the rest
//! of the batch continues.

use std::collections::BTreeMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::domain::{Assignment, FitResult, Observation, SelectionSet};

/// Mapper options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapOptions {
    /// When set, a function may claim a point only if its deviation is at most
    /// `factor * max_train_deviation` of that function.
    pub tolerance_factor: Option<f64>,
}

/// Map every observation to its nearest selected function.
///
/// The output has one record per input row, in input order.
pub fn map_test_points(points: &[Observation], selection: &SelectionSet, opts: MapOptions) -> Vec<Assignment> {
    if selection.is_empty() {
        warn!("Selection is empty; all {} test rows stay unassigned.", points.len());
    }

    let out: Vec<Assignment> = points
        .par_iter()
        .map(|p| map_point(p, selection, opts))
        .collect();

    let skipped = points.iter().filter(|p| usable_xy(p).is_none()).count();
    if skipped > 0 {
        warn!("{skipped} test row(s) had an unusable x or y and were left unassigned.");
    }
    debug!("Mapped {} test rows against {} functions.", out.len(), selection.len());

    out
}

fn map_point(p: &Observation, selection: &SelectionSet, opts: MapOptions) -> Assignment {
    let Some((x, y)) = usable_xy(p) else {
        return Assignment::unassigned(p.x.unwrap_or(f64::NAN), p.y.unwrap_or(f64::NAN), f64::INFINITY);
    };

    let Some((nearest, deviation)) = nearest_function(x, y, selection) else {
        return Assignment::unassigned(x, y, f64::INFINITY);
    };

    let chosen = match opts.tolerance_factor {
        None => Some(nearest),
        Some(factor) => nearest_within_tolerance(x, y, selection, factor),
    };

    match chosen {
        Some(fit) => Assignment {
            x,
            y,
            chosen_function: Some(fit.function_name.clone()),
            deviation: (fit.coefficients.eval(x) - y).abs(),
        },
        None => Assignment::unassigned(x, y, deviation),
    }
}

/// The selection entry whose line is closest to `(x, y)` and that distance.
///
/// Returns `None` for an empty selection or when no entry gives a finite
/// deviation.
pub fn nearest_function(x: f64, y: f64, selection: &SelectionSet) -> Option<(&FitResult, f64)> {
    let mut best: Option<(&FitResult, f64)> = None;
    for fit in selection {
        let d = (fit.coefficients.eval(x) - y).abs();
        if !d.is_finite() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((fit, d)),
        }
    }
    best
}

fn nearest_within_tolerance(x: f64, y: f64, selection: &SelectionSet, factor: f64) -> Option<&FitResult> {
    let mut best: Option<(&FitResult, f64)> = None;
    for fit in selection {
        let d = (fit.coefficients.eval(x) - y).abs();
        if !(d.is_finite() && d <= factor * fit.max_train_deviation) {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((fit, d)),
        }
    }
    best.map(|(fit, _)| fit)
}

fn usable_xy(p: &Observation) -> Option<(f64, f64)> {
    match (p.x, p.y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
        _ => None,
    }
}

/// Aggregate view of a mapping run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSummary {
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
    /// Assigned-point counts per function, in selection order (zero counts included).
    pub per_function: Vec<(String, usize)>,
    pub mean_deviation: Option<f64>,
    pub max_deviation: Option<f64>,
}

/// Summarize assignments against the selection they were mapped with.
pub fn summarize_assignments(assignments: &[Assignment], selection: &SelectionSet) -> AssignmentSummary {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut sum = 0.0;
    let mut max: Option<f64> = None;
    let mut assigned = 0usize;

    for a in assignments {
        let Some(name) = a.chosen_function.as_deref() else { continue };
        *counts.entry(name).or_default() += 1;
        assigned += 1;
        sum += a.deviation;
        max = Some(max.map_or(a.deviation, |m| m.max(a.deviation)));
    }

    let per_function = selection
        .iter()
        .map(|f| {
            let n = counts.get(f.function_name.as_str()).copied().unwrap_or(0);
            (f.function_name.clone(), n)
        })
        .collect();

    AssignmentSummary {
        total: assignments.len(),
        assigned,
        unassigned: assignments.len() - assigned,
        per_function,
        mean_deviation: (assigned > 0).then(|| sum / assigned as f64),
        max_deviation: max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineCoefficients;
    use approx::assert_abs_diff_eq;

    fn fit(name: &str, slope: f64, intercept: f64, max_dev: f64) -> FitResult {
        FitResult {
            function_name: name.to_string(),
            coefficients: LineCoefficients::new(slope, intercept),
            train_mse: 0.0,
            max_train_deviation: max_dev,
            train_series: "y1".to_string(),
            score: 0.0,
        }
    }

    fn selection(fits: Vec<FitResult>) -> SelectionSet {
        SelectionSet::from_entries(fits).unwrap()
    }

    #[test]
    fn single_point_takes_nearest_line() {
        let sel = selection(vec![fit("f1", 2.0, 1.0, 1.0), fit("f2", -1.0, 0.0, 1.0)]);
        let out = map_test_points(&[Observation::new(2, 3.0, 7.1)], &sel, MapOptions::default());

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].chosen_function.as_deref(), Some("f1"));
        assert_abs_diff_eq!(out[0].deviation, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn empty_selection_leaves_point_unassigned() {
        let out = map_test_points(&[Observation::new(2, 1.0, 1.0)], &SelectionSet::empty(), MapOptions::default());
        assert_eq!(out.len(), 1);
        assert!(out[0].chosen_function.is_none());
        assert!(out[0].deviation.is_infinite() && out[0].deviation > 0.0);
    }

    #[test]
    fn exact_tie_keeps_first_entry() {
        // Both lines are 1.0 away from (0, 0).
        let sel = selection(vec![fit("up", 0.0, 1.0, 1.0), fit("down", 0.0, -1.0, 1.0)]);
        let out = map_test_points(&[Observation::new(2, 0.0, 0.0)], &sel, MapOptions::default());
        assert_eq!(out[0].chosen_function.as_deref(), Some("up"));
    }

    #[test]
    fn malformed_row_does_not_abort_batch() {
        let sel = selection(vec![fit("f1", 1.0, 0.0, 1.0)]);
        let points = vec![
            Observation::new(2, 1.0, 1.0),
            Observation {
                line: 3,
                x: None,
                y: Some(2.0),
            },
            Observation::new(4, 2.0, 2.5),
        ];

        let out = map_test_points(&points, &sel, MapOptions::default());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].chosen_function.as_deref(), Some("f1"));
        assert!(out[1].chosen_function.is_none());
        assert!(out[1].x.is_nan());
        assert_eq!(out[1].y, 2.0);
        assert!(out[1].deviation.is_infinite());
        assert_abs_diff_eq!(out[2].deviation, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn output_preserves_row_order_and_is_minimal() {
        let sel = selection(vec![
            fit("a", 1.0, 0.0, 1.0),
            fit("b", -1.0, 4.0, 1.0),
            fit("c", 0.0, 2.5, 1.0),
            fit("d", 0.5, -1.0, 1.0),
        ]);
        let points: Vec<Observation> = (0..200)
            .map(|i| {
                let x = -3.0 + i as f64 * 0.037;
                let y = (x * 1.7).sin() * 3.0;
                Observation::new(i + 2, x, y)
            })
            .collect();

        let out = map_test_points(&points, &sel, MapOptions::default());
        assert_eq!(out.len(), points.len());
        for (p, a) in points.iter().zip(&out) {
            assert_eq!(Some(a.x), p.x);
            assert_eq!(Some(a.y), p.y);

            let name = a.chosen_function.as_deref().unwrap();
            let chosen = sel.get(name).unwrap();
            let recomputed = (chosen.coefficients.eval(a.x) - a.y).abs();
            assert_eq!(a.deviation, recomputed);
            for other in &sel {
                assert!(a.deviation <= (other.coefficients.eval(a.x) - a.y).abs());
            }
        }
    }

    #[test]
    fn tolerance_rejects_far_points() {
        let sel = selection(vec![fit("f1", 0.0, 0.0, 0.5)]);
        let opts = MapOptions {
            tolerance_factor: Some(2f64.sqrt()),
        };
        let points = [Observation::new(2, 0.0, 0.6), Observation::new(3, 0.0, 3.0)];

        let out = map_test_points(&points, &sel, opts);
        assert_eq!(out[0].chosen_function.as_deref(), Some("f1"));
        assert!(out[1].chosen_function.is_none());
        assert_abs_diff_eq!(out[1].deviation, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn tolerance_falls_back_to_next_eligible_function() {
        // `tight` is nearer but its band is narrow; `loose` is further but accepts.
        let sel = selection(vec![fit("tight", 0.0, 0.0, 0.1), fit("loose", 0.0, 2.0, 5.0)]);
        let opts = MapOptions {
            tolerance_factor: Some(1.0),
        };
        let out = map_test_points(&[Observation::new(2, 0.0, 0.9)], &sel, opts);
        assert_eq!(out[0].chosen_function.as_deref(), Some("loose"));
        assert_abs_diff_eq!(out[0].deviation, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn summary_counts_per_function() {
        let sel = selection(vec![fit("a", 0.0, 0.0, 1.0), fit("b", 0.0, 10.0, 1.0)]);
        let assignments = vec![
            Assignment {
                x: 0.0,
                y: 0.5,
                chosen_function: Some("a".to_string()),
                deviation: 0.5,
            },
            Assignment {
                x: 1.0,
                y: 0.1,
                chosen_function: Some("a".to_string()),
                deviation: 0.1,
            },
            Assignment::unassigned(f64::NAN, 1.0, f64::INFINITY),
        ];

        let summary = summarize_assignments(&assignments, &sel);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.assigned, 2);
        assert_eq!(summary.unassigned, 1);
        assert_eq!(summary.per_function, vec![("a".to_string(), 2), ("b".to_string(), 0)]);
        assert_abs_diff_eq!(summary.mean_deviation.unwrap(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.max_deviation.unwrap(), 0.5, epsilon = 1e-12);
    }
}
