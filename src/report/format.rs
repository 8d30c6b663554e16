//! Formatted terminal output for selection and mapping results.
//!
//! We keep formatting code in one place so:
//! - the selection/mapping code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{Assignment, PairingMode, SelectionSet, Table};
use crate::map::AssignmentSummary;

/// Format the selection summary (input sizes + one line per selected function).
pub fn format_selection_summary(
    train: &Table,
    ideal: &Table,
    selection: &SelectionSet,
    pairing: PairingMode,
) -> String {
    let mut out = String::new();

    out.push_str("=== ideal - best-fit ideal function selection ===\n");
    out.push_str(&format!(
        "Training: {} rows x {} series | Ideal catalog: {} rows x {} functions\n",
        train.n_rows(),
        train.n_columns(),
        ideal.n_rows(),
        ideal.n_columns()
    ));
    out.push_str(&format!("Pairing: {}\n", pairing_label(pairing)));
    out.push('\n');
    out.push_str(&format_selection_table(selection));
    out
}

/// One row per selected function.
pub fn format_selection_table(selection: &SelectionSet) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<4} {:<12} {:<12} {:>14} {:>12} {:>12} {:>12} {:>12}\n",
            "rank", "function", "train", "score", "slope", "intercept", "mse", "max_dev"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<4} {:-<12} {:-<12} {:-<14} {:-<12} {:-<12} {:-<12} {:-<12}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (rank, fit) in selection.iter().enumerate() {
        out.push_str(
            format!(
                "{:<4} {:<12} {:<12} {:>14.4} {:>12.6} {:>12.6} {:>12.6} {:>12.6}\n",
                rank + 1,
                truncate(&fit.function_name, 12),
                truncate(&fit.train_series, 12),
                fit.score,
                fit.coefficients.slope,
                fit.coefficients.intercept,
                fit.train_mse,
                fit.max_train_deviation,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if selection.is_empty() {
        out.push_str("(no functions selected)\n");
    }

    out
}

/// Format the mapping summary.
pub fn format_assignment_summary(summary: &AssignmentSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Test points: n={} | assigned={} | unassigned={}\n",
        summary.total, summary.assigned, summary.unassigned
    ));
    if let (Some(mean), Some(max)) = (summary.mean_deviation, summary.max_deviation) {
        out.push_str(&format!("Deviation of assigned points: mean={mean:.6} max={max:.6}\n"));
    }
    for (name, n) in &summary.per_function {
        out.push_str(&format!("  {:<12} {n:>6}\n", truncate(name, 12)));
    }
    out
}

/// Format the first `limit` assignments as a table.
pub fn format_assignments(assignments: &[Assignment], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!("{:>12} {:>12} {:<12} {:>12}\n", "x", "y", "function", "deviation").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<12} {:-<12} {:-<12}\n", "", "", "", "").trim_end());
    out.push('\n');

    for a in assignments.iter().take(limit) {
        out.push_str(
            format!(
                "{:>12.4} {:>12.4} {:<12} {:>12.6}\n",
                a.x,
                a.y,
                truncate(a.chosen_function.as_deref().unwrap_or("-"), 12),
                a.deviation
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if assignments.len() > limit {
        out.push_str(&format!("... {} more rows\n", assignments.len() - limit));
    }
    out
}

fn pairing_label(pairing: PairingMode) -> &'static str {
    match pairing {
        PairingMode::Positional => "positional (i-th selected <-> i-th training series)",
        PairingMode::BestMatch => "best-match (each selected <-> its closest training series)",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
