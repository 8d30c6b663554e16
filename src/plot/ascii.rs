//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fitted lines of the selection: `-`, `~`, `=`, `+` (by selection order)
//! - test points: the 1-based selection index of the chosen function, `?` when unassigned

use crate::domain::{Assignment, SelectionSet, finite_range};

const LINE_CHARS: [char; 4] = ['-', '~', '=', '+'];

/// Render the selection's lines and the mapped test points.
///
/// `x_range` fixes the horizontal extent (e.g. the training grid); without it
/// the extent of the test points is used.
pub fn render_ascii_plot(
    selection: &SelectionSet,
    assignments: &[Assignment],
    x_range: Option<(f64, f64)>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs: Vec<f64> = assignments.iter().map(|a| a.x).collect();
    let (x_min, x_max) = x_range
        .filter(|(lo, hi)| lo.is_finite() && hi.is_finite() && hi > lo)
        .or_else(|| finite_range(&xs))
        .unwrap_or((0.0, 1.0));

    let curves: Vec<Vec<(f64, f64)>> = selection
        .iter()
        .map(|fit| sample_line(|x| fit.coefficients.eval(x), x_min, x_max, width))
        .collect();

    let (y_min, y_max) = y_range(assignments, &curves).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw lines first (so points can overlay).
    for (i, curve) in curves.iter().enumerate() {
        draw_curve(&mut grid, curve, LINE_CHARS[i % LINE_CHARS.len()], x_min, x_max, y_min, y_max);
    }

    for a in assignments {
        if !(a.x.is_finite() && a.y.is_finite()) {
            continue;
        }
        let x = map_x(a.x, x_min, x_max, width);
        let y = map_y(a.y, y_min, y_max, height);
        let ch = a
            .chosen_function
            .as_deref()
            .and_then(|name| selection.index_of(name))
            .map(point_char)
            .unwrap_or('?');
        grid[y][x] = ch;
    }

    // Build final string. We include a small header with ranges and a legend.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    if !selection.is_empty() {
        let legend: Vec<String> = selection
            .iter()
            .enumerate()
            .map(|(i, fit)| {
                format!(
                    "{} {} ({})",
                    LINE_CHARS[i % LINE_CHARS.len()],
                    fit.function_name,
                    point_char(i)
                )
            })
            .collect();
        out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn point_char(index: usize) -> char {
    char::from_digit(index as u32 + 1, 10).unwrap_or('*')
}

fn sample_line(f: impl Fn(f64) -> f64, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x_min + u * (x_max - x_min);
        out.push((x, f(x)));
    }
    out
}

fn y_range(assignments: &[Assignment], curves: &[Vec<(f64, f64)>]) -> Option<(f64, f64)> {
    let ys: Vec<f64> = assignments
        .iter()
        .filter(|a| a.x.is_finite())
        .map(|a| a.y)
        .chain(curves.iter().flatten().map(|&(_, y)| y))
        .collect();
    finite_range(&ys)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitResult, LineCoefficients};

    #[test]
    fn plot_golden_snapshot_small() {
        let selection = SelectionSet::from_entries(vec![FitResult {
            function_name: "f1".to_string(),
            coefficients: LineCoefficients::new(0.0, 0.0),
            train_mse: 0.0,
            max_train_deviation: 0.0,
            train_series: "y1".to_string(),
            score: 0.0,
        }])
        .unwrap();
        let assignments = vec![
            Assignment {
                x: 0.0,
                y: 0.0,
                chosen_function: Some("f1".to_string()),
                deviation: 0.0,
            },
            Assignment::unassigned(10.0, 10.0, 10.0),
        ];

        let txt = render_ascii_plot(&selection, &assignments, Some((0.0, 10.0)), 10, 5);
        let expected = concat!(
            "Plot: x=[0.000, 10.000] | y=[-0.50, 10.50]\n",
            "Legend: - f1 (1)\n",
            "         ?\n",
            "          \n",
            "          \n",
            "          \n",
            "1---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn unusable_points_are_skipped() {
        let assignments = vec![Assignment::unassigned(f64::NAN, 1.0, f64::INFINITY)];
        let txt = render_ascii_plot(&SelectionSet::empty(), &assignments, None, 12, 6);
        assert!(txt.starts_with("Plot: x=[0.000, 1.000]"));
        assert!(!txt.contains('?'));
        assert_eq!(txt.lines().count(), 7);
    }
}
