//! SVG chart of a selection run, rendered with Plotters.
//!
//! One chart shows:
//! - the training series as small hollow dots
//! - the fitted line of every selected function
//! - the test points, coloured by the function they were assigned to
//!   (grey crosses for unassigned points)
//!
//! All bounds are computed up front; drawing never sees non-finite values.

use std::path::Path;

use log::info;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::domain::{Assignment, SelectionSet, Table, finite_range};
use crate::error::AppError;

/// Default canvas size in pixels.
pub const CHART_SIZE: (u32, u32) = (1024, 768);

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];
const TRAIN_COLOR: RGBColor = RGBColor(170, 170, 170);
const UNASSIGNED_COLOR: RGBColor = RGBColor(90, 90, 90);

/// Render the chart and write it to `path`.
pub fn write_chart_svg(
    path: &Path,
    train: &Table,
    selection: &SelectionSet,
    assignments: &[Assignment],
) -> Result<(), AppError> {
    let svg = render_chart_svg(train, selection, assignments, CHART_SIZE)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    std::fs::write(path, svg).map_err(|e| AppError::io(format!("Failed to write chart '{}': {e}", path.display())))?;
    info!("Wrote chart to '{}'.", path.display());
    Ok(())
}

/// Render the chart into an SVG document.
pub fn render_chart_svg(
    train: &Table,
    selection: &SelectionSet,
    assignments: &[Assignment],
    size: (u32, u32),
) -> Result<String, AppError> {
    let bounds = ChartBounds::compute(train, selection, assignments);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw(&root, &bounds, train, selection, assignments)
            .map_err(|e| AppError::io(format!("Failed to render chart: {e}")))?;
        root.present()
            .map_err(|e| AppError::io(format!("Failed to finish chart: {e}")))?;
    }
    Ok(svg)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ChartBounds {
    x: (f64, f64),
    y: (f64, f64),
}

impl ChartBounds {
    fn compute(train: &Table, selection: &SelectionSet, assignments: &[Assignment]) -> Self {
        let xs: Vec<f64> = train
            .x
            .iter()
            .copied()
            .chain(assignments.iter().map(|a| a.x))
            .collect();
        let x = finite_range(&xs).unwrap_or((0.0, 1.0));

        let ys: Vec<f64> = train
            .columns
            .iter()
            .flat_map(|c| c.values.iter().copied())
            .chain(assignments.iter().map(|a| a.y))
            .chain(
                selection
                    .iter()
                    .flat_map(|f| [f.coefficients.eval(x.0), f.coefficients.eval(x.1)]),
            )
            .collect();
        let y = finite_range(&ys).unwrap_or((0.0, 1.0));
        let pad = (y.1 - y.0) * 0.05;

        Self {
            x,
            y: (y.0 - pad, y.1 + pad),
        }
    }
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    bounds: &ChartBounds,
    train: &Table,
    selection: &SelectionSet,
    assignments: &[Assignment],
) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;

    let (x0, x1) = bounds.x;
    let (y0, y1) = bounds.y;

    let mut chart = ChartBuilder::on(root)
        .caption("Selected ideal functions and test assignments", ("sans-serif", 22))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .x_labels(10)
        .y_labels(10)
        .draw()?;

    // 1) Training series.
    for series in &train.columns {
        chart.draw_series(
            train
                .x
                .iter()
                .zip(&series.values)
                .map(|(&x, &y)| Circle::new((x, y), 2, TRAIN_COLOR.stroke_width(1))),
        )?;
    }

    // 2) Fitted lines, one colour per selected function.
    for (i, fit) in selection.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let line = [(x0, fit.coefficients.eval(x0)), (x1, fit.coefficients.eval(x1))];
        chart
            .draw_series(LineSeries::new(line, color.stroke_width(2)))?
            .label(format!("{} (fit to {})", fit.function_name, fit.train_series))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    // 3) Test points by assigned function.
    for a in assignments.iter().filter(|a| a.x.is_finite() && a.y.is_finite()) {
        let color = a
            .chosen_function
            .as_deref()
            .and_then(|name| selection.index_of(name))
            .map(|i| PALETTE[i % PALETTE.len()])
            .unwrap_or(UNASSIGNED_COLOR);
        if a.is_assigned() {
            chart.draw_series(std::iter::once(Circle::new((a.x, a.y), 4, color.filled())))?;
        } else {
            chart.draw_series(std::iter::once(Cross::new((a.x, a.y), 4, color.stroke_width(2))))?;
        }
    }

    if !selection.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitResult, LineCoefficients, Series};

    fn fixtures() -> (Table, SelectionSet, Vec<Assignment>) {
        let train = Table::new(
            "training",
            vec![0.0, 1.0, 2.0],
            vec![Series::new("y1", vec![1.0, 3.0, 5.0])],
        )
        .unwrap();
        let selection = SelectionSet::from_entries(vec![FitResult {
            function_name: "y17".to_string(),
            coefficients: LineCoefficients::new(2.0, 1.0),
            train_mse: 0.0,
            max_train_deviation: 0.0,
            train_series: "y1".to_string(),
            score: 0.0,
        }])
        .unwrap();
        let assignments = vec![
            Assignment {
                x: 1.5,
                y: 4.1,
                chosen_function: Some("y17".to_string()),
                deviation: 0.1,
            },
            Assignment::unassigned(0.5, 9.0, 6.0),
            Assignment::unassigned(f64::NAN, f64::NAN, f64::INFINITY),
        ];
        (train, selection, assignments)
    }

    #[test]
    fn bounds_cover_all_finite_inputs() {
        let (train, selection, assignments) = fixtures();
        let b = ChartBounds::compute(&train, &selection, &assignments);
        assert_eq!(b.x, (0.0, 2.0));
        assert!(b.y.0 < 1.0 && b.y.1 > 9.0);
    }

    #[test]
    fn renders_svg_with_legend() {
        let (train, selection, assignments) = fixtures();
        let svg = render_chart_svg(&train, &selection, &assignments, (640, 480)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("y17 (fit to y1)"));
    }

    #[test]
    fn renders_with_empty_inputs() {
        let train = Table::new("training", vec![], vec![]).unwrap();
        let svg = render_chart_svg(&train, &SelectionSet::empty(), &[], (320, 240)).unwrap();
        assert!(svg.contains("<svg"));
    }
}
