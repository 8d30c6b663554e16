//! Command-line parsing for the ideal-function fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the selection/mapping code.
//!
//! Input paths can also come from the environment (`IDEAL_TRAIN`, `IDEAL_IDEAL`,
//! `IDEAL_TEST`, `IDEAL_OUT_DIR`), including a `.env` file in the working
//! directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::PairingMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ideal",
    version,
    about = "Select best-fit ideal functions from training data and map test points onto them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select ideal functions, map the test set, and write all outputs.
    Run(RunArgs),
    /// Select ideal functions only and write the selection JSON.
    Select(SelectArgs),
    /// Map a test set onto a previously saved selection.
    Map(MapArgs),
    /// Plot a saved selection (and optionally a mapped test set) in the terminal.
    Plot(PlotArgs),
    /// Write a reproducible synthetic train/ideal/test dataset.
    Demo(DemoArgs),
}

/// Options for a full selection + mapping run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Training table (`x` plus one column per training series).
    #[arg(long, env = "IDEAL_TRAIN", value_name = "CSV")]
    pub train: PathBuf,

    /// Ideal-function catalog (`x` plus one column per candidate).
    #[arg(long, env = "IDEAL_IDEAL", value_name = "CSV")]
    pub ideal: PathBuf,

    /// Test observations (`x`, `y`).
    #[arg(long, env = "IDEAL_TEST", value_name = "CSV")]
    pub test: PathBuf,

    /// Directory for `assignments.csv`, `selection.json` and `chart.svg`.
    #[arg(long, env = "IDEAL_OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// How selected functions are paired with training series for the line fit.
    #[arg(long, value_enum, default_value_t = PairingMode::Positional)]
    pub pairing: PairingMode,

    /// Accept a function for a test point only within `factor * max training deviation`
    /// (e.g. 1.4142 for √2). Off by default.
    #[arg(long, value_name = "FACTOR")]
    pub tolerance_factor: Option<f64>,

    /// Skip writing the SVG chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for selection only.
#[derive(Debug, Parser, Clone)]
pub struct SelectArgs {
    /// Training table (`x` plus one column per training series).
    #[arg(long, env = "IDEAL_TRAIN", value_name = "CSV")]
    pub train: PathBuf,

    /// Ideal-function catalog (`x` plus one column per candidate).
    #[arg(long, env = "IDEAL_IDEAL", value_name = "CSV")]
    pub ideal: PathBuf,

    /// How selected functions are paired with training series for the line fit.
    #[arg(long, value_enum, default_value_t = PairingMode::Positional)]
    pub pairing: PairingMode,

    /// Selection JSON to write.
    #[arg(long, default_value = "out/selection.json", value_name = "JSON")]
    pub out: PathBuf,
}

/// Options for mapping a test set onto a saved selection.
#[derive(Debug, Parser, Clone)]
pub struct MapArgs {
    /// Selection JSON produced by `ideal select` or `ideal run`.
    #[arg(long, value_name = "JSON")]
    pub selection: PathBuf,

    /// Test observations (`x`, `y`).
    #[arg(long, env = "IDEAL_TEST", value_name = "CSV")]
    pub test: PathBuf,

    /// Accept a function for a test point only within `factor * max training deviation`.
    /// Defaults to the factor stored in the selection file.
    #[arg(long, value_name = "FACTOR")]
    pub tolerance_factor: Option<f64>,

    /// Assignment CSV to write.
    #[arg(long, default_value = "out/assignments.csv", value_name = "CSV")]
    pub out: PathBuf,

    /// Number of assignment rows to print.
    #[arg(long, default_value_t = 20)]
    pub show: usize,
}

/// Options for plotting a saved selection.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Selection JSON produced by `ideal select` or `ideal run`.
    #[arg(long, value_name = "JSON")]
    pub selection: PathBuf,

    /// Optional test observations to map and overlay.
    #[arg(long, value_name = "CSV")]
    pub test: Option<PathBuf>,

    /// Tolerance factor used when mapping the overlay points (defaults to the saved one).
    #[arg(long, value_name = "FACTOR")]
    pub tolerance_factor: Option<f64>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for synthetic dataset generation.
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Directory for `train.csv`, `ideal.csv` and `test.csv`.
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Rows in the shared x grid.
    #[arg(long, default_value_t = 400)]
    pub grid_points: usize,

    /// Number of ideal functions in the catalog.
    #[arg(long, default_value_t = 50)]
    pub ideal_count: usize,

    /// Number of test observations.
    #[arg(long, default_value_t = 100)]
    pub test_count: usize,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.3)]
    pub noise_sd: f64,
}
