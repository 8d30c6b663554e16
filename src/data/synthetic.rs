//! Synthetic train / ideal / test datasets.
//!
//! The catalog is a family of smooth functions (lines, parabolas, sinusoids,
//! cubics, square-root shapes) sampled on one shared x grid. Four catalog
//! members are drawn as the "true" functions; the training table holds them
//! with Gaussian noise and the test table holds noisy points scattered over the
//! same four functions. Everything derives from one seed, so a dataset is
//! reproducible.

use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Series, Table};
use crate::error::AppError;
use crate::fit::SELECTION_SIZE;
use crate::io::write_table_csv;

/// Parameters of the generator.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    pub x_min: f64,
    pub x_max: f64,
    /// Number of grid rows shared by training and catalog.
    pub grid_points: usize,
    /// Number of catalog (ideal) functions.
    pub ideal_count: usize,
    pub test_count: usize,
    /// Standard deviation of the additive noise.
    pub noise_sd: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            x_min: -20.0,
            x_max: 20.0,
            grid_points: 400,
            ideal_count: 50,
            test_count: 100,
            noise_sd: 0.3,
        }
    }
}

/// A generated dataset and the catalog columns it was drawn from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: Table,
    pub ideal: Table,
    pub test: Table,
    /// Catalog column names behind `train`'s series, in series order.
    pub truth: Vec<String>,
}

/// File paths written by `write_dataset`.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub train: PathBuf,
    pub ideal: PathBuf,
    pub test: PathBuf,
}

pub fn generate_dataset(config: &DemoConfig) -> Result<Dataset, AppError> {
    if config.grid_points < 2 {
        return Err(AppError::config("Grid needs at least 2 points."));
    }
    if config.ideal_count < SELECTION_SIZE {
        return Err(AppError::config(format!(
            "Ideal catalog needs at least {SELECTION_SIZE} functions."
        )));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::config("Invalid x range for dataset generation."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    let step = (config.x_max - config.x_min) / (config.grid_points as f64 - 1.0);
    let x: Vec<f64> = (0..config.grid_points)
        .map(|i| config.x_min + i as f64 * step)
        .collect();

    let shapes: Vec<Shape> = (0..config.ideal_count).map(|k| Shape::draw(k, &mut rng)).collect();
    let ideal_cols: Vec<Series> = shapes
        .iter()
        .enumerate()
        .map(|(k, shape)| Series::new(format!("y{}", k + 1), x.iter().map(|&v| shape.eval(v)).collect()))
        .collect();

    let truth_idx = rand::seq::index::sample(&mut rng, config.ideal_count, SELECTION_SIZE).into_vec();

    let train_cols: Vec<Series> = truth_idx
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            let values = ideal_cols[k].values.iter().map(|&v| v + noise.sample(&mut rng)).collect();
            Series::new(format!("y{}", i + 1), values)
        })
        .collect();

    let mut test_x = Vec::with_capacity(config.test_count);
    let mut test_y = Vec::with_capacity(config.test_count);
    for _ in 0..config.test_count {
        let row = rng.gen_range(0..config.grid_points);
        let k = truth_idx[rng.gen_range(0..truth_idx.len())];
        test_x.push(x[row]);
        test_y.push(ideal_cols[k].values[row] + noise.sample(&mut rng));
    }

    let truth = truth_idx.iter().map(|&k| ideal_cols[k].name.clone()).collect();

    Ok(Dataset {
        train: Table::new("training", x.clone(), train_cols)?,
        ideal: Table::new("ideal", x, ideal_cols)?,
        test: Table::new("test", test_x, vec![Series::new("y", test_y)])?,
        truth,
    })
}

/// Write `train.csv`, `ideal.csv` and `test.csv` into `dir`.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<DatasetPaths, AppError> {
    let paths = DatasetPaths {
        train: dir.join("train.csv"),
        ideal: dir.join("ideal.csv"),
        test: dir.join("test.csv"),
    };
    write_table_csv(&paths.train, &dataset.train)?;
    write_table_csv(&paths.ideal, &dataset.ideal)?;
    write_table_csv(&paths.test, &dataset.test)?;
    Ok(paths)
}

/// One catalog member.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Line { a: f64, b: f64 },
    Parabola { a: f64, b: f64 },
    Sine { amp: f64, freq: f64, phase: f64 },
    Cubic { a: f64 },
    Sqrt { a: f64, b: f64 },
}

impl Shape {
    fn draw(k: usize, rng: &mut StdRng) -> Self {
        match k % 5 {
            0 => Shape::Line {
                a: rng.gen_range(-3.0..3.0),
                b: rng.gen_range(-10.0..10.0),
            },
            1 => Shape::Parabola {
                a: rng.gen_range(-0.5..0.5),
                b: rng.gen_range(-10.0..10.0),
            },
            2 => Shape::Sine {
                amp: rng.gen_range(0.5..5.0),
                freq: rng.gen_range(0.1..1.0),
                phase: rng.gen_range(0.0..std::f64::consts::TAU),
            },
            3 => Shape::Cubic {
                a: rng.gen_range(-0.01..0.01),
            },
            _ => Shape::Sqrt {
                a: rng.gen_range(-2.0..2.0),
                b: rng.gen_range(-5.0..5.0),
            },
        }
    }

    fn eval(&self, x: f64) -> f64 {
        match *self {
            Shape::Line { a, b } => a * x + b,
            Shape::Parabola { a, b } => a * x * x + b,
            Shape::Sine { amp, freq, phase } => amp * (freq * x + phase).sin(),
            Shape::Cubic { a } => a * x * x * x,
            Shape::Sqrt { a, b } => a * x.abs().sqrt() + b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn dataset_shapes_line_up() {
        let config = DemoConfig {
            grid_points: 50,
            ideal_count: 12,
            test_count: 30,
            ..DemoConfig::default()
        };
        let data = generate_dataset(&config).unwrap();

        assert_eq!(data.train.n_rows(), 50);
        assert_eq!(data.train.n_columns(), SELECTION_SIZE);
        assert_eq!(data.ideal.n_columns(), 12);
        assert_eq!(data.ideal.x, data.train.x);
        assert_eq!(data.test.n_rows(), 30);
        assert_eq!(data.truth.len(), SELECTION_SIZE);
        assert!(data.truth.iter().all(|n| data.ideal.column(n).is_some()));
    }

    #[test]
    fn same_seed_same_dataset() {
        let config = DemoConfig {
            grid_points: 20,
            ideal_count: 8,
            test_count: 10,
            ..DemoConfig::default()
        };
        let a = generate_dataset(&config).unwrap();
        let b = generate_dataset(&config).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.ideal, b.ideal);
        assert_eq!(a.test, b.test);
        assert_eq!(a.truth, b.truth);
    }

    #[test]
    fn tiny_catalog_is_config_error() {
        let config = DemoConfig {
            ideal_count: 3,
            ..DemoConfig::default()
        };
        let err = generate_dataset(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
