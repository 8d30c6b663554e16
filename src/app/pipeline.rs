//! Shared selection + mapping pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load tables -> select ideal functions -> map test points -> summarize
//!
//! The subcommands can then focus on presentation and outputs.

use crate::domain::{Assignment, ObservationTable, PairingMode, RunConfig, SelectionSet, Table};
use crate::error::AppError;
use crate::fit::select_best_fit;
use crate::io::{load_observations, load_table};
use crate::map::{AssignmentSummary, MapOptions, map_test_points, summarize_assignments};

/// All computed outputs of a single `ideal run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub train: Table,
    pub ideal: Table,
    pub observations: ObservationTable,
    pub selection: SelectionSet,
    pub assignments: Vec<Assignment>,
    pub summary: AssignmentSummary,
}

/// Load every input and run selection followed by mapping.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let opts = map_options(config.tolerance_factor)?;

    let train = load_table(&config.train_path, "training")?;
    let ideal = load_table(&config.ideal_path, "ideal")?;
    let observations = load_observations(&config.test_path)?;

    run_pipeline_with_tables(train, ideal, observations, config.pairing, opts)
}

/// Run selection and mapping on already loaded tables.
pub fn run_pipeline_with_tables(
    train: Table,
    ideal: Table,
    observations: ObservationTable,
    pairing: PairingMode,
    opts: MapOptions,
) -> Result<RunOutput, AppError> {
    let selection = select_best_fit(&train, &ideal, pairing)?;
    let assignments = map_test_points(&observations.points, &selection, opts);
    let summary = summarize_assignments(&assignments, &selection);

    Ok(RunOutput {
        train,
        ideal,
        observations,
        selection,
        assignments,
        summary,
    })
}

/// Validate a tolerance factor flag.
pub fn map_options(tolerance_factor: Option<f64>) -> Result<MapOptions, AppError> {
    if let Some(f) = tolerance_factor {
        if !(f.is_finite() && f >= 0.0) {
            return Err(AppError::config(format!(
                "Invalid tolerance factor {f}: must be finite and >= 0."
            )));
        }
    }
    Ok(MapOptions { tolerance_factor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DemoConfig, generate_dataset};
    use crate::domain::Observation;
    use crate::error::ErrorKind;

    fn observations_from(test: &Table) -> ObservationTable {
        let y = &test.columns[0].values;
        ObservationTable {
            points: test
                .x
                .iter()
                .zip(y)
                .enumerate()
                .map(|(i, (&x, &y))| Observation::new(i + 2, x, y))
                .collect(),
            row_errors: Vec::new(),
        }
    }

    #[test]
    fn synthetic_dataset_runs_end_to_end() {
        let data = generate_dataset(&DemoConfig {
            grid_points: 200,
            ideal_count: 30,
            test_count: 60,
            noise_sd: 0.05,
            ..DemoConfig::default()
        })
        .unwrap();
        let observations = observations_from(&data.test);

        let run = run_pipeline_with_tables(
            data.train.clone(),
            data.ideal.clone(),
            observations,
            PairingMode::BestMatch,
            MapOptions::default(),
        )
        .unwrap();

        assert_eq!(run.selection.len(), 4);
        assert_eq!(run.assignments.len(), data.test.n_rows());
        assert_eq!(run.summary.unassigned, 0);
        for fit in &run.selection {
            assert!(fit.train_mse >= 0.0);
        }
    }

    #[test]
    fn invalid_tolerance_is_config_error() {
        let err = map_options(Some(-1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(map_options(Some(f64::NAN)).is_err());
        assert_eq!(map_options(None).unwrap(), MapOptions::default());
    }
}
