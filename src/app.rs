//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs selection and/or mapping
//! - prints reports/plots
//! - writes CSV / JSON / SVG outputs

use clap::Parser;
use log::info;

use crate::cli::{Command, DemoArgs, MapArgs, PlotArgs, RunArgs, SelectArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ideal` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Select(args) => handle_select(args),
        Command::Map(args) => handle_map(args),
        Command::Plot(args) => handle_plot(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    println!(
        "{}",
        crate::report::format_selection_summary(&run.train, &run.ideal, &run.selection, config.pairing)
    );
    println!("{}", crate::report::format_assignment_summary(&run.summary));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.selection,
            &run.assignments,
            run.train.x_range(),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    let selection_file = crate::io::bundle_selection(
        &run.selection,
        &run.train,
        config.pairing,
        config.tolerance_factor,
    );
    crate::io::write_selection_json(&config.out_dir.join("selection.json"), &selection_file)?;
    crate::io::write_assignments_csv(&config.out_dir.join("assignments.csv"), &run.assignments)?;
    if config.chart {
        crate::chart::write_chart_svg(
            &config.out_dir.join("chart.svg"),
            &run.train,
            &run.selection,
            &run.assignments,
        )?;
    }

    Ok(())
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    let train = crate::io::load_table(&args.train, "training")?;
    let ideal = crate::io::load_table(&args.ideal, "ideal")?;
    let selection = crate::fit::select_best_fit(&train, &ideal, args.pairing)?;

    println!(
        "{}",
        crate::report::format_selection_summary(&train, &ideal, &selection, args.pairing)
    );

    let file = crate::io::bundle_selection(&selection, &train, args.pairing, None);
    crate::io::write_selection_json(&args.out, &file)
}

fn handle_map(args: MapArgs) -> Result<(), AppError> {
    let file = crate::io::read_selection_json(&args.selection)?;
    let opts = pipeline::map_options(args.tolerance_factor.or(file.tolerance_factor))?;
    let observations = crate::io::load_observations(&args.test)?;

    let assignments = crate::map::map_test_points(&observations.points, &file.selection, opts);
    let summary = crate::map::summarize_assignments(&assignments, &file.selection);

    println!("{}", crate::report::format_selection_table(&file.selection));
    println!("{}", crate::report::format_assignment_summary(&summary));
    println!("{}", crate::report::format_assignments(&assignments, args.show));

    crate::io::write_assignments_csv(&args.out, &assignments)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_selection_json(&args.selection)?;

    let assignments = match &args.test {
        Some(path) => {
            let opts = pipeline::map_options(args.tolerance_factor.or(file.tolerance_factor))?;
            let observations = crate::io::load_observations(path)?;
            crate::map::map_test_points(&observations.points, &file.selection, opts)
        }
        None => Vec::new(),
    };

    let plot = crate::plot::render_ascii_plot(
        &file.selection,
        &assignments,
        file.x_range.map(|[lo, hi]| (lo, hi)),
        args.width,
        args.height,
    );
    println!("{plot}");
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = crate::data::DemoConfig {
        seed: args.seed,
        grid_points: args.grid_points,
        ideal_count: args.ideal_count,
        test_count: args.test_count,
        noise_sd: args.noise_sd,
        ..crate::data::DemoConfig::default()
    };
    let dataset = crate::data::generate_dataset(&config)?;
    let paths = crate::data::write_dataset(&args.out_dir, &dataset)?;

    info!("Training series were drawn from: {}", dataset.truth.join(", "));
    println!(
        "Wrote {}, {}, {}",
        paths.train.display(),
        paths.ideal.display(),
        paths.test.display()
    );
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        train_path: args.train.clone(),
        ideal_path: args.ideal.clone(),
        test_path: args.test.clone(),
        out_dir: args.out_dir.clone(),
        pairing: args.pairing,
        tolerance_factor: args.tolerance_factor,
        chart: !args.no_chart,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}
