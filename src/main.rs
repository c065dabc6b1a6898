//! volume-evo CLI: tunes the blend crossover alpha with a Monte Carlo search
//! and reports the cheapest volume configuration found.
//!
//! Usage:
//!   volume-evo [--config search.json] [--seed 42] [--iterations 100]
//!   RUST_LOG=debug volume-evo --volume-class gp2 --json

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use volume_evo::prelude::*;

#[derive(Parser)]
#[command(name = "volume-evo", version)]
#[command(about = "Search for the cheapest block storage volume configuration")]
struct Args {
    /// JSON search configuration; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Master seed (overrides the configuration file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of Monte Carlo trials (overrides the configuration file)
    #[arg(long)]
    iterations: Option<usize>,

    /// Volume class to price: gp3, gp2, st1 or sc1
    #[arg(long, value_name = "CLASS")]
    volume_class: Option<VolumeClass>,

    /// Re-run the engine with the winning alpha instead of reusing its result
    #[arg(long)]
    confirm: bool,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

/// Machine-readable search report
#[derive(Serialize)]
struct SearchReport {
    seed: u64,
    volume_class: VolumeClass,
    final_run: FinalRun,
    result: SearchResult,
    best_volume_sizes: Option<Vec<f64>>,
    best_cost: Option<f64>,
    completed_trials: usize,
    failed_trials: usize,
}

fn load_config(args: &Args) -> EvoResult<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)?,
        None => SearchConfig::default(),
    };

    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(iterations) = args.iterations {
        config = config.with_iterations(iterations);
    }
    if let Some(class) = args.volume_class {
        config = config.with_volume_class(class);
    }
    if args.confirm {
        config = config.with_final_run(FinalRun::Confirm);
    }

    config.validate()?;
    if config.iterations == 0 {
        return Err(EvolutionError::config(
            "iterations must be positive to produce an answer",
        ));
    }
    Ok(config)
}

fn run(args: &Args) -> EvoResult<()> {
    let config = load_config(args)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, volume_class = %config.pricing.class, "search configured");

    let search = MonteCarloSearch::new(config.clone(), config.pricing)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = search.run(&mut rng)?;

    let report = SearchReport {
        seed,
        volume_class: config.pricing.class,
        final_run: config.final_run,
        result: outcome.result,
        best_volume_sizes: outcome.best.as_ref().map(|i| i.genome.genes().to_vec()),
        best_cost: outcome.final_fitness(),
        completed_trials: outcome.completed_trials,
        failed_trials: outcome.failed_trials,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn print_text(report: &SearchReport) {
    match report.result.alpha {
        Some(alpha) => println!("Best Alpha: {alpha}"),
        None => println!("Best Alpha: none"),
    }
    println!("Corresponding Fitness: {}", report.result.fitness);

    if let Some(sizes) = &report.best_volume_sizes {
        let sizes: Vec<String> = sizes.iter().map(f64::to_string).collect();
        println!("Best Volume Size: {} GB", sizes.join(", "));
    }
    if let Some(cost) = report.best_cost {
        println!("Best Cost: ${cost:.2}");
    }
    if report.failed_trials > 0 {
        println!(
            "Failed Trials: {} of {}",
            report.failed_trials,
            report.failed_trials + report.completed_trials
        );
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "search failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
