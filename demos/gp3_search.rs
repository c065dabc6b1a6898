//! gp3 Volume Search
//!
//! This example steps a single engine run generation by generation, then
//! tunes the blend alpha with a Monte Carlo search over a continuous range
//! of volume sizes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use volume_evo::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== gp3 Volume Search ===\n");

    single_run()?;
    println!();
    alpha_search()?;

    Ok(())
}

fn single_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(42);

    let config = EvolutionConfig {
        population_size: 20,
        generations: 10,
        alpha: 0.5,
        ..EvolutionConfig::default()
    };
    let ga = SimpleGA::from_config(config, VolumeCostModel::new(VolumeClass::Gp3))?;

    let mut evolution = ga.start(&mut rng)?;
    println!("Initial best: {:?}", evolution.best().fitness);

    while evolution.step()? != EngineState::Converged {
        println!(
            "Generation {:2}: best so far ${:.2}",
            evolution.generation(),
            evolution.best().fitness.unwrap_or(f64::INFINITY)
        );
    }

    let result = evolution.finish();
    println!("\n{}", result.stats.summary(Objective::Minimize));
    println!(
        "Best volume: {:?} GB at ${:.2}",
        result.best_genome().genes(),
        result.best_fitness().unwrap_or(f64::INFINITY)
    );

    Ok(())
}

fn alpha_search() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(7);

    let config = SearchConfig::default()
        .with_domain(GeneDomain::continuous(1.0, 16384.0)?)
        .with_population_size(30)
        .with_generations(20)
        .with_mutation(MutationParams {
            mu: 0.0,
            sigma: 50.0,
            indpb: 0.5,
        })
        .with_iterations(50);

    let search = MonteCarloSearch::new(config, VolumeCostModel::new(VolumeClass::Gp3))?;
    let outcome = search.run(&mut rng)?;

    println!(
        "Best alpha: {:?} (fitness {:.4})",
        outcome.result.alpha, outcome.result.fitness
    );
    if let Some(best) = &outcome.best {
        println!("Best volume: {:.1} GB", best.genome[0]);
    }
    println!(
        "Trials: {} completed, {} failed",
        outcome.completed_trials, outcome.failed_trials
    );

    Ok(())
}
