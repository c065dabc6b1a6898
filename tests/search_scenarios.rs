//! End-to-end search scenarios

use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use volume_evo::prelude::*;

/// Rewards larger volumes; exercises the maximisation path
struct LargestVolume;

impl CostModel for LargestVolume {
    type Genome = RealVector;

    const OBJECTIVE: Objective = Objective::Maximize;

    fn evaluate(&self, genome: &RealVector) -> Result<f64, EvaluationError> {
        genome.first_gene()
    }
}

#[test]
fn reference_run_finds_cheapest_candidate() {
    let config = SearchConfig::default();
    let search = MonteCarloSearch::new(config, VolumeCostModel::new(VolumeClass::Gp3)).unwrap();
    let outcome = search.run(&mut StdRng::seed_from_u64(2024)).unwrap();

    let alpha = outcome.result.alpha.unwrap();
    assert!((0.0..=1.0).contains(&alpha));
    assert!((outcome.result.fitness - 4.0).abs() < 1e-9);
    assert_eq!(format!("{:.2}", outcome.result.fitness), "4.00");

    let best = outcome.best.unwrap();
    assert_eq!(best.genome.genes(), &[50.0]);
    assert_eq!(outcome.completed_trials, 100);
    assert_eq!(outcome.failed_trials, 0);
}

#[test]
fn engine_run_settles_on_cheapest_candidate() {
    let model = VolumeCostModel::default();
    let config = SearchConfig::default().evolution_config(0.5);
    let ga = SimpleGA::from_config(config, model).unwrap();

    let mut cheapest = 0;
    for seed in 0..20 {
        let result = ga.run(&mut StdRng::seed_from_u64(seed)).unwrap();
        let gene = result.best_genome()[0];
        assert!(gene >= 50.0);
        assert_eq!(result.best_fitness(), Some(model.volume_cost(gene).unwrap()));
        if gene == 50.0 {
            cheapest += 1;
        }
    }

    // A run misses 50 GiB when no individual reached it or the last generation lost it.
    assert!(cheapest >= 15, "only {cheapest} of 20 runs reached 50 GiB");
}

#[test]
fn single_iteration_reports_its_own_trial() {
    let seed = 31;
    let config = SearchConfig::default().with_iterations(1);
    let model = VolumeCostModel::default();

    // The search draws the trial's alpha, then the trial's seed, from the master RNG.
    let mut master = StdRng::seed_from_u64(seed);
    let alpha: f64 = master.gen_range(0.0..=1.0);
    let trial_seed: u64 = master.gen();
    let expected = SimpleGA::from_config(config.evolution_config(alpha), model)
        .unwrap()
        .run(&mut StdRng::seed_from_u64(trial_seed))
        .unwrap();

    let outcome = MonteCarloSearch::new(config, model)
        .unwrap()
        .run(&mut StdRng::seed_from_u64(seed))
        .unwrap();

    assert_eq!(outcome.result.alpha, Some(alpha));
    assert_eq!(Some(outcome.result.fitness), expected.best_fitness());
    assert_eq!(outcome.best, Some(expected.best));
    assert_eq!(outcome.completed_trials, 1);
}

#[test]
fn zero_iterations_returns_sentinel() {
    let outcome = MonteCarloSearch::new(
        SearchConfig::default().with_iterations(0),
        VolumeCostModel::default(),
    )
    .unwrap()
    .run(&mut StdRng::seed_from_u64(0))
    .unwrap();

    assert_eq!(outcome.result.alpha, None);
    assert_eq!(outcome.result.fitness, f64::INFINITY);
    assert!(outcome.best.is_none());
}

#[test]
fn same_master_seed_same_outcome() {
    let config = SearchConfig::default()
        .with_iterations(25)
        .with_domain(GeneDomain::continuous(1.0, 1000.0).unwrap());
    let search = MonteCarloSearch::new(config, VolumeCostModel::default()).unwrap();

    let a = search.run(&mut StdRng::seed_from_u64(77)).unwrap();
    let b = search.run(&mut StdRng::seed_from_u64(77)).unwrap();
    assert_eq!(a.result, b.result);
    assert_eq!(a.best, b.best);
}

#[test]
fn maximising_cost_model_prefers_largest_candidate() {
    let outcome = MonteCarloSearch::new(SearchConfig::default().with_iterations(20), LargestVolume)
        .unwrap()
        .run(&mut StdRng::seed_from_u64(5))
        .unwrap();

    assert_eq!(outcome.result.fitness, 500.0);
    assert_eq!(outcome.best.unwrap().genome.genes(), &[500.0]);
}

#[test]
fn search_result_json_roundtrip() {
    let found = SearchResult {
        alpha: Some(0.42),
        fitness: 4.0,
    };
    let json = serde_json::to_string(&found).unwrap();
    assert_eq!(serde_json::from_str::<SearchResult>(&json).unwrap(), found);

    let sentinel = SearchResult::sentinel();
    let json = serde_json::to_string(&sentinel).unwrap();
    assert_eq!(json, r#"{"alpha":null,"fitness":null}"#);
    assert_eq!(serde_json::from_str::<SearchResult>(&json).unwrap(), sentinel);
}

#[test]
fn config_file_drives_search() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "iterations": 5,
            "generations": 3,
            "domain": {{"discrete": [100, 200, 500]}},
            "pricing": {{"class": "gp2"}},
            "seed": 11
        }}"#
    )
    .unwrap();

    let config = SearchConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.iterations, 5);
    assert_eq!(config.seed, Some(11));

    let seed = config.seed.unwrap();
    let outcome = MonteCarloSearch::new(config.clone(), config.pricing)
        .unwrap()
        .run(&mut StdRng::seed_from_u64(seed))
        .unwrap();

    // Every gene stays in [100, 500], and gp2 charges 0.10 per GiB.
    assert!(outcome.result.fitness >= 10.0 - 1e-9);
    assert!(outcome.result.fitness <= 50.0 + 1e-9);
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SearchConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, EvolutionError::Io(_)));
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"crossover_probability": 2.0}}"#).unwrap();

    let err = SearchConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, EvolutionError::Configuration(_)));
}
