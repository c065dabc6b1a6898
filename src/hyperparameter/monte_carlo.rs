//! Monte Carlo search over the blend crossover alpha
//!
//! Each trial samples `alpha ~ U[0, 1]`, runs a fresh engine with it, and
//! reports the best member of its final population. The search keeps the alpha with
//! the strictly best fitness; ties go to the earlier trial.
//!
//! Every trial owns an RNG seeded from the master RNG in trial order, so a
//! search is reproducible from its master seed whether the trials run one
//! after another or on the rayon pool.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::algorithms::simple_ga::SimpleGA;
use crate::config::SearchConfig;
use crate::diagnostics::EvolutionResult;
use crate::error::EvolutionError;
use crate::fitness::traits::{CostModel, Objective};
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;

/// How the final answer is produced once every trial has run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalRun {
    /// Return the winning trial's own best individual
    #[default]
    ReuseBest,
    /// Run the engine once more with the winning alpha and return that run's
    /// best individual. The re-run is stochastic and need not reproduce the
    /// winning fitness.
    Confirm,
}

/// Best alpha found and the fitness it achieved
///
/// Starts as the sentinel `(None, +∞)` and only changes on strict
/// improvement. An infinite fitness is written to JSON as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Winning alpha, `None` if no trial completed
    pub alpha: Option<f64>,
    /// Best fitness of the winning trial
    #[serde(with = "infinite_as_null")]
    pub fitness: f64,
}

impl SearchResult {
    /// Result before any trial has completed
    pub fn sentinel() -> Self {
        Self {
            alpha: None,
            fitness: f64::INFINITY,
        }
    }

    /// Returns true if no trial ever improved on the sentinel
    pub fn is_sentinel(&self) -> bool {
        self.alpha.is_none()
    }

    /// Record a trial; returns true if it became the new best
    pub fn offer(&mut self, alpha: f64, fitness: f64, objective: Objective) -> bool {
        let improves = match self.alpha {
            None => fitness.is_finite(),
            Some(_) => objective.is_better(fitness, self.fitness),
        };
        if improves {
            self.alpha = Some(alpha);
            self.fitness = fitness;
        }
        improves
    }
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::sentinel()
    }
}

mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Everything a search produced
#[derive(Debug, Clone)]
pub struct SearchOutcome<G>
where
    G: EvolutionaryGenome,
{
    /// Winning alpha and its fitness
    pub result: SearchResult,
    /// Final best individual, chosen according to the [`FinalRun`] policy
    pub best: Option<Individual<G>>,
    /// Trials that ran to completion
    pub completed_trials: usize,
    /// Trials aborted by a cost model or operator failure
    pub failed_trials: usize,
}

impl<G> SearchOutcome<G>
where
    G: EvolutionaryGenome,
{
    /// Fitness of the final best individual
    pub fn final_fitness(&self) -> Option<f64> {
        self.best.as_ref().and_then(|i| i.fitness)
    }
}

/// One trial's plan and what came of it
///
/// Only the best individual survives a trial; its population and statistics
/// are dropped as soon as the engine returns.
struct TrialReport<G>
where
    G: EvolutionaryGenome,
{
    trial: usize,
    alpha: f64,
    outcome: Result<Individual<G>, EvolutionError>,
}

/// Running reduction over trial reports, fed in trial order
struct Tally<G>
where
    G: EvolutionaryGenome,
{
    objective: Objective,
    result: SearchResult,
    best: Option<Individual<G>>,
    completed_trials: usize,
    failed_trials: usize,
}

impl<G> Tally<G>
where
    G: EvolutionaryGenome,
{
    fn new(objective: Objective) -> Self {
        Self {
            objective,
            result: SearchResult::sentinel(),
            best: None,
            completed_trials: 0,
            failed_trials: 0,
        }
    }

    /// Fold one report in; errors that are not local to the trial abort the search
    fn record(&mut self, report: TrialReport<G>) -> Result<(), EvolutionError> {
        match report.outcome {
            Ok(best) => {
                self.completed_trials += 1;
                let fitness = best.fitness.unwrap_or_else(|| self.objective.worst_value());
                tracing::debug!(
                    trial = report.trial,
                    alpha = report.alpha,
                    fitness,
                    "trial complete"
                );

                if self.result.offer(report.alpha, fitness, self.objective) {
                    tracing::info!(
                        trial = report.trial,
                        alpha = report.alpha,
                        fitness,
                        "new best alpha"
                    );
                    self.best = Some(best);
                }
                Ok(())
            }
            Err(e) if e.is_trial_local() => {
                self.failed_trials += 1;
                tracing::warn!(
                    trial = report.trial,
                    alpha = report.alpha,
                    error = %e,
                    "trial failed"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Monte Carlo search over the blend alpha
pub struct MonteCarloSearch<Cost> {
    config: SearchConfig,
    cost_model: Cost,
}

impl<Cost> MonteCarloSearch<Cost>
where
    Cost: CostModel,
{
    /// Create a search, validating the configuration
    pub fn new(config: SearchConfig, cost_model: Cost) -> Result<Self, EvolutionError> {
        config.validate()?;
        Ok(Self { config, cost_model })
    }

    /// The configuration this search runs with
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run every trial, then produce the final answer
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<SearchOutcome<Cost::Genome>, EvolutionError> {
        // Draw every trial's alpha and seed up front, in trial order.
        let plans: Vec<(f64, u64)> = (0..self.config.iterations)
            .map(|_| (rng.gen_range(0.0..=1.0), rng.gen()))
            .collect();

        tracing::info!(
            iterations = plans.len(),
            parallel = self.config.parallel_trials,
            "starting Monte Carlo search"
        );

        let mut tally = Tally::new(Cost::OBJECTIVE);
        self.run_trials(&plans, &mut tally)?;
        let Tally {
            result,
            best,
            completed_trials,
            failed_trials,
            ..
        } = tally;

        tracing::info!(
            alpha = ?result.alpha,
            fitness = result.fitness,
            completed_trials,
            failed_trials,
            "Monte Carlo search finished"
        );

        let best = match (self.config.final_run, result.alpha) {
            (FinalRun::Confirm, Some(alpha)) => {
                tracing::info!(alpha, "confirmation run");
                let confirmation = self.run_engine(alpha, rng)?;
                tracing::info!(
                    fitness = ?confirmation.best_fitness(),
                    recorded = result.fitness,
                    "confirmation run finished"
                );
                Some(confirmation.best)
            }
            _ => best,
        };

        Ok(SearchOutcome {
            result,
            best,
            completed_trials,
            failed_trials,
        })
    }

    fn run_engine<R: Rng>(
        &self,
        alpha: f64,
        rng: &mut R,
    ) -> Result<EvolutionResult<Cost::Genome>, EvolutionError> {
        SimpleGA::from_config(self.config.evolution_config(alpha), &self.cost_model)?.run(rng)
    }

    fn run_trial(&self, trial: usize, alpha: f64, seed: u64) -> TrialReport<Cost::Genome> {
        let mut rng = StdRng::seed_from_u64(seed);
        TrialReport {
            trial,
            alpha,
            outcome: self.run_engine(alpha, &mut rng).map(|result| result.best),
        }
    }

    #[cfg(feature = "parallel")]
    fn run_trials(
        &self,
        plans: &[(f64, u64)],
        tally: &mut Tally<Cost::Genome>,
    ) -> Result<(), EvolutionError> {
        if !self.config.parallel_trials {
            return self.run_trials_sequential(plans, tally);
        }

        // Indexed collect keeps trial order.
        let reports: Vec<TrialReport<Cost::Genome>> = plans
            .par_iter()
            .enumerate()
            .map(|(trial, &(alpha, seed))| self.run_trial(trial, alpha, seed))
            .collect();
        reports.into_iter().try_for_each(|report| tally.record(report))
    }

    #[cfg(not(feature = "parallel"))]
    fn run_trials(
        &self,
        plans: &[(f64, u64)],
        tally: &mut Tally<Cost::Genome>,
    ) -> Result<(), EvolutionError> {
        self.run_trials_sequential(plans, tally)
    }

    fn run_trials_sequential(
        &self,
        plans: &[(f64, u64)],
        tally: &mut Tally<Cost::Genome>,
    ) -> Result<(), EvolutionError> {
        plans
            .iter()
            .enumerate()
            .try_for_each(|(trial, &(alpha, seed))| tally.record(self.run_trial(trial, alpha, seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use crate::fitness::pricing::VolumeCostModel;
    use crate::fitness::traits::FnCostModel;
    use crate::genome::real_vector::RealVector;

    fn search(config: SearchConfig) -> MonteCarloSearch<VolumeCostModel> {
        MonteCarloSearch::new(config, VolumeCostModel::default()).unwrap()
    }

    #[test]
    fn test_sentinel() {
        let result = SearchResult::default();
        assert!(result.is_sentinel());
        assert_eq!(result.alpha, None);
        assert_eq!(result.fitness, f64::INFINITY);
    }

    #[test]
    fn test_offer_requires_strict_improvement() {
        let mut result = SearchResult::sentinel();

        assert!(result.offer(0.3, 19.0, Objective::Minimize));
        assert!(!result.offer(0.6, 19.0, Objective::Minimize));
        assert!(!result.offer(0.7, 55.0, Objective::Minimize));
        assert!(result.offer(0.9, 4.0, Objective::Minimize));

        assert_eq!(result.alpha, Some(0.9));
        assert_eq!(result.fitness, 4.0);
    }

    #[test]
    fn test_sentinel_serializes_as_null() {
        let json = serde_json::to_string(&SearchResult::sentinel()).unwrap();
        assert_eq!(json, r#"{"alpha":null,"fitness":null}"#);

        let back: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SearchResult::sentinel());
    }

    #[test]
    fn test_zero_iterations_returns_sentinel() {
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = search(SearchConfig::default().with_iterations(0))
            .run(&mut rng)
            .unwrap();

        assert!(outcome.result.is_sentinel());
        assert!(outcome.best.is_none());
        assert_eq!(outcome.completed_trials, 0);
        assert_eq!(outcome.failed_trials, 0);
    }

    #[test]
    fn test_parallel_and_sequential_trials_agree() {
        let config = SearchConfig::default().with_iterations(20);
        let sequential = search(config.clone().with_parallel_trials(false))
            .run(&mut StdRng::seed_from_u64(2))
            .unwrap();
        let parallel = search(config.with_parallel_trials(true))
            .run(&mut StdRng::seed_from_u64(2))
            .unwrap();

        assert_eq!(sequential.result, parallel.result);
        assert_eq!(sequential.best, parallel.best);
    }

    #[test]
    fn test_reuse_best_reports_recorded_fitness() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = search(SearchConfig::default().with_iterations(10))
            .run(&mut rng)
            .unwrap();

        assert_eq!(outcome.completed_trials, 10);
        assert_eq!(outcome.final_fitness(), Some(outcome.result.fitness));
    }

    #[test]
    fn test_confirm_reruns_winning_alpha() {
        let mut rng = StdRng::seed_from_u64(4);
        let outcome = search(
            SearchConfig::default()
                .with_iterations(5)
                .with_final_run(FinalRun::Confirm),
        )
        .run(&mut rng)
        .unwrap();

        assert!(outcome.result.alpha.is_some());
        // The confirmation run is a fresh stochastic run; it only has to produce an answer.
        assert!(outcome.final_fitness().is_some());
    }

    #[test]
    fn test_failed_trials_are_counted_and_skipped() {
        let mut rng = StdRng::seed_from_u64(5);
        let model = FnCostModel::new(|_: &RealVector| {
            Err(EvaluationError::Failed("pricing service unavailable".to_string()))
        });
        let outcome = MonteCarloSearch::new(SearchConfig::default().with_iterations(4), model)
            .unwrap()
            .run(&mut rng)
            .unwrap();

        assert_eq!(outcome.failed_trials, 4);
        assert_eq!(outcome.completed_trials, 0);
        assert!(outcome.result.is_sentinel());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = MonteCarloSearch::new(
            SearchConfig::default().with_population_size(0),
            VolumeCostModel::default(),
        );
        assert!(matches!(result, Err(EvolutionError::Configuration(_))));
    }

    fn report(trial: usize, alpha: f64, fitness: f64) -> TrialReport<RealVector> {
        TrialReport {
            trial,
            alpha,
            outcome: Ok(Individual::with_fitness(RealVector::new(vec![fitness]), fitness)),
        }
    }

    #[test]
    fn test_tally_keeps_only_the_winner() {
        let mut tally = Tally::new(Objective::Minimize);
        tally.record(report(0, 0.2, 19.0)).unwrap();
        tally.record(report(1, 0.4, 4.0)).unwrap();
        tally.record(report(2, 0.6, 4.0)).unwrap();
        tally
            .record(TrialReport {
                trial: 3,
                alpha: 0.8,
                outcome: Err(EvaluationError::Failed("timeout".to_string()).into()),
            })
            .unwrap();

        assert_eq!(tally.result.alpha, Some(0.4));
        assert_eq!(tally.best.unwrap().fitness, Some(4.0));
        assert_eq!(tally.completed_trials, 3);
        assert_eq!(tally.failed_trials, 1);
    }

    #[test]
    fn test_tally_stops_on_search_level_error() {
        let mut tally: Tally<RealVector> = Tally::new(Objective::Minimize);
        let err = tally
            .record(TrialReport {
                trial: 0,
                alpha: 0.5,
                outcome: Err(EvolutionError::config("bad domain")),
            })
            .unwrap_err();
        assert!(matches!(err, EvolutionError::Configuration(_)));
    }

    #[test]
    fn test_winning_best_comes_from_a_final_population() {
        let config = SearchConfig::default().with_iterations(1);
        let mut master = StdRng::seed_from_u64(6);
        let alpha: f64 = master.gen_range(0.0..=1.0);
        let trial_seed: u64 = master.gen();
        let expected = SimpleGA::from_config(config.evolution_config(alpha), VolumeCostModel::default())
            .unwrap()
            .run(&mut StdRng::seed_from_u64(trial_seed))
            .unwrap();

        let outcome = search(config).run(&mut StdRng::seed_from_u64(6)).unwrap();
        let best = outcome.best.unwrap();
        assert!(expected.population.iter().any(|i| i == &best));
    }
}
