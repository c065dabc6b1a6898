//! Simple Genetic Algorithm
//!
//! This module implements a standard generational genetic algorithm: every
//! generation, `N` parents are chosen by selection, consecutive pairs are
//! crossed with probability `crossover_probability`, each offspring is mutated
//! with probability `mutation_probability`, the offspring whose genes changed
//! are re-evaluated, and the offspring replace the whole population.
//!
//! A run moves through three states. [`EngineState::Initialized`] holds the
//! evaluated initial population; each [`Evolution::step`] produces one
//! generation and moves to [`EngineState::Evolving`]; once the configured
//! number of generations has elapsed the run is [`EngineState::Converged`].

use rand::Rng;

use crate::config::MutationParams;
use crate::diagnostics::{EvolutionResult, EvolutionStats, GenerationStats};
use crate::error::EvolutionError;
use crate::fitness::traits::CostModel;
use crate::genome::domain::{GeneDomain, RepairPolicy};
use crate::operators::crossover::BlendCrossover;
use crate::operators::mutation::GaussianMutation;
use crate::operators::selection::TournamentSelection;
use crate::operators::traits::{
    CrossoverOperator, DomainGuard, MutationOperator, SelectionOperator,
};
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Check that a probability lies in `[0, 1]`
pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), EvolutionError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvolutionError::config(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

/// Configuration of one engine run
///
/// Built fresh for every trial and never changed while the run is in
/// progress.
#[derive(Clone, Debug, PartialEq)]
pub struct EvolutionConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations to run
    pub generations: usize,
    /// Genes per individual
    pub gene_count: usize,
    /// Crossover probability per pair of parents
    pub crossover_probability: f64,
    /// Mutation probability per offspring
    pub mutation_probability: f64,
    /// Tournament size used by [`SimpleGA::from_config`]
    pub tournament_size: usize,
    /// Blend alpha used by [`SimpleGA::from_config`]
    pub alpha: f64,
    /// Gaussian mutation parameters used by [`SimpleGA::from_config`]
    pub mutation: MutationParams,
    /// Valid gene values
    pub domain: GeneDomain,
    /// Repair applied to out-of-domain operator output
    pub repair: RepairPolicy,
    /// Whether to evaluate in parallel
    pub parallel_evaluation: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 5,
            gene_count: 1,
            crossover_probability: 0.7,
            mutation_probability: 0.2,
            tournament_size: 3,
            alpha: 0.5,
            mutation: MutationParams::default(),
            domain: GeneDomain::default(),
            repair: RepairPolicy::default(),
            parallel_evaluation: false,
        }
    }
}

impl EvolutionConfig {
    /// Check every setting, reporting the first problem found
    pub fn validate(&self) -> Result<(), EvolutionError> {
        if self.population_size == 0 {
            return Err(EvolutionError::config("population size must be positive"));
        }
        if self.generations == 0 {
            return Err(EvolutionError::config("generation count must be positive"));
        }
        if self.gene_count == 0 {
            return Err(EvolutionError::config("gene count must be positive"));
        }
        if self.tournament_size == 0 {
            return Err(EvolutionError::config("tournament size must be positive"));
        }
        check_probability("crossover probability", self.crossover_probability)?;
        check_probability("mutation probability", self.mutation_probability)?;
        check_probability("blend alpha", self.alpha)?;
        self.mutation.validate()?;
        self.domain.validate()
    }
}

/// Lifecycle of an engine run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Initial population created and evaluated
    Initialized,
    /// At least one generation produced, more to come
    Evolving,
    /// All configured generations produced
    Converged,
}

/// Builder for SimpleGA
pub struct SimpleGABuilder<Cost, S, X, M> {
    config: EvolutionConfig,
    cost_model: Option<Cost>,
    selection: Option<S>,
    crossover: Option<X>,
    mutation: Option<M>,
}

impl SimpleGABuilder<(), (), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EvolutionConfig::default(),
            cost_model: None,
            selection: None,
            crossover: None,
            mutation: None,
        }
    }
}

impl Default for SimpleGABuilder<(), (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cost, S, X, M> SimpleGABuilder<Cost, S, X, M> {
    /// Replace the whole configuration
    pub fn config(mut self, config: EvolutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the number of generations
    pub fn generations(mut self, generations: usize) -> Self {
        self.config.generations = generations;
        self
    }

    /// Set the number of genes per individual
    pub fn gene_count(mut self, gene_count: usize) -> Self {
        self.config.gene_count = gene_count;
        self
    }

    /// Set the crossover probability
    pub fn crossover_probability(mut self, probability: f64) -> Self {
        self.config.crossover_probability = probability;
        self
    }

    /// Set the mutation probability
    pub fn mutation_probability(mut self, probability: f64) -> Self {
        self.config.mutation_probability = probability;
        self
    }

    /// Set the gene domain
    pub fn domain(mut self, domain: GeneDomain) -> Self {
        self.config.domain = domain;
        self
    }

    /// Set the repair policy
    pub fn repair(mut self, repair: RepairPolicy) -> Self {
        self.config.repair = repair;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Set the cost model
    pub fn cost_model<NewCost>(self, cost_model: NewCost) -> SimpleGABuilder<NewCost, S, X, M>
    where
        NewCost: CostModel,
    {
        SimpleGABuilder {
            config: self.config,
            cost_model: Some(cost_model),
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
        }
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> SimpleGABuilder<Cost, NewS, X, M> {
        SimpleGABuilder {
            config: self.config,
            cost_model: self.cost_model,
            selection: Some(selection),
            crossover: self.crossover,
            mutation: self.mutation,
        }
    }

    /// Set the crossover operator
    pub fn crossover<NewX>(self, crossover: NewX) -> SimpleGABuilder<Cost, S, NewX, M> {
        SimpleGABuilder {
            config: self.config,
            cost_model: self.cost_model,
            selection: self.selection,
            crossover: Some(crossover),
            mutation: self.mutation,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> SimpleGABuilder<Cost, S, X, NewM> {
        SimpleGABuilder {
            config: self.config,
            cost_model: self.cost_model,
            selection: self.selection,
            crossover: self.crossover,
            mutation: Some(mutation),
        }
    }
}

impl<Cost, S, X, M> SimpleGABuilder<Cost, S, X, M>
where
    Cost: CostModel,
    S: SelectionOperator<Cost::Genome>,
    X: CrossoverOperator<Cost::Genome>,
    M: MutationOperator<Cost::Genome>,
{
    /// Build the SimpleGA instance
    pub fn build(self) -> Result<SimpleGA<Cost, S, X, M>, EvolutionError> {
        self.config.validate()?;

        let cost_model = self
            .cost_model
            .ok_or_else(|| EvolutionError::config("Cost model must be specified"))?;

        let selection = self
            .selection
            .ok_or_else(|| EvolutionError::config("Selection operator must be specified"))?;

        let crossover = self
            .crossover
            .ok_or_else(|| EvolutionError::config("Crossover operator must be specified"))?;

        let mutation = self
            .mutation
            .ok_or_else(|| EvolutionError::config("Mutation operator must be specified"))?;

        Ok(SimpleGA {
            config: self.config,
            cost_model,
            selection,
            crossover,
            mutation,
        })
    }
}

/// Simple Genetic Algorithm
///
/// A generational GA with configurable operators. The usual instance uses
/// tournament selection, blend crossover and Gaussian mutation, built from an
/// [`EvolutionConfig`] with [`SimpleGA::from_config`].
pub struct SimpleGA<Cost, S = TournamentSelection, X = BlendCrossover, M = GaussianMutation> {
    config: EvolutionConfig,
    cost_model: Cost,
    selection: S,
    crossover: X,
    mutation: M,
}

impl<Cost> SimpleGA<Cost>
where
    Cost: CostModel,
{
    /// Build the standard engine for `config`
    pub fn from_config(config: EvolutionConfig, cost_model: Cost) -> Result<Self, EvolutionError> {
        config.validate()?;
        let selection = TournamentSelection::new(config.tournament_size);
        let crossover = BlendCrossover::try_new(config.alpha)?;
        let mutation =
            GaussianMutation::try_new(config.mutation.mu, config.mutation.sigma, config.mutation.indpb)?;

        SimpleGABuilder::new()
            .config(config)
            .cost_model(cost_model)
            .selection(selection)
            .crossover(crossover)
            .mutation(mutation)
            .build()
    }
}

impl<Cost, S, X, M> SimpleGA<Cost, S, X, M>
where
    Cost: CostModel,
    S: SelectionOperator<Cost::Genome>,
    X: CrossoverOperator<Cost::Genome>,
    M: MutationOperator<Cost::Genome>,
{
    /// The configuration this engine runs with
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// The cost model this engine minimises (or maximises)
    pub fn cost_model(&self) -> &Cost {
        &self.cost_model
    }

    /// Create and evaluate the initial population
    pub fn start<'a, R: Rng>(
        &'a self,
        rng: &'a mut R,
    ) -> Result<Evolution<'a, Cost, S, X, M, R>, EvolutionError> {
        let objective = Cost::OBJECTIVE;
        let mut population = Population::initialize(
            self.config.population_size,
            self.config.gene_count,
            &self.config.domain,
            rng,
        )?;
        let evaluations = self.evaluate(&mut population)?;

        let best = population
            .best(objective)
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();

        let mut stats = EvolutionStats::new();
        stats.record(GenerationStats::from_population(
            &population,
            objective,
            0,
            evaluations,
        ));

        tracing::debug!(
            population = population.len(),
            best = ?best.fitness,
            "initial population evaluated"
        );

        Ok(Evolution {
            engine: self,
            rng,
            population,
            best,
            stats,
            evaluations,
            state: EngineState::Initialized,
        })
    }

    /// Run the genetic algorithm to completion
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<EvolutionResult<Cost::Genome>, EvolutionError> {
        self.start(rng)?.run()
    }

    fn evaluate(&self, population: &mut Population<Cost::Genome>) -> Result<usize, EvolutionError> {
        let evaluated = if self.config.parallel_evaluation {
            population.evaluate_parallel(&self.cost_model)?
        } else {
            population.evaluate(&self.cost_model)?
        };
        Ok(evaluated)
    }
}

/// An engine run in progress
pub struct Evolution<'a, Cost, S, X, M, R>
where
    Cost: CostModel,
{
    engine: &'a SimpleGA<Cost, S, X, M>,
    rng: &'a mut R,
    population: Population<Cost::Genome>,
    best: Individual<Cost::Genome>,
    stats: EvolutionStats,
    evaluations: usize,
    state: EngineState,
}

impl<Cost, S, X, M, R> Evolution<'_, Cost, S, X, M, R>
where
    Cost: CostModel,
    S: SelectionOperator<Cost::Genome>,
    X: CrossoverOperator<Cost::Genome>,
    M: MutationOperator<Cost::Genome>,
    R: Rng,
{
    /// Current state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Generations produced so far
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Current population
    pub fn population(&self) -> &Population<Cost::Genome> {
        &self.population
    }

    /// Best individual seen so far
    pub fn best(&self) -> &Individual<Cost::Genome> {
        &self.best
    }

    /// Cost model calls so far
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Produce one generation
    ///
    /// Does nothing once the run has converged. A cost model failure aborts
    /// the run; the population is left as it was before the step.
    pub fn step(&mut self) -> Result<EngineState, EvolutionError> {
        if self.state == EngineState::Converged {
            return Ok(self.state);
        }

        let engine = self.engine;
        let config = &engine.config;
        let rng = &mut *self.rng;
        let objective = Cost::OBJECTIVE;
        let guard = DomainGuard::new(&config.domain, config.repair);
        let generation = self.population.generation() + 1;

        // Selection: offspring start as clones of the chosen parents, fitness included.
        // Pool indices match population indices because every individual is evaluated.
        let pool = self.population.as_fitness_pairs();
        let mut offspring: Vec<Individual<Cost::Genome>> = engine
            .selection
            .select_many(&pool, objective, config.population_size, rng)
            .into_iter()
            .map(|idx| self.population[idx].clone())
            .collect();

        let mut repairs = 0;

        // Crossover on consecutive pairs; an odd last offspring passes through
        for pair in offspring.chunks_exact_mut(2) {
            if rng.gen::<f64>() < config.crossover_probability {
                let result =
                    engine
                        .crossover
                        .crossover(&pair[0].genome, &pair[1].genome, guard, rng);
                repairs += result.repair_info().map_or(0, |info| info.count());
                let (child1, child2) = result.into_result()?;
                pair[0] = Individual::with_generation(child1, generation);
                pair[1] = Individual::with_generation(child2, generation);
            }
        }

        // Mutation
        for individual in offspring.iter_mut() {
            if rng.gen::<f64>() < config.mutation_probability {
                if let Some(info) = engine.mutation.mutate(individual.genome_mut(), guard, rng)
                {
                    repairs += info.count();
                }
                individual.invalidate_fitness();
                individual.birth_generation = generation;
            }
        }

        let mut next = Population::from_individuals(offspring);
        next.set_generation(generation);
        self.evaluations += engine.evaluate(&mut next)?;

        if let Some(candidate) = next.best(objective) {
            if candidate.is_better_than(&self.best, objective) {
                self.best = candidate.clone();
            }
        }

        let gen_stats =
            GenerationStats::from_population(&next, objective, generation, self.evaluations)
                .with_repairs(repairs);
        tracing::debug!(
            generation,
            best = gen_stats.best_fitness,
            mean = gen_stats.mean_fitness,
            diversity = gen_stats.diversity,
            repairs,
            "generation complete"
        );
        self.stats.record(gen_stats);
        self.population = next;

        self.state = if generation >= config.generations {
            EngineState::Converged
        } else {
            EngineState::Evolving
        };
        Ok(self.state)
    }

    /// Step until converged and return the result
    pub fn run(mut self) -> Result<EvolutionResult<Cost::Genome>, EvolutionError> {
        while self.step()? != EngineState::Converged {}
        Ok(self.finish())
    }

    /// Stop the run and return what it produced so far
    ///
    /// The reported best is the best member of the current population.
    pub fn finish(self) -> EvolutionResult<Cost::Genome> {
        // Every population the engine keeps is non-empty and evaluated.
        let best = self
            .population
            .best(Cost::OBJECTIVE)
            .cloned()
            .unwrap_or_else(|| self.best.clone());
        EvolutionResult {
            best,
            best_ever: self.best,
            generations: self.population.generation(),
            population: self.population,
            evaluations: self.evaluations,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use crate::fitness::pricing::VolumeCostModel;
    use crate::fitness::traits::{FnCostModel, Objective};
    use crate::genome::real_vector::RealVector;
    use crate::genome::traits::EvolutionaryGenome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine(config: EvolutionConfig) -> SimpleGA<VolumeCostModel> {
        SimpleGA::from_config(config, VolumeCostModel::default()).unwrap()
    }

    #[test]
    fn test_state_machine() {
        let mut rng = StdRng::seed_from_u64(42);
        let ga = engine(EvolutionConfig {
            generations: 3,
            ..EvolutionConfig::default()
        });

        let mut evolution = ga.start(&mut rng).unwrap();
        assert_eq!(evolution.state(), EngineState::Initialized);
        assert_eq!(evolution.generation(), 0);
        assert!(evolution.population().all_evaluated());

        assert_eq!(evolution.step().unwrap(), EngineState::Evolving);
        assert_eq!(evolution.step().unwrap(), EngineState::Evolving);
        assert_eq!(evolution.step().unwrap(), EngineState::Converged);
        assert_eq!(evolution.generation(), 3);

        // Stepping a converged run changes nothing
        let population = evolution.population().clone();
        assert_eq!(evolution.step().unwrap(), EngineState::Converged);
        assert_eq!(evolution.generation(), 3);
        assert_eq!(
            evolution.population().individuals(),
            population.individuals()
        );
    }

    #[test]
    fn test_run_result() {
        let mut rng = StdRng::seed_from_u64(7);
        let ga = engine(EvolutionConfig::default());
        let result = ga.run(&mut rng).unwrap();

        assert_eq!(result.generations, 5);
        assert_eq!(result.population.len(), 10);
        assert!(result.population.all_evaluated());
        assert_eq!(result.stats.num_generations(), 6);
        assert!(result.evaluations >= 10);

        let final_best = result.population.best(Objective::Minimize).unwrap();
        assert_eq!(&result.best, final_best);
        assert_eq!(result.best_fitness(), result.stats.final_best_fitness());

        let best_ever = result.best_ever.fitness.unwrap();
        assert!(best_ever <= result.best_fitness().unwrap());
        assert_eq!(
            best_ever,
            result.stats.best_fitness(Objective::Minimize).unwrap()
        );
    }

    #[test]
    fn test_reported_best_belongs_to_final_population() {
        let ga = engine(EvolutionConfig::default());

        for seed in 0..200 {
            let result = ga.run(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(
                result.population.iter().any(|i| i == &result.best),
                "seed {seed}: best {:?} not in final population",
                result.best_fitness()
            );
            assert_eq!(
                result.best_fitness(),
                result.population.best(Objective::Minimize).unwrap().fitness
            );
        }
    }

    #[test]
    fn test_finish_mid_run_reports_current_population() {
        let mut rng = StdRng::seed_from_u64(13);
        let ga = engine(EvolutionConfig::default());
        let mut evolution = ga.start(&mut rng).unwrap();
        evolution.step().unwrap();

        let current = evolution.population().best(Objective::Minimize).cloned();
        let result = evolution.finish();
        assert_eq!(result.generations, 1);
        assert_eq!(Some(result.best), current);
    }

    #[test]
    fn test_genes_stay_in_domain() {
        let mut rng = StdRng::seed_from_u64(8);
        let ga = engine(EvolutionConfig {
            alpha: 1.0,
            crossover_probability: 1.0,
            mutation_probability: 1.0,
            mutation: MutationParams {
                mu: 0.0,
                sigma: 300.0,
                indpb: 1.0,
            },
            repair: RepairPolicy::Snap,
            generations: 10,
            ..EvolutionConfig::default()
        });

        let result = ga.run(&mut rng).unwrap();
        let domain = GeneDomain::default();
        for individual in result.population.iter() {
            assert!(individual.genome.genes().iter().all(|g| domain.contains(*g)));
        }
        assert!(result.stats.total_repairs() > 0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let ga = engine(EvolutionConfig {
            alpha: 0.3,
            ..EvolutionConfig::default()
        });

        let a = ga.run(&mut StdRng::seed_from_u64(99)).unwrap();
        let b = ga.run(&mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let sequential = engine(EvolutionConfig::default());
        let parallel = engine(EvolutionConfig {
            parallel_evaluation: true,
            ..EvolutionConfig::default()
        });

        let a = sequential.run(&mut StdRng::seed_from_u64(5)).unwrap();
        let b = parallel.run(&mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.population.individuals(), b.population.individuals());
    }

    #[test]
    fn test_no_variation_keeps_evaluations_at_initial() {
        let mut rng = StdRng::seed_from_u64(9);
        let ga = engine(EvolutionConfig {
            crossover_probability: 0.0,
            mutation_probability: 0.0,
            ..EvolutionConfig::default()
        });

        let result = ga.run(&mut rng).unwrap();
        // Untouched clones keep their fitness, so only the initial population is priced
        assert_eq!(result.evaluations, 10);
    }

    #[test]
    fn test_evaluation_failure_aborts_run() {
        let mut rng = StdRng::seed_from_u64(10);
        let failing = FnCostModel::new(|g: &RealVector| {
            if g[0] > 0.0 {
                Err(EvaluationError::Failed("pricing service unavailable".to_string()))
            } else {
                Ok(0.0)
            }
        });
        let ga = SimpleGA::from_config(EvolutionConfig::default(), failing).unwrap();

        let err = ga.run(&mut rng).err().unwrap();
        assert!(matches!(err, EvolutionError::Evaluation(_)));
        assert!(err.is_trial_local());
    }

    #[test]
    fn test_non_finite_cost_aborts_run() {
        let mut rng = StdRng::seed_from_u64(11);
        let nan = FnCostModel::new(|_: &RealVector| Ok(f64::NAN));
        let ga = SimpleGA::from_config(EvolutionConfig::default(), nan).unwrap();

        let err = ga.run(&mut rng).err().unwrap();
        assert!(matches!(
            err,
            EvolutionError::Evaluation(EvaluationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cases = [
            EvolutionConfig {
                population_size: 0,
                ..EvolutionConfig::default()
            },
            EvolutionConfig {
                generations: 0,
                ..EvolutionConfig::default()
            },
            EvolutionConfig {
                alpha: 1.5,
                ..EvolutionConfig::default()
            },
            EvolutionConfig {
                tournament_size: 0,
                ..EvolutionConfig::default()
            },
        ];

        for config in cases {
            let err = SimpleGA::from_config(config, VolumeCostModel::default())
                .err()
                .unwrap();
            assert!(matches!(err, EvolutionError::Configuration(_)));
        }
    }

    #[test]
    fn test_builder_with_explicit_operators() {
        let result = SimpleGABuilder::new()
            .selection(TournamentSelection::new(2))
            .crossover(BlendCrossover::new(0.5))
            .mutation(GaussianMutation::default())
            .cost_model(VolumeCostModel::default())
            .population_size(4)
            .generations(1)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_odd_population_size() {
        let mut rng = StdRng::seed_from_u64(12);
        let ga = engine(EvolutionConfig {
            population_size: 7,
            crossover_probability: 1.0,
            ..EvolutionConfig::default()
        });

        let result = ga.run(&mut rng).unwrap();
        assert_eq!(result.population.len(), 7);
    }
}
