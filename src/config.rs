//! Search configuration
//!
//! [`SearchConfig`] holds everything a Monte Carlo search needs. It is read
//! once (from JSON, CLI flags, or code) and never changes during a run; each
//! trial derives its own immutable [`EvolutionConfig`] from it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::simple_ga::{check_probability, EvolutionConfig};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::pricing::{VolumeClass, VolumeCostModel};
use crate::genome::domain::{GeneDomain, RepairPolicy};
use crate::hyperparameter::monte_carlo::FinalRun;

/// Gaussian mutation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationParams {
    /// Mean of the additive noise
    pub mu: f64,
    /// Standard deviation of the additive noise
    pub sigma: f64,
    /// Per-gene mutation probability
    pub indpb: f64,
}

impl Default for MutationParams {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
            indpb: 0.2,
        }
    }
}

impl MutationParams {
    /// Check the noise is well defined
    pub fn validate(&self) -> Result<(), EvolutionError> {
        if !self.mu.is_finite() {
            return Err(EvolutionError::config(format!(
                "mutation mu must be finite, got {}",
                self.mu
            )));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(EvolutionError::config(format!(
                "mutation sigma must be finite and non-negative, got {}",
                self.sigma
            )));
        }
        check_probability("per-gene mutation probability", self.indpb)
    }
}

/// Configuration of a whole search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Individuals per generation
    pub population_size: usize,
    /// Generations per trial
    pub generations: usize,
    /// Genes per individual
    pub gene_count: usize,
    /// Probability of crossing each consecutive pair of parents
    pub crossover_probability: f64,
    /// Probability of mutating each offspring
    pub mutation_probability: f64,
    /// Tournament size for parent selection
    pub tournament_size: usize,
    /// Gaussian mutation parameters
    pub mutation: MutationParams,
    /// Valid gene values
    pub domain: GeneDomain,
    /// Repair applied to out-of-domain operator output
    pub repair: RepairPolicy,
    /// Cost model applied to each genome
    pub pricing: VolumeCostModel,
    /// Monte Carlo trials
    pub iterations: usize,
    /// How the final answer is produced once the trials are done
    pub final_run: FinalRun,
    /// Evaluate each generation on the rayon pool
    pub parallel_evaluation: bool,
    /// Run trials on the rayon pool
    pub parallel_trials: bool,
    /// Master seed; a random seed is drawn when absent
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 5,
            gene_count: 1,
            crossover_probability: 0.7,
            mutation_probability: 0.2,
            tournament_size: 3,
            mutation: MutationParams::default(),
            domain: GeneDomain::default(),
            repair: RepairPolicy::default(),
            pricing: VolumeCostModel::default(),
            iterations: 100,
            final_run: FinalRun::default(),
            parallel_evaluation: false,
            parallel_trials: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> EvoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> EvoResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_json_str(&json)
    }

    /// Set the population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the number of generations per trial
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set the number of genes per individual
    pub fn with_gene_count(mut self, gene_count: usize) -> Self {
        self.gene_count = gene_count;
        self
    }

    /// Set the crossover probability
    pub fn with_crossover_probability(mut self, probability: f64) -> Self {
        self.crossover_probability = probability;
        self
    }

    /// Set the mutation probability
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability;
        self
    }

    /// Set the tournament size
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Set the Gaussian mutation parameters
    pub fn with_mutation(mut self, mutation: MutationParams) -> Self {
        self.mutation = mutation;
        self
    }

    /// Set the gene domain
    pub fn with_domain(mut self, domain: GeneDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Set the repair policy
    pub fn with_repair(mut self, repair: RepairPolicy) -> Self {
        self.repair = repair;
        self
    }

    /// Set the cost model
    pub fn with_pricing(mut self, pricing: VolumeCostModel) -> Self {
        self.pricing = pricing;
        self
    }

    /// Price a different volume class, keeping the gp3 price sheet
    pub fn with_volume_class(mut self, class: VolumeClass) -> Self {
        self.pricing.class = class;
        self
    }

    /// Set the number of Monte Carlo trials
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the final run policy
    pub fn with_final_run(mut self, final_run: FinalRun) -> Self {
        self.final_run = final_run;
        self
    }

    /// Enable or disable parallel evaluation within a generation
    pub fn with_parallel_evaluation(mut self, enabled: bool) -> Self {
        self.parallel_evaluation = enabled;
        self
    }

    /// Enable or disable parallel trials
    pub fn with_parallel_trials(mut self, enabled: bool) -> Self {
        self.parallel_trials = enabled;
        self
    }

    /// Set the master seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every setting, reporting the first problem found
    ///
    /// `iterations = 0` is accepted; the search then returns its sentinel.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        // Any alpha in [0, 1] is valid, so validating one trial covers all.
        self.evolution_config(0.0).validate()
    }

    /// Per-trial engine configuration for a given blend alpha
    pub fn evolution_config(&self, alpha: f64) -> EvolutionConfig {
        EvolutionConfig {
            population_size: self.population_size,
            generations: self.generations,
            gene_count: self.gene_count,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            tournament_size: self.tournament_size,
            alpha,
            mutation: self.mutation,
            domain: self.domain.clone(),
            repair: self.repair,
            parallel_evaluation: self.parallel_evaluation,
        }
    }
}
