//! Diagnostics and statistics
//!
//! This module provides statistics collection for evolutionary runs.

use serde::{Deserialize, Serialize};

use crate::fitness::traits::Objective;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness in this generation
    pub best_fitness: f64,
    /// Worst fitness in this generation
    pub worst_fitness: f64,
    /// Mean fitness
    pub mean_fitness: f64,
    /// Median fitness
    pub median_fitness: f64,
    /// Fitness standard deviation
    pub fitness_std: f64,
    /// Population diversity
    pub diversity: f64,
    /// Genes repaired back into the domain during this generation
    pub repairs: usize,
}

impl GenerationStats {
    /// Compute statistics from a population
    ///
    /// "Best" and "worst" follow `objective`. An unevaluated population
    /// reports the objective's worst value as its best fitness.
    pub fn from_population<G>(
        population: &Population<G>,
        objective: Objective,
        generation: usize,
        evaluations: usize,
    ) -> Self
    where
        G: EvolutionaryGenome,
    {
        let best = population
            .best(objective)
            .and_then(|i| i.fitness)
            .unwrap_or_else(|| objective.worst_value());
        let worst = population
            .worst(objective)
            .and_then(|i| i.fitness)
            .unwrap_or_else(|| objective.worst_value());

        Self {
            generation,
            evaluations,
            best_fitness: best,
            worst_fitness: worst,
            mean_fitness: population.mean_fitness().unwrap_or(0.0),
            median_fitness: population.median_fitness().unwrap_or(0.0),
            fitness_std: population.fitness_std().unwrap_or(0.0),
            diversity: population.diversity(),
            repairs: 0,
        }
    }

    /// Set the number of repaired genes
    pub fn with_repairs(mut self, repairs: usize) -> Self {
        self.repairs = repairs;
        self
    }
}

/// Statistics collector for an entire evolution run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation, starting with the initial population
    pub generations: Vec<GenerationStats>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Get the best fitness across all generations
    pub fn best_fitness(&self, objective: Objective) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .reduce(|best, f| if objective.is_better(f, best) { f } else { best })
    }

    /// Get the final best fitness
    pub fn final_best_fitness(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_fitness)
    }

    /// Get the history of best fitness values
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_fitness).collect()
    }

    /// Get the history of mean fitness values
    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_fitness).collect()
    }

    /// Get the history of diversity values
    pub fn diversity_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.diversity).collect()
    }

    /// Total genes repaired over the run
    pub fn total_repairs(&self) -> usize {
        self.generations.iter().map(|g| g.repairs).sum()
    }

    /// Get a summary of the evolution run
    pub fn summary(&self, objective: Objective) -> String {
        let worst = objective.worst_value();
        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Best fitness: {:.6}\n\
             - Final best: {:.6}\n\
             - Repairs: {}",
            self.num_generations().saturating_sub(1),
            self.best_fitness(objective).unwrap_or(worst),
            self.final_best_fitness().unwrap_or(worst),
            self.total_repairs(),
        )
    }
}

/// Result of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult<G>
where
    G: EvolutionaryGenome,
{
    /// Best member of the final population
    pub best: Individual<G>,
    /// Best individual seen in any generation; may have been lost since
    pub best_ever: Individual<G>,
    /// Population after the last generation
    pub population: Population<G>,
    /// Number of generations completed
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    /// Statistics for the run
    pub stats: EvolutionStats,
}

impl<G> EvolutionResult<G>
where
    G: EvolutionaryGenome,
{
    /// Fitness of the best member of the final population
    ///
    /// The engine only reports evaluated individuals, so this is always set
    /// for results it produces.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.fitness
    }

    /// Genome of the best individual
    pub fn best_genome(&self) -> &G {
        &self.best.genome
    }
}

pub mod prelude {
    pub use super::{EvolutionResult, EvolutionStats, GenerationStats};
}
