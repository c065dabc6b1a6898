//! Population type
//!
//! This module provides the Population container type.

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{EvaluationError, EvolutionError};
use crate::fitness::traits::{evaluate_finite, CostModel, Objective};
use crate::genome::domain::GeneDomain;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::individual::Individual;

/// A population of individuals
#[derive(Clone, Debug)]
pub struct Population<G>
where
    G: EvolutionaryGenome,
{
    /// The individuals in this population
    individuals: Vec<Individual<G>>,
    /// Current generation number
    generation: usize,
}

impl<G> Population<G>
where
    G: EvolutionaryGenome,
{
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
            generation: 0,
        }
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual<G>>) -> Self {
        Self {
            individuals,
            generation: 0,
        }
    }

    /// Create a random, unevaluated population
    ///
    /// Every gene of every individual is drawn independently and uniformly
    /// from `domain`.
    pub fn initialize<R: Rng>(
        size: usize,
        dimension: usize,
        domain: &GeneDomain,
        rng: &mut R,
    ) -> Result<Self, EvolutionError> {
        if size == 0 {
            return Err(EvolutionError::config("population size must be positive"));
        }
        if dimension == 0 {
            return Err(EvolutionError::config("gene count must be positive"));
        }
        domain.validate()?;

        let individuals = (0..size)
            .map(|_| Individual::new(G::generate(rng, domain, dimension)))
            .collect();
        Ok(Self {
            individuals,
            generation: 0,
        })
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Add an individual to the population
    pub fn push(&mut self, individual: Individual<G>) {
        self.individuals.push(individual);
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual<G>> {
        self.individuals.iter()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    /// Get the best evaluated individual under `objective`
    ///
    /// Ties resolve to the earliest individual.
    pub fn best(&self, objective: Objective) -> Option<&Individual<G>> {
        self.evaluated()
            .reduce(|best, candidate| {
                if candidate.is_better_than(best, objective) {
                    candidate
                } else {
                    best
                }
            })
    }

    /// Get the worst evaluated individual under `objective`
    pub fn worst(&self, objective: Objective) -> Option<&Individual<G>> {
        self.evaluated()
            .reduce(|worst, candidate| {
                if worst.is_better_than(candidate, objective) {
                    candidate
                } else {
                    worst
                }
            })
    }

    /// Sort the population by fitness (best first, unevaluated last)
    pub fn sort_by_fitness(&mut self, objective: Objective) {
        let worst = objective.worst_value();
        self.individuals.sort_by(|a, b| {
            objective
                .compare(a.fitness.unwrap_or(worst), b.fitness.unwrap_or(worst))
                .reverse()
        });
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Count the number of evaluated individuals
    pub fn count_evaluated(&self) -> usize {
        self.evaluated().count()
    }

    /// Get genome-fitness pairs for selection
    pub fn as_fitness_pairs(&self) -> Vec<(G, f64)> {
        self.individuals
            .iter()
            .filter_map(|i| i.fitness.map(|f| (i.genome.clone(), f)))
            .collect()
    }

    /// Evaluate all unevaluated individuals (sequential)
    ///
    /// Returns the number of cost model calls. Stops at the first failure.
    pub fn evaluate<C>(&mut self, model: &C) -> Result<usize, EvaluationError>
    where
        C: CostModel<Genome = G>,
    {
        let mut evaluations = 0;
        for individual in self.individuals.iter_mut().filter(|i| !i.is_evaluated()) {
            let cost = evaluate_finite(model, &individual.genome)?;
            individual.set_fitness(cost);
            evaluations += 1;
        }
        Ok(evaluations)
    }

    /// Fitness values of evaluated individuals, in population order
    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().filter_map(|i| i.fitness).collect()
    }

    /// Compute mean fitness
    pub fn mean_fitness(&self) -> Option<f64> {
        let evaluated = self.fitness_values();

        if evaluated.is_empty() {
            None
        } else {
            Some(evaluated.iter().sum::<f64>() / evaluated.len() as f64)
        }
    }

    /// Compute median fitness
    pub fn median_fitness(&self) -> Option<f64> {
        let mut values = self.fitness_values();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }

    /// Compute fitness standard deviation
    pub fn fitness_std(&self) -> Option<f64> {
        let mean = self.mean_fitness()?;
        let evaluated = self.fitness_values();

        if evaluated.len() < 2 {
            return None;
        }

        let variance = evaluated.iter().map(|f| (f - mean).powi(2)).sum::<f64>()
            / (evaluated.len() - 1) as f64;
        Some(variance.sqrt())
    }

    /// Compute population diversity (average pairwise distance)
    pub fn diversity(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        let mut count = 0;

        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                total_distance += self.individuals[i]
                    .genome
                    .distance(&self.individuals[j].genome);
                count += 1;
            }
        }

        total_distance / count as f64
    }

    fn evaluated(&self) -> impl Iterator<Item = &Individual<G>> {
        self.individuals.iter().filter(|i| i.is_evaluated())
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl<G> Population<G>
where
    G: EvolutionaryGenome,
{
    /// Evaluate all unevaluated individuals on the rayon pool
    ///
    /// Each worker writes only to its own individual, so the resulting
    /// fitness values match sequential evaluation.
    pub fn evaluate_parallel<C>(&mut self, model: &C) -> Result<usize, EvaluationError>
    where
        C: CostModel<Genome = G>,
    {
        let pending = self.individuals.len() - self.count_evaluated();
        self.individuals
            .par_iter_mut()
            .filter(|i| !i.is_evaluated())
            .try_for_each(|individual| -> Result<(), EvaluationError> {
                let cost = evaluate_finite(model, &individual.genome)?;
                individual.set_fitness(cost);
                Ok(())
            })?;
        Ok(pending)
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl<G> Population<G>
where
    G: EvolutionaryGenome,
{
    /// Evaluate all unevaluated individuals (sequential fallback)
    pub fn evaluate_parallel<C>(&mut self, model: &C) -> Result<usize, EvaluationError>
    where
        C: CostModel<Genome = G>,
    {
        self.evaluate(model)
    }
}

impl<G> Default for Population<G>
where
    G: EvolutionaryGenome,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<G> std::ops::Index<usize> for Population<G>
where
    G: EvolutionaryGenome,
{
    type Output = Individual<G>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl<G> IntoIterator for Population<G>
where
    G: EvolutionaryGenome,
{
    type Item = Individual<G>;
    type IntoIter = std::vec::IntoIter<Individual<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

impl<G> FromIterator<Individual<G>> for Population<G>
where
    G: EvolutionaryGenome,
{
    fn from_iter<I: IntoIterator<Item = Individual<G>>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}
