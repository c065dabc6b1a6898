//! Operator traits
//!
//! This module defines the core operator traits for genetic algorithms.

use rand::Rng;

use crate::error::{OperatorResult, RepairInfo};
use crate::fitness::traits::Objective;
use crate::genome::domain::{GeneDomain, RepairPolicy};
use crate::genome::traits::EvolutionaryGenome;

/// Domain an operator must keep its output inside, and how to get there
#[derive(Clone, Copy, Debug)]
pub struct DomainGuard<'a> {
    /// Valid gene values
    pub domain: &'a GeneDomain,
    /// Repair applied to out-of-domain output
    pub policy: RepairPolicy,
}

impl<'a> DomainGuard<'a> {
    /// Create a new guard
    pub fn new(domain: &'a GeneDomain, policy: RepairPolicy) -> Self {
        Self { domain, policy }
    }

    /// Repair a genome in place
    pub fn repair<G: EvolutionaryGenome>(&self, genome: &mut G) -> Option<RepairInfo> {
        self.domain.repair_genes(genome.genes_mut(), self.policy)
    }
}

/// Selection operator trait
///
/// Selects individuals from a population for reproduction.
pub trait SelectionOperator<G: EvolutionaryGenome>: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual.
    fn select<R: Rng>(
        &self,
        population: &[(G, f64)], // (genome, fitness) pairs
        objective: Objective,
        rng: &mut R,
    ) -> usize;

    /// Select multiple individuals from the population, with replacement
    /// across selections
    fn select_many<R: Rng>(
        &self,
        population: &[(G, f64)],
        objective: Objective,
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count)
            .map(|_| self.select(population, objective, rng))
            .collect()
    }
}

/// Crossover operator trait
///
/// Combines genetic material from two parents to create two offspring that
/// lie inside the guarded domain.
pub trait CrossoverOperator<G: EvolutionaryGenome>: Send + Sync {
    /// Apply crossover to two parents and produce two offspring
    fn crossover<R: Rng>(
        &self,
        parent1: &G,
        parent2: &G,
        guard: DomainGuard<'_>,
        rng: &mut R,
    ) -> OperatorResult<(G, G)>;
}

/// Mutation operator trait
///
/// Applies random changes to a genome in place, then repairs it into the
/// guarded domain. Returns the repairs that were needed.
pub trait MutationOperator<G: EvolutionaryGenome>: Send + Sync {
    /// Apply mutation to a genome in place
    fn mutate<R: Rng>(&self, genome: &mut G, guard: DomainGuard<'_>, rng: &mut R)
        -> Option<RepairInfo>;
}

/// Merge the repair reports of two genomes produced by one operator call
pub fn merge_repairs(first: Option<RepairInfo>, second: Option<RepairInfo>) -> Option<RepairInfo> {
    match (first, second) {
        (Some(mut a), Some(b)) => {
            for gene in b.repaired_genes {
                if !a.repaired_genes.contains(&gene) {
                    a.repaired_genes.push(gene);
                }
            }
            a.repaired_genes.sort_unstable();
            Some(a)
        }
        (a, b) => a.or(b),
    }
}
