//! Core genome traits
//!
//! This module defines the `EvolutionaryGenome` trait shared by every
//! genome the engine can evolve.

use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::EvaluationError;
use crate::genome::domain::GeneDomain;

/// Core genome abstraction for evolutionary algorithms.
///
/// A genome is a fixed-length ordered sequence of real-valued genes. Genomes
/// must be cloneable, serializable, and thread-safe so that populations can be
/// evaluated on a worker pool.
pub trait EvolutionaryGenome:
    Clone + Send + Sync + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Get the genes as a slice
    fn genes(&self) -> &[f64];

    /// Get the genes as a mutable slice
    fn genes_mut(&mut self) -> &mut [f64];

    /// Create from a vector of genes
    fn from_genes(genes: Vec<f64>) -> Self;

    /// Number of genes
    fn dimension(&self) -> usize {
        self.genes().len()
    }

    /// Generate a random genome with `dimension` genes drawn from the domain
    fn generate<R: Rng>(rng: &mut R, domain: &GeneDomain, dimension: usize) -> Self {
        Self::from_genes((0..dimension).map(|_| domain.sample(rng)).collect())
    }

    /// Euclidean distance between two genomes
    fn distance(&self, other: &Self) -> f64 {
        self.genes()
            .iter()
            .zip(other.genes())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// First gene, failing if the genome is empty
    fn first_gene(&self) -> Result<f64, EvaluationError> {
        self.genes()
            .first()
            .copied()
            .ok_or(EvaluationError::DimensionMismatch {
                expected: 1,
                actual: 0,
            })
    }
}
