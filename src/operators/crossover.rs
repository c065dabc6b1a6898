//! Crossover operators
//!
//! This module provides the blend crossover used for real-valued genomes.

use rand::Rng;

use crate::error::{OperatorError, OperatorResult};
use crate::genome::traits::EvolutionaryGenome;
use crate::operators::traits::{merge_repairs, CrossoverOperator, DomainGuard};

/// Blend crossover (BLX-α)
///
/// For each gene with parent values `x1` and `x2`, both children sample a
/// value uniformly from `[min - α·d, max + α·d]` where `d = |x1 - x2|`.
/// With α = 0 children stay between their parents; larger α explores
/// further outside. Children are repaired into the gene domain afterwards.
///
/// The two children draw independently. This differs from the mirrored form
/// `(1 - γ)·x1 + γ·x2` and `γ·x1 + (1 - γ)·x2` with one shared `γ` per gene,
/// so the children's mean need not equal the parents' mean.
#[derive(Clone, Debug)]
pub struct BlendCrossover {
    /// Alpha parameter in `[0, 1]`
    pub alpha: f64,
}

impl BlendCrossover {
    /// Create a new blend crossover
    ///
    /// # Panics
    /// Panics if alpha is outside `[0, 1]`.
    pub fn new(alpha: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&alpha),
            "Alpha must be in [0, 1], got {alpha}"
        );
        Self { alpha }
    }

    /// Create a blend crossover, rejecting alpha outside `[0, 1]`
    pub fn try_new(alpha: f64) -> Result<Self, OperatorError> {
        if (0.0..=1.0).contains(&alpha) {
            Ok(Self { alpha })
        } else {
            Err(OperatorError::InvalidConfiguration(format!(
                "blend alpha must be in [0, 1], got {alpha}"
            )))
        }
    }

    /// Sample one blended gene
    fn blend<R: Rng>(&self, x1: f64, x2: f64, rng: &mut R) -> f64 {
        let (min_val, max_val) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let range = max_val - min_val;
        if range == 0.0 {
            return x1;
        }

        let low = min_val - self.alpha * range;
        let high = max_val + self.alpha * range;
        rng.gen_range(low..=high)
    }
}

impl Default for BlendCrossover {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl<G: EvolutionaryGenome> CrossoverOperator<G> for BlendCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &G,
        parent2: &G,
        guard: DomainGuard<'_>,
        rng: &mut R,
    ) -> OperatorResult<(G, G)> {
        let (genes1, genes2) = (parent1.genes(), parent2.genes());
        if genes1.len() != genes2.len() {
            return OperatorResult::Failed(OperatorError::CrossoverFailed(format!(
                "parents have different lengths: {} and {}",
                genes1.len(),
                genes2.len()
            )));
        }

        let mut child1 = Vec::with_capacity(genes1.len());
        let mut child2 = Vec::with_capacity(genes1.len());
        for (&x1, &x2) in genes1.iter().zip(genes2) {
            child1.push(self.blend(x1, x2, rng));
            child2.push(self.blend(x1, x2, rng));
        }

        let mut child1 = G::from_genes(child1);
        let mut child2 = G::from_genes(child2);
        let repairs = merge_repairs(guard.repair(&mut child1), guard.repair(&mut child2));

        OperatorResult::from_repairs((child1, child2), repairs)
    }
}
