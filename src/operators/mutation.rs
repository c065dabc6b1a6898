//! Mutation operators
//!
//! This module provides the Gaussian mutation used for real-valued genomes.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{OperatorError, RepairInfo};
use crate::genome::traits::EvolutionaryGenome;
use crate::operators::traits::{DomainGuard, MutationOperator};

/// Gaussian mutation
///
/// Each gene independently, with probability `indpb`, receives additive
/// noise drawn from `Normal(mu, sigma)`. The genome is then repaired into
/// the gene domain.
#[derive(Clone, Debug)]
pub struct GaussianMutation {
    /// Mean of the noise
    pub mu: f64,
    /// Standard deviation of the noise
    pub sigma: f64,
    /// Per-gene mutation probability
    pub indpb: f64,
    normal: Normal<f64>,
}

impl GaussianMutation {
    /// Create a new Gaussian mutation
    ///
    /// # Panics
    /// Panics if sigma is negative or not finite, or if indpb is outside `[0, 1]`.
    pub fn new(mu: f64, sigma: f64, indpb: f64) -> Self {
        match Self::try_new(mu, sigma, indpb) {
            Ok(mutation) => mutation,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a new Gaussian mutation, rejecting invalid parameters
    pub fn try_new(mu: f64, sigma: f64, indpb: f64) -> Result<Self, OperatorError> {
        if !mu.is_finite() {
            return Err(OperatorError::InvalidConfiguration(format!(
                "noise mean must be finite, got {mu}"
            )));
        }
        // rand_distr accepts a negative standard deviation and mirrors it
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(OperatorError::InvalidConfiguration(format!(
                "noise standard deviation must be finite and non-negative, got {sigma}"
            )));
        }
        if !(0.0..=1.0).contains(&indpb) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "per-gene mutation probability must be in [0, 1], got {indpb}"
            )));
        }
        let normal = Normal::new(mu, sigma).map_err(|e| {
            OperatorError::InvalidConfiguration(format!(
                "invalid Gaussian noise (mu = {mu}, sigma = {sigma}): {e}"
            ))
        })?;

        Ok(Self {
            mu,
            sigma,
            indpb,
            normal,
        })
    }
}

impl Default for GaussianMutation {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.2)
    }
}

impl<G: EvolutionaryGenome> MutationOperator<G> for GaussianMutation {
    fn mutate<R: Rng>(
        &self,
        genome: &mut G,
        guard: DomainGuard<'_>,
        rng: &mut R,
    ) -> Option<RepairInfo> {
        for gene in genome.genes_mut() {
            if rng.gen::<f64>() < self.indpb {
                *gene += self.normal.sample(rng);
            }
        }

        guard.repair(genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::domain::{GeneDomain, RepairPolicy};
    use crate::genome::real_vector::RealVector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_indpb_is_noop() {
        let mut rng = StdRng::seed_from_u64(31);
        let domain = GeneDomain::default();
        let guard = DomainGuard::new(&domain, RepairPolicy::Clamp);
        let original = RealVector::new(vec![50.0, 100.0, 200.0, 500.0]);

        let mutation = GaussianMutation::new(0.0, 100.0, 0.0);
        for _ in 0..50 {
            let mut genome = original.clone();
            assert!(mutation.mutate(&mut genome, guard, &mut rng).is_none());
            assert_eq!(genome, original);
        }
    }

    #[test]
    fn test_full_indpb_changes_every_gene() {
        let mut rng = StdRng::seed_from_u64(32);
        let domain = GeneDomain::continuous(-1.0e6, 1.0e6).unwrap();
        let guard = DomainGuard::new(&domain, RepairPolicy::Clamp);
        let mut genome = RealVector::new(vec![0.0; 8]);

        GaussianMutation::new(0.0, 1.0, 1.0).mutate(&mut genome, guard, &mut rng);
        assert!(genome.genes().iter().all(|&g| g != 0.0));
    }

    #[test]
    fn test_mutation_respects_domain() {
        let mut rng = StdRng::seed_from_u64(33);
        let domain = GeneDomain::default();
        let guard = DomainGuard::new(&domain, RepairPolicy::Clamp);

        let mutation = GaussianMutation::new(0.0, 500.0, 1.0);
        for _ in 0..100 {
            let mut genome = RealVector::new(vec![50.0, 500.0]);
            mutation.mutate(&mut genome, guard, &mut rng);
            assert!(genome.genes().iter().all(|g| (50.0..=500.0).contains(g)));
        }
    }

    #[test]
    fn test_mean_shift() {
        let mut rng = StdRng::seed_from_u64(34);
        let domain = GeneDomain::continuous(-1.0e6, 1.0e6).unwrap();
        let guard = DomainGuard::new(&domain, RepairPolicy::Clamp);

        let mutation = GaussianMutation::new(10.0, 1.0, 1.0);
        let mut genome = RealVector::new(vec![0.0; 1000]);
        mutation.mutate(&mut genome, guard, &mut rng);

        let mean = genome.genes().iter().sum::<f64>() / 1000.0;
        assert!((mean - 10.0).abs() < 0.5, "mean {mean}");
    }

    #[test]
    fn test_try_new_rejects_invalid_parameters() {
        assert!(GaussianMutation::try_new(0.0, -1.0, 0.2).is_err());
        assert!(GaussianMutation::try_new(0.0, f64::INFINITY, 0.2).is_err());
        assert!(GaussianMutation::try_new(0.0, 1.0, 1.5).is_err());
        assert!(GaussianMutation::try_new(0.0, 0.0, 0.2).is_ok());
    }

    #[test]
    fn test_try_new_rejects_negative_or_non_finite_noise() {
        for (mu, sigma) in [
            (0.0, -1.0),
            (0.0, -1e-9),
            (0.0, f64::NAN),
            (f64::NAN, 1.0),
            (f64::INFINITY, 1.0),
        ] {
            let err = GaussianMutation::try_new(mu, sigma, 0.2).unwrap_err();
            assert!(matches!(err, OperatorError::InvalidConfiguration(_)));
        }
    }

    #[test]
    #[should_panic(expected = "standard deviation")]
    fn test_new_panics_on_negative_sigma() {
        GaussianMutation::new(0.0, -1.0, 0.2);
    }
}
