//! Selection operators

use rand::seq::index;
use rand::Rng;

use crate::fitness::traits::Objective;
use crate::genome::traits::EvolutionaryGenome;
use crate::operators::traits::SelectionOperator;

/// Tournament selection operator
///
/// Samples `tournament_size` distinct individuals uniformly at random and
/// returns the best of them. The population itself is never modified.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl<G: EvolutionaryGenome> SelectionOperator<G> for TournamentSelection {
    fn select<R: Rng>(&self, population: &[(G, f64)], objective: Objective, rng: &mut R) -> usize {
        assert!(!population.is_empty(), "Population cannot be empty");

        // A tournament larger than the population degenerates to picking the best.
        let tournament_size = self.tournament_size.min(population.len());

        index::sample(rng, population.len(), tournament_size)
            .into_iter()
            .reduce(|best, candidate| {
                if objective.is_better(population[candidate].1, population[best].1) {
                    candidate
                } else {
                    best
                }
            })
            .unwrap_or(0)
    }
}
