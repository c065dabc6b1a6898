//! # volume-evo
//!
//! Searches for the cheapest block storage volume configuration with a
//! generational genetic algorithm, and tunes the algorithm's blend crossover
//! coefficient with a Monte Carlo search.
//!
//! ## Core Concepts
//!
//! - **Cost models**: anything implementing [`fitness::traits::CostModel`]
//!   turns a genome into a scalar; the engine never looks inside.
//! - **Gene domains**: genes are drawn from a discrete candidate set or a
//!   continuous range, and operator output is repaired back into it.
//! - **Reproducible search**: every random draw comes from an injected RNG,
//!   and parallel trials each own an RNG derived from the master seed.
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use volume_evo::prelude::*;
//!
//! let config = SearchConfig::default().with_iterations(10);
//! let search = MonteCarloSearch::new(config, VolumeCostModel::new(VolumeClass::Gp3))?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let outcome = search.run(&mut rng)?;
//!
//! assert!(outcome.result.alpha.is_some());
//! assert!(outcome.result.fitness.is_finite());
//! # Ok::<(), volume_evo::error::EvolutionError>(())
//! ```

pub mod algorithms;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod hyperparameter;
pub mod operators;
pub mod population;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::config::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::hyperparameter::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
}
