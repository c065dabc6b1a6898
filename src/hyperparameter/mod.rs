//! Hyperparameter search
//!
//! This module tunes the blend crossover alpha by Monte Carlo sampling: many
//! independent engine runs, each with a uniformly drawn alpha, keeping the
//! alpha whose run found the cheapest configuration.

pub mod monte_carlo;

pub mod prelude {
    pub use super::monte_carlo::*;
}
