//! Evolutionary algorithms
//!
//! This module provides the generational genetic algorithm engine.

pub mod simple_ga;

pub mod prelude {
    pub use super::simple_ga::*;
}
