//! Genome abstractions and implementations
//!
//! This module provides the core `EvolutionaryGenome` trait, the real-valued
//! genome, and the gene domains genes are drawn from.

pub mod bounds;
pub mod domain;
pub mod real_vector;
pub mod traits;

pub mod prelude {
    pub use super::bounds::*;
    pub use super::domain::*;
    pub use super::real_vector::*;
    pub use super::traits::*;
}
