//! Cost model traits
//!
//! The engine never inspects a pricing formula. It only needs a cost model
//! that turns a genome into a scalar, and the direction in which that scalar
//! improves.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::genome::traits::EvolutionaryGenome;

/// Optimisation direction of a cost model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Lower values are better
    Minimize,
    /// Higher values are better
    Maximize,
}

impl Objective {
    /// Check if `a` is strictly better than `b`
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Self::Minimize => a < b,
            Self::Maximize => a > b,
        }
    }

    /// Ordering where `Ordering::Greater` means `a` is better than `b`
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Minimize => b.partial_cmp(&a),
            Self::Maximize => a.partial_cmp(&b),
        }
        .unwrap_or(Ordering::Equal)
    }

    /// Value no real fitness can be worse than
    pub fn worst_value(self) -> f64 {
        match self {
            Self::Minimize => f64::INFINITY,
            Self::Maximize => f64::NEG_INFINITY,
        }
    }
}

/// Cost evaluation trait
///
/// Implementations must be pure functions of the genome and must accept every
/// value the operators can produce inside the configured domain.
#[cfg(feature = "parallel")]
pub trait CostModel: Send + Sync {
    /// The genome type being evaluated
    type Genome: EvolutionaryGenome;

    /// Direction in which the cost improves
    const OBJECTIVE: Objective = Objective::Minimize;

    /// Evaluate the cost of a genome
    fn evaluate(&self, genome: &Self::Genome) -> Result<f64, EvaluationError>;
}

/// Cost evaluation trait (non-parallel version)
#[cfg(not(feature = "parallel"))]
pub trait CostModel {
    /// The genome type being evaluated
    type Genome: EvolutionaryGenome;

    /// Direction in which the cost improves
    const OBJECTIVE: Objective = Objective::Minimize;

    /// Evaluate the cost of a genome
    fn evaluate(&self, genome: &Self::Genome) -> Result<f64, EvaluationError>;
}

impl<C: CostModel> CostModel for &C {
    type Genome = C::Genome;

    const OBJECTIVE: Objective = C::OBJECTIVE;

    fn evaluate(&self, genome: &Self::Genome) -> Result<f64, EvaluationError> {
        (**self).evaluate(genome)
    }
}

/// Evaluate and reject non-finite costs
pub fn evaluate_finite<C: CostModel>(
    model: &C,
    genome: &C::Genome,
) -> Result<f64, EvaluationError> {
    let value = model.evaluate(genome)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFinite { value })
    }
}

/// A simple function wrapper for cost evaluation (minimisation)
pub struct FnCostModel<G, F>
where
    F: Fn(&G) -> Result<f64, EvaluationError>,
{
    f: F,
    _marker: std::marker::PhantomData<fn(&G)>,
}

impl<G, F> FnCostModel<G, F>
where
    F: Fn(&G) -> Result<f64, EvaluationError>,
{
    /// Create a new function-based cost model
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<G, F> CostModel for FnCostModel<G, F>
where
    G: EvolutionaryGenome,
    F: Fn(&G) -> Result<f64, EvaluationError> + Send + Sync,
{
    type Genome = G;

    fn evaluate(&self, genome: &Self::Genome) -> Result<f64, EvaluationError> {
        (self.f)(genome)
    }
}
