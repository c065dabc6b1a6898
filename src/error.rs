//! Error types for volume-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error raised by a cost model for a single genome
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// The cost model could not price the genome
    #[error("Cost model failed: {0}")]
    Failed(String),

    /// The cost model returned NaN or an infinite cost
    #[error("Cost model returned a non-finite cost: {value}")]
    NonFinite { value: f64 },

    /// Genome length does not match what the cost model expects
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Mutation operation failed
    #[error("Mutation failed: {0}")]
    MutationFailed(String),

    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

/// Top-level error type for evolution and search operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Invalid configuration, detected before any generation runs
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Fitness evaluation failed
    #[error("Fitness evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// Reading a configuration file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or report (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvolutionError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this error aborts a single trial rather than the whole search
    pub fn is_trial_local(&self) -> bool {
        matches!(self, Self::Evaluation(_) | Self::Operator(_))
    }
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Repair information when an operator had to pull a gene back into its domain
#[derive(Debug, Clone, PartialEq)]
pub struct RepairInfo {
    /// Indices of the genes that were repaired
    pub repaired_genes: Vec<usize>,
    /// Method used to repair the genome
    pub repair_method: &'static str,
}

impl RepairInfo {
    /// Number of repaired genes
    pub fn count(&self) -> usize {
        self.repaired_genes.len()
    }
}

/// Result of an operator application with optional repair information
#[derive(Debug, Clone)]
pub enum OperatorResult<G> {
    /// Operation succeeded without repairs
    Success(G),
    /// Operation succeeded but required repairs
    Repaired(G, RepairInfo),
    /// Operation failed unrecoverably
    Failed(OperatorError),
}

impl<G> OperatorResult<G> {
    /// Build a result from an output and the repairs it needed
    pub fn from_repairs(output: G, repair: Option<RepairInfo>) -> Self {
        match repair {
            Some(info) => Self::Repaired(output, info),
            None => Self::Success(output),
        }
    }

    /// Returns the genome if successful or repaired, None if failed
    pub fn genome(self) -> Option<G> {
        match self {
            Self::Success(g) | Self::Repaired(g, _) => Some(g),
            Self::Failed(_) => None,
        }
    }

    /// Converts into a standard `Result`, dropping repair information
    pub fn into_result(self) -> Result<G, OperatorError> {
        match self {
            Self::Success(g) | Self::Repaired(g, _) => Ok(g),
            Self::Failed(e) => Err(e),
        }
    }

    /// Returns true if the operation was successful (with or without repairs)
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Returns true if repairs were needed
    pub fn was_repaired(&self) -> bool {
        matches!(self, Self::Repaired(_, _))
    }

    /// Repair information, if any
    pub fn repair_info(&self) -> Option<&RepairInfo> {
        match self {
            Self::Repaired(_, info) => Some(info),
            _ => None,
        }
    }

    /// Maps the genome type
    pub fn map<U, F: FnOnce(G) -> U>(self, f: F) -> OperatorResult<U> {
        match self {
            Self::Success(g) => OperatorResult::Success(f(g)),
            Self::Repaired(g, info) => OperatorResult::Repaired(f(g), info),
            Self::Failed(e) => OperatorResult::Failed(e),
        }
    }
}
