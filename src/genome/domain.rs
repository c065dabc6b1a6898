//! Gene domains
//!
//! A gene domain describes which values a gene may take: either a finite set
//! of candidates (e.g. the volume sizes a team is willing to provision) or a
//! continuous range. Operators keep genes inside the domain by repairing their
//! output according to a [`RepairPolicy`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvolutionError, RepairInfo};
use crate::genome::bounds::Bounds;

/// How out-of-domain operator output is pulled back into the domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPolicy {
    /// Clamp to the `[min, max]` envelope of the domain
    #[default]
    Clamp,
    /// Snap to the nearest allowed value (discrete domains); clamp otherwise
    Snap,
}

impl RepairPolicy {
    /// Name recorded in [`RepairInfo`]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Snap => "snap",
        }
    }
}

/// Set of valid values for every gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "DomainRepr")]
pub enum GeneDomain {
    /// Finite candidate set, sorted ascending without duplicates
    Discrete(Vec<f64>),
    /// Continuous inclusive range
    Continuous(Bounds),
}

impl GeneDomain {
    /// Create a discrete domain from candidate values
    pub fn discrete(values: Vec<f64>) -> Result<Self, EvolutionError> {
        if values.is_empty() {
            return Err(EvolutionError::config("gene domain must not be empty"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(EvolutionError::config(format!(
                "gene domain contains a non-finite value: {bad}"
            )));
        }
        let mut values = values;
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self::Discrete(values))
    }

    /// Create a continuous domain `[min, max]`
    pub fn continuous(min: f64, max: f64) -> Result<Self, EvolutionError> {
        let bounds = Bounds { min, max };
        if !bounds.is_valid() {
            return Err(EvolutionError::config(format!(
                "invalid continuous gene domain [{min}, {max}]"
            )));
        }
        Ok(Self::Continuous(bounds))
    }

    /// Check the domain is non-empty and finite
    pub fn validate(&self) -> Result<(), EvolutionError> {
        match self {
            Self::Discrete(values) => Self::discrete(values.clone()).map(|_| ()),
            Self::Continuous(b) => Self::continuous(b.min, b.max).map(|_| ()),
        }
    }

    /// Envelope `[min, max]` of the domain
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Discrete(values) => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                Bounds { min, max }
            }
            Self::Continuous(b) => *b,
        }
    }

    /// Check whether a value is a member of the domain
    pub fn contains(&self, value: f64) -> bool {
        match self {
            Self::Discrete(values) => values.contains(&value),
            Self::Continuous(b) => b.contains(value),
        }
    }

    /// Sample a value uniformly from the domain
    ///
    /// # Panics
    /// Panics on an empty discrete domain; the constructors and
    /// deserialization reject those.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Discrete(values) => values[rng.gen_range(0..values.len())],
            Self::Continuous(b) => rng.gen_range(b.min..=b.max),
        }
    }

    /// Repair a single value
    pub fn repair(&self, value: f64, policy: RepairPolicy) -> f64 {
        match (self, policy) {
            (Self::Discrete(values), RepairPolicy::Snap) => values
                .iter()
                .copied()
                .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
                .unwrap_or(value),
            _ => self.bounds().clamp(value),
        }
    }

    /// Repair genes in place, reporting which ones changed
    pub fn repair_genes(&self, genes: &mut [f64], policy: RepairPolicy) -> Option<RepairInfo> {
        let mut repaired_genes = Vec::new();
        for (i, gene) in genes.iter_mut().enumerate() {
            let repaired = self.repair(*gene, policy);
            if repaired != *gene {
                tracing::trace!(gene = i, from = *gene, to = repaired, "repaired gene");
                *gene = repaired;
                repaired_genes.push(i);
            }
        }

        if repaired_genes.is_empty() {
            None
        } else {
            Some(RepairInfo {
                repaired_genes,
                repair_method: policy.name(),
            })
        }
    }
}

impl Default for GeneDomain {
    fn default() -> Self {
        Self::Discrete(vec![50.0, 100.0, 200.0, 500.0])
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum DomainRepr {
    Discrete(Vec<f64>),
    Continuous(Bounds),
}

impl TryFrom<DomainRepr> for GeneDomain {
    type Error = EvolutionError;

    fn try_from(repr: DomainRepr) -> Result<Self, Self::Error> {
        match repr {
            DomainRepr::Discrete(values) => Self::discrete(values),
            DomainRepr::Continuous(b) => Self::continuous(b.min, b.max),
        }
    }
}
