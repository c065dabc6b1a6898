//! Block storage pricing models
//!
//! Monthly cost of a volume as a function of its size in GiB. Each gene of
//! the genome is priced as one volume and the costs are summed, so the usual
//! single-gene genome prices a single volume.
//!
//! Rates are USD per GiB-month (storage) and per provisioned unit above the
//! free baseline (gp3 IOPS and throughput).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::fitness::traits::CostModel;
use crate::genome::real_vector::RealVector;
use crate::genome::traits::EvolutionaryGenome;

/// Volume class whose pricing is modelled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeClass {
    /// General purpose SSD with free IOPS/throughput baselines
    #[default]
    Gp3,
    /// Previous-generation general purpose SSD
    Gp2,
    /// Throughput-optimised HDD
    St1,
    /// Cold HDD
    Sc1,
}

impl VolumeClass {
    /// Storage rate per GiB-month
    pub fn storage_rate(&self) -> f64 {
        match self {
            Self::Gp3 => 0.08,
            Self::Gp2 => 0.10,
            Self::St1 => 0.045,
            Self::Sc1 => 0.015,
        }
    }

    /// Lowercase class name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gp3 => "gp3",
            Self::Gp2 => "gp2",
            Self::St1 => "st1",
            Self::Sc1 => "sc1",
        }
    }
}

impl fmt::Display for VolumeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VolumeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gp3" => Ok(Self::Gp3),
            "gp2" => Ok(Self::Gp2),
            "st1" => Ok(Self::St1),
            "sc1" => Ok(Self::Sc1),
            other => Err(format!("unknown volume class '{other}' (expected gp3, gp2, st1 or sc1)")),
        }
    }
}

/// gp3 price sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gp3Pricing {
    /// Storage rate per GiB-month
    pub storage_rate: f64,
    /// IOPS included for free
    pub iops_baseline: f64,
    /// Rate per provisioned IOPS above the baseline
    pub iops_rate: f64,
    /// Throughput included for free; also the size threshold below which no
    /// provisioned performance is charged
    pub throughput_baseline: f64,
    /// Rate per provisioned throughput unit above the baseline
    pub throughput_rate: f64,
}

impl Default for Gp3Pricing {
    fn default() -> Self {
        Self {
            storage_rate: 0.08,
            iops_baseline: 3000.0,
            iops_rate: 0.005,
            throughput_baseline: 125.0,
            throughput_rate: 0.040,
        }
    }
}

impl Gp3Pricing {
    /// Cost of a volume inside the free baseline: storage only
    pub fn baseline_cost(&self, size: f64) -> f64 {
        size * self.storage_rate
    }

    /// Cost of a volume above the threshold: storage plus provisioned
    /// IOPS and throughput for the excess over each baseline
    pub fn provisioned_cost(&self, size: f64) -> f64 {
        let iops_cost = (size - self.iops_baseline).max(0.0) * self.iops_rate;
        let throughput_cost = (size - self.throughput_baseline).max(0.0) * self.throughput_rate;
        size * self.storage_rate + iops_cost + throughput_cost
    }

    /// Monthly cost of one volume of `size` GiB
    pub fn volume_cost(&self, size: f64) -> f64 {
        if size <= self.throughput_baseline {
            self.baseline_cost(size)
        } else {
            self.provisioned_cost(size)
        }
    }
}

/// Cost model pricing every gene as one volume of the configured class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeCostModel {
    /// Volume class being priced
    pub class: VolumeClass,
    /// gp3 price sheet (used when `class` is gp3)
    pub gp3: Gp3Pricing,
}

impl VolumeCostModel {
    /// Create a cost model for a class with default rates
    pub fn new(class: VolumeClass) -> Self {
        Self {
            class,
            gp3: Gp3Pricing::default(),
        }
    }

    /// gp3 cost model with a custom price sheet
    pub fn gp3(pricing: Gp3Pricing) -> Self {
        Self {
            class: VolumeClass::Gp3,
            gp3: pricing,
        }
    }

    /// Monthly cost of one volume of `size` GiB
    pub fn volume_cost(&self, size: f64) -> Result<f64, EvaluationError> {
        if size.is_nan() || size < 0.0 {
            return Err(EvaluationError::Failed(format!(
                "volume size must be a non-negative number of GiB, got {size}"
            )));
        }
        Ok(match self.class {
            VolumeClass::Gp3 => self.gp3.volume_cost(size),
            class => size * class.storage_rate(),
        })
    }
}

impl CostModel for VolumeCostModel {
    type Genome = RealVector;

    fn evaluate(&self, genome: &RealVector) -> Result<f64, EvaluationError> {
        if genome.dimension() == 0 {
            return Err(EvaluationError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        genome
            .genes()
            .iter()
            .try_fold(0.0, |total, &size| Ok(total + self.volume_cost(size)?))
    }
}
