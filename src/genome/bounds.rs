//! Bounds for gene values

use serde::{Deserialize, Serialize};

/// Inclusive range of valid gene values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl Bounds {
    /// Create new bounds
    ///
    /// # Panics
    /// Panics if min > max
    pub fn new(min: f64, max: f64) -> Self {
        assert!(
            min <= max,
            "Invalid bounds: min ({}) must be <= max ({})",
            min,
            max
        );
        Self { min, max }
    }

    /// Check that both ends are finite and ordered
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Check if a value is within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value to be within bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_new() {
        let b = Bounds::new(1.0, 16384.0);
        assert_eq!(b.min, 1.0);
        assert_eq!(b.max, 16384.0);
        assert_eq!(b.range(), 16383.0);
    }

    #[test]
    #[should_panic(expected = "Invalid bounds")]
    fn test_bounds_invalid() {
        Bounds::new(5.0, -5.0);
    }

    #[test]
    fn test_bounds_is_valid() {
        assert!(Bounds::new(0.0, 0.0).is_valid());
        assert!(!Bounds {
            min: f64::NEG_INFINITY,
            max: 1.0
        }
        .is_valid());
        assert!(!Bounds { min: 2.0, max: 1.0 }.is_valid());
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(50.0, 500.0);
        assert!(b.contains(50.0));
        assert!(b.contains(500.0));
        assert!(!b.contains(49.9));
        assert!(!b.contains(500.1));
    }

    #[test]
    fn test_bounds_clamp() {
        let b = Bounds::new(50.0, 500.0);
        assert_eq!(b.clamp(100.0), 100.0);
        assert_eq!(b.clamp(-10.0), 50.0);
        assert_eq!(b.clamp(900.0), 500.0);
    }
}
