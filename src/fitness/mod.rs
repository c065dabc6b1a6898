//! Cost models
//!
//! This module provides the cost model abstraction and the block storage
//! pricing models.

pub mod pricing;
pub mod traits;

pub mod prelude {
    pub use super::pricing::*;
    pub use super::traits::*;
}
