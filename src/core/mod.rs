//! Core infrastructure module for the probeset ranker.
//!
//! - [`types`]: feature scores, predictions, measure names
//! - [`constants`]: configuration defaults
//! - [`error`]: the crate error type
//! - [`traits`]: trainer and model seams consumed by the core algorithms

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{RankerError, Result};
pub use traits::*;
pub use types::*;
