//! Common utilities
//!
//! - Decimal round-half-up arithmetic shared by the feature functions

pub mod decimal;

pub use decimal::{divide_half_up, divide_integers_half_up, round_half_up};
