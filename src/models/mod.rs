//! Domain models shared across services and handlers.

pub mod fee_rate;

pub use fee_rate::{validate_fee_percentage, FeeRate, RateStats, RateStatus};
