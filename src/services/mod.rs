//! Business services: the fee rate approval workflow, dashboard
//! aggregation, and payment plan derivation.

pub mod dashboard;
pub mod fee_plan;
pub mod fee_rate;

pub use dashboard::DashboardService;
pub use fee_rate::FeeRateService;
