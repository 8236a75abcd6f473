//! Period ledger domain: daily records, per-day metrics, and the deficit engine.

pub mod deficit;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod metrics;
pub mod period;
pub mod record;

pub use deficit::recompute_deficit;
pub use ledger::{Mutation, PeriodLedger};
pub use metrics::{compute_daily_metrics, DailyMetrics, MetricsConfig};
pub use period::Period;
pub use record::{parse_whole, DailyInputs, DailyRecord};
