//! Entry points used by presentation layers to derive and mutate daily records.

use crate::errors::Result;
use crate::ledger::{
    compute_daily_metrics, DailyInputs, DailyMetrics, MetricsConfig, Mutation, PeriodLedger,
};

/// Stateless helpers around [`PeriodLedger`] mutations.
pub struct LedgerService;

impl LedgerService {
    /// Derives the per-day fields for raw inputs without touching a ledger.
    pub fn compute_daily_metrics(inputs: &DailyInputs, config: &MetricsConfig) -> DailyMetrics {
        compute_daily_metrics(inputs, config)
    }

    /// Returns a copy of `ledger` with `mutation` applied and every derived
    /// column recomputed. The input ledger is never modified, so a caller can
    /// persist the result first and only then adopt it.
    pub fn apply_mutation(ledger: &PeriodLedger, mutation: Mutation) -> Result<PeriodLedger> {
        let mut updated = ledger.clone();
        let verb = mutation.verb();
        let date = mutation.date();
        if let Err(err) = updated.apply(mutation) {
            tracing::debug!(%date, verb, error = %err, "mutation rejected");
            return Err(err);
        }
        Ok(updated)
    }
}
