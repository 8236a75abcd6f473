use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::{compute_daily_metrics, MetricsConfig};
use crate::errors::LedgerError;

/// Validated raw inputs for one day.
///
/// The unsigned field types carry the non-negativity rule; use
/// [`DailyInputs::try_new`] when values come from an untrusted boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyInputs {
    pub date: NaiveDate,
    pub orders_placed: u32,
    pub orders_delivered: u32,
    pub revenue: u64,
    pub costs: u64,
    pub ad_spend_nominal: u64,
}

impl DailyInputs {
    pub fn try_new(
        date: NaiveDate,
        orders_placed: i64,
        orders_delivered: i64,
        revenue: i64,
        costs: i64,
        ad_spend_nominal: i64,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            date,
            orders_placed: count("orders_placed", orders_placed)?,
            orders_delivered: count("orders_delivered", orders_delivered)?,
            revenue: amount("revenue", revenue)?,
            costs: amount("costs", costs)?,
            ad_spend_nominal: amount("ad_spend_nominal", ad_spend_nominal)?,
        })
    }
}

/// Parses a whole, non-negative number typed by a user.
pub fn parse_whole(field: &str, raw: &str) -> Result<i64, LedgerError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| LedgerError::Validation(format!("{field} must be a whole number, got `{raw}`")))
}

fn count(field: &str, value: i64) -> Result<u32, LedgerError> {
    if value < 0 {
        return Err(LedgerError::Validation(format!(
            "{field} cannot be negative ({value})"
        )));
    }
    u32::try_from(value)
        .map_err(|_| LedgerError::Validation(format!("{field} is out of range ({value})")))
}

fn amount(field: &str, value: i64) -> Result<u64, LedgerError> {
    u64::try_from(value)
        .map_err(|_| LedgerError::Validation(format!("{field} cannot be negative ({value})")))
}

/// One calendar day's entry, raw inputs plus every derived column.
///
/// Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub orders_placed: u32,
    pub orders_delivered: u32,
    pub orders_lost: u32,
    pub delivery_rate: f64,
    pub revenue: u64,
    pub costs: u64,
    pub ad_spend_nominal: u64,
    pub ad_spend_effective: u64,
    pub net_profit: i64,
    pub profit_rate: f64,
    pub daily_objective: u32,
    pub cumulative_deficit: u32,
}

impl DailyRecord {
    /// Builds a record with per-day fields derived; the deficit stays 0 until
    /// the owning ledger recomputes it.
    pub fn from_inputs(inputs: DailyInputs, config: &MetricsConfig) -> Self {
        let metrics = compute_daily_metrics(&inputs, config);
        Self {
            date: inputs.date,
            orders_placed: inputs.orders_placed,
            orders_delivered: inputs.orders_delivered,
            orders_lost: metrics.orders_lost,
            delivery_rate: metrics.delivery_rate,
            revenue: inputs.revenue,
            costs: inputs.costs,
            ad_spend_nominal: inputs.ad_spend_nominal,
            ad_spend_effective: metrics.ad_spend_effective,
            net_profit: metrics.net_profit,
            profit_rate: metrics.profit_rate,
            daily_objective: metrics.daily_objective,
            cumulative_deficit: 0,
        }
    }

    pub fn inputs(&self) -> DailyInputs {
        DailyInputs {
            date: self.date,
            orders_placed: self.orders_placed,
            orders_delivered: self.orders_delivered,
            revenue: self.revenue,
            costs: self.costs,
            ad_spend_nominal: self.ad_spend_nominal,
        }
    }

    /// Re-derives the per-day fields from the stored raw inputs.
    pub fn refresh(&mut self, config: &MetricsConfig) {
        let deficit = self.cumulative_deficit;
        *self = Self::from_inputs(self.inputs(), config);
        self.cumulative_deficit = deficit;
    }
}

impl From<&DailyRecord> for DailyInputs {
    fn from(record: &DailyRecord) -> Self {
        record.inputs()
    }
}
