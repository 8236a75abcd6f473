//! Pure per-day calculations: effective ad spend, profit, rates, and the
//! parcel objective.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::DailyInputs;

/// Minimum number of parcels expected on any day.
pub const DEFAULT_OBJECTIVE_FLOOR: u32 = 4;
/// Effective ad spend that corresponds to exactly the floor objective.
pub const DEFAULT_REFERENCE_SPEND: u64 = 6_850;
/// Largest accepted tax rate (1000%).
pub const MAX_TAX_RATE: f64 = 10.0;

/// Deployment constants that drive the per-day derivations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Fraction added on top of nominal ad spend (0.1 = 10%).
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default = "MetricsConfig::default_objective_floor")]
    pub objective_floor: u32,
    #[serde(default = "MetricsConfig::default_reference_spend")]
    pub reference_spend: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.0,
            objective_floor: DEFAULT_OBJECTIVE_FLOOR,
            reference_spend: DEFAULT_REFERENCE_SPEND,
        }
    }
}

impl MetricsConfig {
    pub fn with_tax_rate(tax_rate: f64) -> Self {
        Self {
            tax_rate,
            ..Self::default()
        }
    }

    pub fn default_objective_floor() -> u32 {
        DEFAULT_OBJECTIVE_FLOOR
    }

    pub fn default_reference_spend() -> u64 {
        DEFAULT_REFERENCE_SPEND
    }

    /// `1 + tax_rate` as an exact decimal, parsed from the rate's shortest
    /// decimal form so that `0.1` means one tenth. Negative or non-finite rates
    /// count as zero; `None` means the rate is beyond decimal range.
    fn tax_multiplier(&self) -> Option<Decimal> {
        if !self.tax_rate.is_finite() || self.tax_rate <= 0.0 {
            return Some(Decimal::ONE);
        }
        Decimal::from_str(&self.tax_rate.to_string())
            .ok()
            .and_then(|rate| Decimal::ONE.checked_add(rate))
    }
}

/// Values derived from one day's raw inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyMetrics {
    pub orders_lost: u32,
    pub delivery_rate: f64,
    pub ad_spend_effective: u64,
    pub net_profit: i64,
    pub profit_rate: f64,
    pub daily_objective: u32,
}

/// Derives every computed per-day field from raw inputs.
pub fn compute_daily_metrics(inputs: &DailyInputs, config: &MetricsConfig) -> DailyMetrics {
    let ad_spend_effective = effective_ad_spend(inputs.ad_spend_nominal, config);
    let net_profit = net_profit(inputs.revenue, inputs.costs, ad_spend_effective);
    DailyMetrics {
        orders_lost: orders_lost(inputs.orders_placed, inputs.orders_delivered),
        delivery_rate: delivery_rate(inputs.orders_delivered, inputs.orders_placed),
        ad_spend_effective,
        net_profit,
        profit_rate: profit_rate(net_profit, inputs.revenue),
        daily_objective: daily_objective(ad_spend_effective, config),
    }
}

/// `floor(nominal × (1 + tax_rate))` in decimal arithmetic, saturating at
/// `u64::MAX`.
pub fn effective_ad_spend(nominal: u64, config: &MetricsConfig) -> u64 {
    if nominal == 0 {
        return 0;
    }
    config
        .tax_multiplier()
        .and_then(|multiplier| Decimal::from(nominal).checked_mul(multiplier))
        .and_then(|grossed| grossed.floor().to_u64())
        .unwrap_or(u64::MAX)
}

pub fn net_profit(revenue: u64, costs: u64, ad_spend_effective: u64) -> i64 {
    let profit = revenue as i128 - costs as i128 - ad_spend_effective as i128;
    profit.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Net profit as a share of revenue; zero revenue yields 0.
pub fn profit_rate(net_profit: i64, revenue: u64) -> f64 {
    if revenue == 0 {
        return 0.0;
    }
    round2(net_profit as f64 / revenue as f64 * 100.0)
}

/// Delivered orders as a share of placed orders, capped at 100.
///
/// Deliveries can exceed the day's placements when a backlog is cleared.
pub fn delivery_rate(delivered: u32, placed: u32) -> f64 {
    if placed == 0 {
        return 0.0;
    }
    round2(delivered as f64 / placed as f64 * 100.0).min(100.0)
}

pub fn orders_lost(placed: u32, delivered: u32) -> u32 {
    placed.saturating_sub(delivered)
}

/// `max(F, ceil(effective / R × F))`, or `F` when nothing was spent.
pub fn daily_objective(ad_spend_effective: u64, config: &MetricsConfig) -> u32 {
    let floor = config.objective_floor;
    if ad_spend_effective == 0 || config.reference_spend == 0 {
        return floor;
    }
    let reference = config.reference_spend as u128;
    let scaled = (ad_spend_effective as u128 * floor as u128).div_ceil(reference);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(floor)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
