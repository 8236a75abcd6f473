use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::{metrics::profit_rate, DailyRecord, Period, PeriodLedger};

pub const DEFAULT_MONTHLY_GOAL: u64 = 1_000_000;
pub const DEFAULT_PROFIT_PER_PARCEL: u64 = 2_000;

/// Monthly profit target and the profit one delivered parcel is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default = "GoalConfig::default_monthly_goal")]
    pub monthly_goal: u64,
    #[serde(default = "GoalConfig::default_profit_per_parcel")]
    pub profit_per_parcel: u64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            monthly_goal: DEFAULT_MONTHLY_GOAL,
            profit_per_parcel: DEFAULT_PROFIT_PER_PARCEL,
        }
    }
}

impl GoalConfig {
    pub fn default_monthly_goal() -> u64 {
        DEFAULT_MONTHLY_GOAL
    }

    pub fn default_profit_per_parcel() -> u64 {
        DEFAULT_PROFIT_PER_PARCEL
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub orders_placed: u64,
    pub orders_delivered: u64,
    pub orders_lost: u64,
    pub revenue: u64,
    pub costs: u64,
    pub net_profit: i64,
    pub ad_spend_nominal: u64,
    pub ad_spend_effective: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub goal_amount: u64,
    pub achieved: i64,
    pub remaining: u64,
    /// Clamped to at least one day.
    pub days_remaining: u32,
    /// `None` once the goal is met, or when no per-parcel profit is configured.
    pub required_daily_parcels: Option<u64>,
}

impl GoalProgress {
    pub fn is_met(&self) -> bool {
        self.remaining == 0
    }
}

/// Qualitative reading of a period's health. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    Loss,
    FragilePositive,
    AtRisk,
    Strong,
    Stable,
}

impl Advisory {
    pub fn describe(&self) -> &'static str {
        match self {
            Advisory::Loss => "loss: spending exceeds what the period brought in",
            Advisory::FragilePositive => "fragile: profitable but a parcel deficit is outstanding",
            Advisory::AtRisk => "at risk: profit is below the effective ad spend",
            Advisory::Strong => "strong: profit covers twice the effective ad spend",
            Advisory::Stable => "stable",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Advisory::Loss => "loss",
            Advisory::FragilePositive => "fragile-positive",
            Advisory::AtRisk => "at-risk",
            Advisory::Strong => "strong",
            Advisory::Stable => "stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub days_recorded: usize,
    pub totals: PeriodTotals,
    pub overall_profit_rate: f64,
    pub cumulative_deficit: u32,
    pub goal: GoalProgress,
    pub advisory: Advisory,
    pub latest: Option<DailyRecord>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn totals(records: &[DailyRecord]) -> PeriodTotals {
        records
            .iter()
            .fold(PeriodTotals::default(), |mut totals, record| {
                totals.orders_placed += u64::from(record.orders_placed);
                totals.orders_delivered += u64::from(record.orders_delivered);
                totals.orders_lost += u64::from(record.orders_lost);
                totals.revenue = totals.revenue.saturating_add(record.revenue);
                totals.costs = totals.costs.saturating_add(record.costs);
                totals.net_profit = totals.net_profit.saturating_add(record.net_profit);
                totals.ad_spend_nominal =
                    totals.ad_spend_nominal.saturating_add(record.ad_spend_nominal);
                totals.ad_spend_effective =
                    totals.ad_spend_effective.saturating_add(record.ad_spend_effective);
                totals
            })
    }

    pub fn overall_profit_rate(totals: &PeriodTotals) -> f64 {
        profit_rate(totals.net_profit, totals.revenue)
    }

    /// Parcels per remaining day needed to close the gap to `goal_amount`,
    /// rounded up.
    pub fn goal_progress(
        monthly_profit: i64,
        goal_amount: u64,
        days_remaining: u32,
        profit_per_parcel: u64,
    ) -> GoalProgress {
        let days_remaining = days_remaining.max(1);
        let gap = goal_amount as i128 - monthly_profit as i128;
        let remaining = u64::try_from(gap.max(0)).unwrap_or(u64::MAX);
        let required_daily_parcels = if remaining > 0 && profit_per_parcel > 0 {
            let per_day = profit_per_parcel as u128 * days_remaining as u128;
            u64::try_from((remaining as u128).div_ceil(per_day)).ok()
        } else {
            None
        };
        GoalProgress {
            goal_amount,
            achieved: monthly_profit,
            remaining,
            days_remaining,
            required_daily_parcels,
        }
    }

    /// Checks run in order: loss, outstanding deficit, thin margin over ads,
    /// comfortable margin, otherwise stable.
    ///
    /// Strong also requires a positive profit, so a month with zero profit and
    /// zero ad spend reads as stable rather than strong.
    pub fn classify(net_profit: i64, cumulative_deficit: u32, ad_spend_effective: u64) -> Advisory {
        let profit = net_profit as i128;
        let ads = ad_spend_effective as i128;
        if net_profit < 0 {
            Advisory::Loss
        } else if cumulative_deficit > 0 {
            Advisory::FragilePositive
        } else if profit < ads {
            Advisory::AtRisk
        } else if net_profit > 0 && profit >= 2 * ads {
            Advisory::Strong
        } else {
            Advisory::Stable
        }
    }

    pub fn summarize(ledger: &PeriodLedger, goal: &GoalConfig, days_remaining: u32) -> PeriodSummary {
        let records = ledger.list();
        let totals = Self::totals(records);
        let cumulative_deficit = ledger.cumulative_deficit();
        PeriodSummary {
            period: ledger.period(),
            days_recorded: records.len(),
            overall_profit_rate: Self::overall_profit_rate(&totals),
            cumulative_deficit,
            goal: Self::goal_progress(
                totals.net_profit,
                goal.monthly_goal,
                days_remaining,
                goal.profit_per_parcel,
            ),
            advisory: Self::classify(
                totals.net_profit,
                cumulative_deficit,
                totals.ad_spend_effective,
            ),
            latest: records.last().cloned(),
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DailyInputs, MetricsConfig};
    use chrono::NaiveDate;

    fn ledger() -> PeriodLedger {
        let period = Period::new(2025, 5).unwrap();
        let rows = [(1, 5, 2, 5_000, 2_000, 1_000), (2, 6, 5, 9_000, 3_000, 2_000)]
            .into_iter()
            .map(|(d, placed, delivered, revenue, costs, ads)| DailyInputs {
                date: NaiveDate::from_ymd_opt(2025, 5, d).unwrap(),
                orders_placed: placed,
                orders_delivered: delivered,
                revenue,
                costs,
                ad_spend_nominal: ads,
            });
        PeriodLedger::from_inputs(period, MetricsConfig::with_tax_rate(0.1), rows).unwrap()
    }

    #[test]
    fn totals_sum_every_column() {
        let totals = SummaryService::totals(ledger().list());
        assert_eq!(totals.orders_placed, 11);
        assert_eq!(totals.orders_delivered, 7);
        assert_eq!(totals.orders_lost, 4);
        assert_eq!(totals.revenue, 14_000);
        assert_eq!(totals.costs, 5_000);
        assert_eq!(totals.ad_spend_nominal, 3_000);
        assert_eq!(totals.ad_spend_effective, 3_300);
        assert_eq!(totals.net_profit, 5_700);
    }

    #[test]
    fn overall_rate_guards_zero_revenue() {
        assert_eq!(
            SummaryService::overall_profit_rate(&PeriodTotals::default()),
            0.0
        );
        let totals = SummaryService::totals(ledger().list());
        assert_eq!(SummaryService::overall_profit_rate(&totals), 40.71);
    }

    #[test]
    fn goal_progress_rounds_parcels_up() {
        let progress = SummaryService::goal_progress(400_000, 1_000_000, 10, 2_000);
        assert_eq!(progress.remaining, 600_000);
        assert_eq!(progress.required_daily_parcels, Some(30));

        let progress = SummaryService::goal_progress(400_001, 1_000_000, 10, 2_000);
        assert_eq!(progress.required_daily_parcels, Some(30));
        let progress = SummaryService::goal_progress(399_999, 1_000_000, 10, 2_000);
        assert_eq!(progress.required_daily_parcels, Some(31));
    }

    #[test]
    fn goal_progress_clamps_days_and_detects_met_goal() {
        let progress = SummaryService::goal_progress(0, 10_000, 0, 2_000);
        assert_eq!(progress.days_remaining, 1);
        assert_eq!(progress.required_daily_parcels, Some(5));

        let met = SummaryService::goal_progress(1_200_000, 1_000_000, 5, 2_000);
        assert!(met.is_met());
        assert_eq!(met.required_daily_parcels, None);

        let no_parcel_value = SummaryService::goal_progress(-50, 100, 3, 0);
        assert_eq!(no_parcel_value.remaining, 150);
        assert_eq!(no_parcel_value.required_daily_parcels, None);
    }

    #[test]
    fn classification_follows_thresholds() {
        assert_eq!(SummaryService::classify(-1, 0, 0), Advisory::Loss);
        assert_eq!(SummaryService::classify(5_000, 3, 1_000), Advisory::FragilePositive);
        assert_eq!(SummaryService::classify(900, 0, 1_000), Advisory::AtRisk);
        assert_eq!(SummaryService::classify(2_000, 0, 1_000), Advisory::Strong);
        assert_eq!(SummaryService::classify(1_500, 0, 1_000), Advisory::Stable);
        assert_eq!(SummaryService::classify(0, 0, 0), Advisory::Stable);
    }

    #[test]
    fn summarize_reports_latest_deficit() {
        let ledger = ledger();
        let summary = SummaryService::summarize(&ledger, &GoalConfig::default(), 29);
        assert_eq!(summary.days_recorded, 2);
        assert_eq!(summary.cumulative_deficit, 1);
        assert_eq!(summary.advisory, Advisory::FragilePositive);
        assert_eq!(summary.latest.map(|r| r.date.to_string()), Some("2025-05-02".into()));
        assert_eq!(summary.goal.remaining, 1_000_000 - 5_700);
    }
}
