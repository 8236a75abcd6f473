//! Full-history recomputation of the cumulative parcel deficit.

use super::record::DailyRecord;

/// Rewrites `cumulative_deficit` on every record from scratch and returns the
/// closing deficit.
///
/// Records must already be in chronological order. Each day adds its objective
/// and subtracts its deliveries; the running total never drops below zero, so
/// a surplus day pays down debt but is not banked as credit. Objectives below
/// `objective_floor` are raised to the floor first.
pub fn recompute_deficit(records: &mut [DailyRecord], objective_floor: u32) -> u32 {
    let mut running: u32 = 0;
    for record in records.iter_mut() {
        record.daily_objective = record.daily_objective.max(objective_floor);
        running = running
            .saturating_add(record.daily_objective)
            .saturating_sub(record.orders_delivered);
        record.cumulative_deficit = running;
    }
    tracing::debug!(
        days = records.len(),
        closing_deficit = running,
        "recomputed cumulative deficit"
    );
    running
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::metrics::MetricsConfig;
    use crate::ledger::record::DailyInputs;
    use chrono::NaiveDate;

    fn day(d: u32, delivered: u32) -> DailyRecord {
        let inputs = DailyInputs {
            date: NaiveDate::from_ymd_opt(2025, 1, d).unwrap(),
            orders_placed: delivered,
            orders_delivered: delivered,
            revenue: 0,
            costs: 0,
            ad_spend_nominal: 0,
        };
        DailyRecord::from_inputs(inputs, &MetricsConfig::default())
    }

    fn deficits(records: &[DailyRecord]) -> Vec<u32> {
        records.iter().map(|r| r.cumulative_deficit).collect()
    }

    #[test]
    fn empty_ledger_has_no_deficit() {
        assert_eq!(recompute_deficit(&mut [], 4), 0);
    }

    #[test]
    fn running_deficit_carries_shortfall_forward() {
        let mut records = vec![day(1, 2), day(2, 5), day(3, 1)];
        let closing = recompute_deficit(&mut records, 4);
        assert_eq!(deficits(&records), vec![2, 1, 4]);
        assert_eq!(closing, 4);
    }

    #[test]
    fn deleting_a_day_ripples_forward() {
        let mut records = vec![day(1, 2), day(2, 5), day(3, 1)];
        recompute_deficit(&mut records, 4);
        records.remove(1);
        let closing = recompute_deficit(&mut records, 4);
        assert_eq!(deficits(&records), vec![2, 5]);
        assert_eq!(closing, 5);
    }

    #[test]
    fn surplus_never_becomes_credit() {
        let mut records = vec![day(1, 12), day(2, 0)];
        recompute_deficit(&mut records, 4);
        assert_eq!(deficits(&records), vec![0, 4]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let mut records = vec![day(1, 0), day(2, 9), day(3, 3), day(4, 1)];
        let first = recompute_deficit(&mut records, 4);
        let snapshot = deficits(&records);
        let second = recompute_deficit(&mut records, 4);
        assert_eq!(first, second);
        assert_eq!(snapshot, deficits(&records));
    }

    #[test]
    fn corrupted_objective_is_raised_to_floor() {
        let mut records = vec![day(1, 0)];
        records[0].daily_objective = 1;
        records[0].cumulative_deficit = 99;
        recompute_deficit(&mut records, 4);
        assert_eq!(records[0].daily_objective, 4);
        assert_eq!(records[0].cumulative_deficit, 4);
    }
}
