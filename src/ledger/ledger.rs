use std::collections::HashSet;

use chrono::NaiveDate;

use super::{
    deficit::recompute_deficit,
    metrics::MetricsConfig,
    period::Period,
    record::{DailyInputs, DailyRecord},
};
use crate::errors::{LedgerError, Result};

/// A single change to a period ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Insert(DailyInputs),
    Update { date: NaiveDate, inputs: DailyInputs },
    Delete(NaiveDate),
}

impl Mutation {
    pub fn date(&self) -> NaiveDate {
        match self {
            Mutation::Insert(inputs) => inputs.date,
            Mutation::Update { date, .. } | Mutation::Delete(date) => *date,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Mutation::Insert(_) => "insert",
            Mutation::Update { .. } => "update",
            Mutation::Delete(_) => "delete",
        }
    }
}

/// The ordered daily records of one calendar month.
///
/// Records are kept oldest first with unique dates. Every successful mutation
/// re-derives all per-day fields and the whole deficit series before
/// returning; a failed mutation leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodLedger {
    period: Period,
    config: MetricsConfig,
    records: Vec<DailyRecord>,
}

impl PeriodLedger {
    pub fn new(period: Period, config: MetricsConfig) -> Self {
        Self {
            period,
            config,
            records: Vec::new(),
        }
    }

    /// Builds a ledger from rows in any order, sorting them by date.
    pub fn from_inputs(
        period: Period,
        config: MetricsConfig,
        rows: impl IntoIterator<Item = DailyInputs>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for inputs in rows {
            ensure_in_period(period, inputs.date)?;
            if !seen.insert(inputs.date) {
                return Err(LedgerError::DuplicateKey(inputs.date));
            }
            records.push(DailyRecord::from_inputs(inputs, &config));
        }
        records.sort_by_key(|record| record.date);
        let mut ledger = Self {
            period,
            config,
            records,
        };
        ledger.recompute();
        Ok(ledger)
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn metrics_config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Records oldest first.
    pub fn list(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.position(date).map(|idx| &self.records[idx])
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Deficit carried by the latest day, or 0 for an empty ledger.
    pub fn cumulative_deficit(&self) -> u32 {
        self.records
            .last()
            .map(|record| record.cumulative_deficit)
            .unwrap_or(0)
    }

    /// Adds a new day at its date position. A back-dated entry lands before
    /// later days rather than at the end, and every later deficit is redone.
    pub fn insert(&mut self, inputs: DailyInputs) -> Result<()> {
        ensure_in_period(self.period, inputs.date)?;
        if self.contains(inputs.date) {
            return Err(LedgerError::DuplicateKey(inputs.date));
        }
        let idx = self
            .records
            .partition_point(|record| record.date < inputs.date);
        self.records
            .insert(idx, DailyRecord::from_inputs(inputs, &self.config));
        self.recompute();
        tracing::info!(period = %self.period, date = %inputs.date, "inserted daily record");
        Ok(())
    }

    /// Replaces the raw inputs of an existing day, keeping its position.
    pub fn update(&mut self, date: NaiveDate, inputs: DailyInputs) -> Result<()> {
        if inputs.date != date {
            return Err(LedgerError::Validation(format!(
                "record dated {} cannot replace the entry for {date}",
                inputs.date
            )));
        }
        let idx = self.position(date).ok_or(LedgerError::NotFound(date))?;
        self.records[idx] = DailyRecord::from_inputs(inputs, &self.config);
        self.recompute();
        tracing::info!(period = %self.period, %date, "updated daily record");
        Ok(())
    }

    pub fn delete(&mut self, date: NaiveDate) -> Result<DailyRecord> {
        let idx = self.position(date).ok_or(LedgerError::NotFound(date))?;
        let removed = self.records.remove(idx);
        self.recompute();
        tracing::info!(period = %self.period, %date, "deleted daily record");
        Ok(removed)
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<()> {
        match mutation {
            Mutation::Insert(inputs) => self.insert(inputs),
            Mutation::Update { date, inputs } => self.update(date, inputs),
            Mutation::Delete(date) => self.delete(date).map(|_| ()),
        }
    }

    /// Swaps the metrics configuration and re-derives every record under it.
    pub fn set_metrics_config(&mut self, config: MetricsConfig) {
        self.config = config;
        self.recompute();
    }

    fn position(&self, date: NaiveDate) -> Option<usize> {
        self.records
            .binary_search_by_key(&date, |record| record.date)
            .ok()
    }

    fn recompute(&mut self) {
        for record in &mut self.records {
            record.refresh(&self.config);
        }
        recompute_deficit(&mut self.records, self.config.objective_floor);
    }
}

fn ensure_in_period(period: Period, date: NaiveDate) -> Result<()> {
    if period.contains(date) {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "{date} is outside the {period} period"
        )))
    }
}
