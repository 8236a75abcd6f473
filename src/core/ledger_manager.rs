use std::path::PathBuf;

use crate::core::services::{GoalConfig, LedgerService, PeriodSummary, SummaryService};
use crate::errors::{LedgerError, Result};
use crate::ledger::{MetricsConfig, Mutation, Period, PeriodLedger};
use crate::storage::{BackupInfo, LoadReport, StorageBackend};

/// Metadata describing the outcome of opening a period.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub period: Period,
    pub path: PathBuf,
    pub existed: bool,
    pub record_count: usize,
    pub warnings: Vec<String>,
}

/// Facade that owns the open period ledger and its persistence.
///
/// Mutations go through a load, mutate, persist cycle: the change is applied to
/// a copy, the copy is saved, and only then does it replace the open ledger.
pub struct LedgerManager {
    current: Option<PeriodLedger>,
    metrics: MetricsConfig,
    goal: GoalConfig,
    storage: Box<dyn StorageBackend>,
}

impl LedgerManager {
    pub fn new(storage: Box<dyn StorageBackend>, metrics: MetricsConfig, goal: GoalConfig) -> Self {
        Self {
            current: None,
            metrics,
            goal,
            storage,
        }
    }

    pub fn current(&self) -> Option<&PeriodLedger> {
        self.current.as_ref()
    }

    pub fn current_period(&self) -> Option<Period> {
        self.current.as_ref().map(PeriodLedger::period)
    }

    pub fn open(&mut self, period: Period) -> Result<LoadMetadata> {
        let report = self.storage.load(period, &self.metrics)?;
        Ok(self.adopt(report))
    }

    /// Applies and persists `mutation`, returning the file written.
    pub fn apply(&mut self, mutation: Mutation) -> Result<PathBuf> {
        let ledger = self.current.as_ref().ok_or(LedgerError::NotLoaded)?;
        let updated = LedgerService::apply_mutation(ledger, mutation)?;
        let path = self.storage.save(&updated)?;
        self.current = Some(updated);
        Ok(path)
    }

    /// Swaps the deployment constants. An open month is re-derived under the
    /// new metrics and persisted before it replaces the current ledger.
    pub fn reconfigure(
        &mut self,
        metrics: MetricsConfig,
        goal: GoalConfig,
    ) -> Result<Option<PathBuf>> {
        let mut written = None;
        if let Some(ledger) = self.current.as_ref() {
            if *ledger.metrics_config() != metrics {
                let mut updated = ledger.clone();
                updated.set_metrics_config(metrics);
                written = Some(self.storage.save(&updated)?);
                self.current = Some(updated);
            }
        }
        self.metrics = metrics;
        self.goal = goal;
        tracing::info!(tax_rate = metrics.tax_rate, "applied new metrics configuration");
        Ok(written)
    }

    pub fn summary(&self, days_remaining: u32) -> Result<PeriodSummary> {
        let ledger = self.current.as_ref().ok_or(LedgerError::NotLoaded)?;
        Ok(SummaryService::summarize(ledger, &self.goal, days_remaining))
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        let period = self.current_period().ok_or(LedgerError::NotLoaded)?;
        self.storage.list_backups(period)
    }

    pub fn restore(&mut self, backup_name: &str) -> Result<LoadMetadata> {
        let period = self.current_period().ok_or(LedgerError::NotLoaded)?;
        let report = self
            .storage
            .restore_backup(period, backup_name, &self.metrics)?;
        Ok(self.adopt(report))
    }

    pub fn ledger_path(&self, period: Period) -> PathBuf {
        self.storage.ledger_path(period)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    fn adopt(&mut self, report: LoadReport) -> LoadMetadata {
        let metadata = LoadMetadata {
            period: report.ledger.period(),
            path: report.path,
            existed: report.existed,
            record_count: report.ledger.len(),
            warnings: report.warnings,
        };
        tracing::info!(
            period = %metadata.period,
            records = metadata.record_count,
            "opened period ledger"
        );
        self.current = Some(report.ledger);
        metadata
    }
}
