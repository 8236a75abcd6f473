pub mod csv_backend;

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::{
    errors::Result,
    ledger::{MetricsConfig, Period, PeriodLedger},
};

/// Outcome of loading a period from storage.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: PeriodLedger,
    pub path: PathBuf,
    /// False when no file existed and an empty ledger was created.
    pub existed: bool,
    /// Normalizations applied while loading (reordering, corrected objectives, stale deficits).
    pub warnings: Vec<String>,
}

/// A saved copy of a period file, taken before it was overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<NaiveDateTime>,
}

/// Abstraction over persistence backends that store one file per period.
pub trait StorageBackend: Send + Sync {
    fn load(&self, period: Period, config: &MetricsConfig) -> Result<LoadReport>;
    fn save(&self, ledger: &PeriodLedger) -> Result<PathBuf>;
    fn ledger_path(&self, period: Period) -> PathBuf;
    fn list_backups(&self, period: Period) -> Result<Vec<BackupInfo>>;
    fn restore_backup(
        &self,
        period: Period,
        backup_name: &str,
        config: &MetricsConfig,
    ) -> Result<LoadReport>;
}

pub use csv_backend::{CsvStorage, COLUMNS};
