#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use parcel_ledger::{
    config::ConfigManager,
    core::{ledger_manager::LedgerManager, services::GoalConfig},
    ledger::{DailyInputs, MetricsConfig},
    storage::CsvStorage,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (LedgerManager, ConfigManager) {
    let base = temp_base();
    let storage = CsvStorage::new(base.clone(), Some(3)).expect("create csv storage backend");
    let ledger_manager = LedgerManager::new(
        Box::new(storage),
        MetricsConfig::default(),
        GoalConfig::default(),
    );
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (ledger_manager, config_manager)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A January 2025 day with no ad spend, so its objective sits at the floor.
pub fn floor_day(day: u32, placed: u32, delivered: u32) -> DailyInputs {
    DailyInputs {
        date: date(2025, 1, day),
        orders_placed: placed,
        orders_delivered: delivered,
        revenue: 10_000 * u64::from(delivered),
        costs: 4_000 * u64::from(delivered),
        ad_spend_nominal: 0,
    }
}
