use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::{
    errors::{LedgerError, Result},
    ledger::{DailyInputs, MetricsConfig, Period, PeriodLedger},
    utils::{discard_file, ensure_dir, stage_file, write_atomic},
};

use super::{BackupInfo, LoadReport, StorageBackend};

const LEDGER_DIR: &str = "ledgers";
const BACKUP_DIR: &str = "backups";
const LEDGER_EXTENSION: &str = "csv";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_TIMESTAMP_LEN: usize = 15;
pub const DEFAULT_RETENTION: usize = 5;

/// Persisted column order, one header row then one row per day.
pub const COLUMNS: [&str; 13] = [
    "date",
    "orders_placed",
    "orders_delivered",
    "orders_lost",
    "delivery_rate",
    "revenue",
    "costs",
    "ad_spend_nominal",
    "ad_spend_effective",
    "net_profit",
    "profit_rate",
    "daily_objective",
    "cumulative_deficit",
];

/// Stores each period as `ledgers/YYYY_MM.csv` and keeps timestamped copies
/// under `backups/YYYY_MM/` whenever a file is overwritten.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl CsvStorage {
    pub fn new(root: PathBuf, retention: Option<usize>) -> Result<Self> {
        let ledgers_dir = root.join(LEDGER_DIR);
        let backups_dir = root.join(BACKUP_DIR);
        ensure_dir(&ledgers_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            ledgers_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn ledgers_dir(&self) -> &Path {
        &self.ledgers_dir
    }

    fn backup_dir(&self, period: Period) -> PathBuf {
        self.backups_dir.join(period.file_stem())
    }

    /// Copies the live file into the backup folder, returning the copy's path.
    fn backup_existing_file(&self, period: Period, path: &Path) -> Result<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }
        let dir = self.backup_dir(period);
        ensure_dir(&dir)?;
        let stem = format!(
            "{}_{}",
            period.file_stem(),
            Local::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        let mut backup_path = dir.join(format!("{stem}.{LEDGER_EXTENSION}"));
        let mut seq = 1;
        while backup_path.exists() {
            backup_path = dir.join(format!("{stem}_{seq}.{LEDGER_EXTENSION}"));
            seq += 1;
        }
        fs::copy(path, &backup_path)?;
        tracing::debug!(backup = %backup_path.display(), "backed up period file");
        Ok(Some(backup_path))
    }

    /// Stages `data`, backs up the live file, then renames the staged file
    /// into place. Old backups are pruned only once the new file is live; on
    /// failure the staged file and the fresh backup are removed again.
    fn replace_period_file(&self, period: Period, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let staged = stage_file(path, data)?;
        let backup = match self.backup_existing_file(period, path) {
            Ok(backup) => backup,
            Err(err) => {
                discard_file(&staged);
                return Err(err);
            }
        };
        if let Err(err) = fs::rename(&staged, path) {
            discard_file(&staged);
            if let Some(backup) = &backup {
                discard_file(backup);
            }
            return Err(err.into());
        }
        if backup.is_some() {
            self.prune_backups(period)?;
        }
        Ok(())
    }

    fn prune_backups(&self, period: Period) -> Result<()> {
        let backups = self.list_backups(period)?;
        for entry in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(backup = %entry.path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for CsvStorage {
    fn load(&self, period: Period, config: &MetricsConfig) -> Result<LoadReport> {
        let path = self.ledger_path(period);
        if !path.exists() {
            tracing::info!(%period, "no file for period; starting empty ledger");
            return Ok(LoadReport {
                ledger: PeriodLedger::new(period, *config),
                path,
                existed: false,
                warnings: Vec::new(),
            });
        }
        load_ledger_from_path(&path, period, config)
    }

    fn save(&self, ledger: &PeriodLedger) -> Result<PathBuf> {
        let path = self.ledger_path(ledger.period());
        let mut buffer = Vec::new();
        write_ledger(ledger, &mut buffer)?;
        self.replace_period_file(ledger.period(), &path, &buffer)?;
        tracing::info!(period = %ledger.period(), path = %path.display(), "saved period ledger");
        Ok(path)
    }

    fn ledger_path(&self, period: Period) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", period.file_stem(), LEDGER_EXTENSION))
    }

    fn list_backups(&self, period: Period) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(period);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", period.file_stem());
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(suffix) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(&format!(".{LEDGER_EXTENSION}")))
            else {
                continue;
            };
            entries.push((
                backup_sequence(suffix),
                BackupInfo {
                    name: name.to_string(),
                    created_at: parse_backup_timestamp(suffix),
                    path: path.clone(),
                },
            ));
        }
        entries.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }

    fn restore_backup(
        &self,
        period: Period,
        backup_name: &str,
        config: &MetricsConfig,
    ) -> Result<LoadReport> {
        if backup_name.contains(['/', '\\']) {
            return Err(LedgerError::Validation(format!(
                "`{backup_name}` is not a backup name"
            )));
        }
        let backup_path = self.backup_dir(period).join(backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Persistence(format!(
                "backup `{backup_name}` not found"
            )));
        }
        // Read and validate before the live file is touched; pruning may
        // remove the backup itself.
        let contents = fs::read(&backup_path)?;
        read_ledger(contents.as_slice(), period, config)?;
        let target = self.ledger_path(period);
        self.replace_period_file(period, &target, &contents)?;
        tracing::info!(%period, backup = backup_name, "restored period from backup");
        load_ledger_from_path(&target, period, config)
    }
}

/// Subset of the persisted columns that the loader reads. Every column is
/// optional: absent or empty cells count as zero and unknown columns are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredRow {
    date: Option<String>,
    orders_placed: Option<f64>,
    orders_delivered: Option<f64>,
    revenue: Option<f64>,
    costs: Option<f64>,
    ad_spend_nominal: Option<f64>,
    daily_objective: Option<f64>,
    cumulative_deficit: Option<f64>,
}

impl StoredRow {
    fn to_inputs(&self, line: usize) -> Result<DailyInputs> {
        let raw_date = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| LedgerError::Validation(format!("row {line}: missing date")))?;
        let date = parse_date(raw_date).ok_or_else(|| {
            LedgerError::Validation(format!("row {line}: `{raw_date}` is not a date"))
        })?;
        DailyInputs::try_new(
            date,
            whole(line, "orders_placed", self.orders_placed)?,
            whole(line, "orders_delivered", self.orders_delivered)?,
            whole(line, "revenue", self.revenue)?,
            whole(line, "costs", self.costs)?,
            whole(line, "ad_spend_nominal", self.ad_spend_nominal)?,
        )
        .map_err(|err| match err {
            LedgerError::Validation(msg) => LedgerError::Validation(format!("row {line}: {msg}")),
            other => other,
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()))
}

fn whole(line: usize, field: &str, value: Option<f64>) -> Result<i64> {
    let Some(value) = value else {
        return Ok(0);
    };
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return Err(LedgerError::Validation(format!(
            "row {line}: {field} must be a whole number, got {value}"
        )));
    }
    Ok(value as i64)
}

/// Parses a period file, re-deriving every computed column from the raw inputs.
pub fn read_ledger<R: Read>(
    reader: R,
    period: Period,
    config: &MetricsConfig,
) -> Result<(PeriodLedger, Vec<String>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut warnings = Vec::new();
    let headers = rdr.headers()?.clone();
    if !headers.is_empty() {
        for column in COLUMNS {
            if !headers.iter().any(|header| header == column) {
                warnings.push(format!("column `{column}` missing; treated as zero"));
            }
        }
    }

    let mut rows = Vec::new();
    let mut stored = Vec::new();
    for (idx, result) in rdr.deserialize::<StoredRow>().enumerate() {
        let line = idx + 2;
        let row = result.map_err(|err| LedgerError::Persistence(format!("row {line}: {err}")))?;
        let inputs = row.to_inputs(line)?;
        stored.push((inputs.date, row.daily_objective, row.cumulative_deficit));
        rows.push(inputs);
    }

    if rows.windows(2).any(|pair| pair[0].date > pair[1].date) {
        warnings.push("rows were out of date order and have been sorted".into());
    }
    let ledger = PeriodLedger::from_inputs(period, *config, rows)?;

    let floor = config.objective_floor;
    let mut stale_deficits = 0;
    for (date, objective, deficit) in stored {
        let Some(record) = ledger.get(date) else {
            continue;
        };
        if let Some(objective) = objective {
            if objective < floor as f64 {
                warnings.push(format!(
                    "objective for {date} was stored as {objective}, below the floor of {floor}; corrected to {}",
                    record.daily_objective
                ));
            } else if objective != record.daily_objective as f64 {
                warnings.push(format!(
                    "objective for {date} recomputed from {objective} to {}",
                    record.daily_objective
                ));
            }
        }
        if deficit.is_some_and(|value| value != record.cumulative_deficit as f64) {
            stale_deficits += 1;
        }
    }
    if stale_deficits > 0 {
        warnings.push(format!(
            "{stale_deficits} stored cumulative_deficit value(s) were stale and have been recomputed"
        ));
    }
    for warning in &warnings {
        tracing::warn!(%period, "{warning}");
    }
    Ok((ledger, warnings))
}

/// Writes the header row and one row per record, oldest first.
pub fn write_ledger<W: Write>(ledger: &PeriodLedger, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if ledger.is_empty() {
        wtr.write_record(COLUMNS)?;
    }
    for record in ledger.list() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn load_ledger_from_path(
    path: &Path,
    period: Period,
    config: &MetricsConfig,
) -> Result<LoadReport> {
    let file = File::open(path)?;
    let (ledger, warnings) = read_ledger(file, period, config)?;
    Ok(LoadReport {
        ledger,
        path: path.to_path_buf(),
        existed: true,
        warnings,
    })
}

pub fn save_ledger_to_path(ledger: &PeriodLedger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut buffer = Vec::new();
    write_ledger(ledger, &mut buffer)?;
    write_atomic(path, &buffer)?;
    Ok(())
}

fn backup_sequence(suffix: &str) -> u32 {
    suffix
        .get(BACKUP_TIMESTAMP_LEN..)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|seq| seq.parse().ok())
        .unwrap_or(0)
}

fn parse_backup_timestamp(suffix: &str) -> Option<NaiveDateTime> {
    let stamp = suffix.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tmp_path;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (CsvStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = CsvStorage::new(temp.path().to_path_buf(), Some(2)).expect("csv storage");
        (storage, temp)
    }

    fn jan() -> Period {
        Period::new(2025, 1).unwrap()
    }

    fn read(raw: &str) -> Result<(PeriodLedger, Vec<String>)> {
        read_ledger(raw.as_bytes(), jan(), &MetricsConfig::default())
    }

    #[test]
    fn empty_ledger_writes_header_only() {
        let ledger = PeriodLedger::new(jan(), MetricsConfig::default());
        let mut out = Vec::new();
        write_ledger(&ledger, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn missing_columns_count_as_zero_and_extras_are_ignored() {
        let (ledger, warnings) =
            read("date,orders_delivered,notes\n2025-01-02,3,rainy day\n").unwrap();
        let record = ledger.get(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()).unwrap();
        assert_eq!(record.orders_placed, 0);
        assert_eq!(record.orders_delivered, 3);
        assert_eq!(record.revenue, 0);
        assert_eq!(record.cumulative_deficit, 1);
        assert!(warnings.iter().any(|w| w.contains("`revenue` missing")));
    }

    #[test]
    fn legacy_float_cells_and_low_objectives_are_normalized() {
        let raw = "date,orders_placed,orders_delivered,revenue,costs,ad_spend_nominal,daily_objective,cumulative_deficit\n\
                   2025-01-01,4.0,1.0,1000,0,0,2,0\n";
        let (ledger, warnings) = read(raw).unwrap();
        assert_eq!(ledger.list()[0].daily_objective, 4);
        assert_eq!(ledger.cumulative_deficit(), 3);
        assert!(warnings.iter().any(|w| w.contains("below the floor")));
        assert!(warnings.iter().any(|w| w.contains("stale")));
    }

    #[test]
    fn negative_and_non_numeric_cells_are_rejected() {
        let negative = read("date,orders_placed,costs\n2025-01-01,2,-10\n").unwrap_err();
        assert!(
            matches!(negative, LedgerError::Validation(ref msg) if msg.contains("row 2")),
            "unexpected error: {negative:?}"
        );
        let garbage = read("date,orders_placed\n2025-01-01,many\n").unwrap_err();
        assert!(matches!(garbage, LedgerError::Persistence(_)));
    }

    #[test]
    fn out_of_order_rows_are_sorted() {
        let (ledger, warnings) =
            read("date,orders_delivered\n2025-01-03,1\n2025-01-01,2\n2025-01-02,5\n").unwrap();
        let deficits: Vec<_> = ledger.list().iter().map(|r| r.cumulative_deficit).collect();
        assert_eq!(deficits, vec![2, 1, 4]);
        assert!(warnings.iter().any(|w| w.contains("sorted")));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut ledger = PeriodLedger::new(jan(), MetricsConfig::with_tax_rate(0.1));
        let inputs = DailyInputs::try_new(
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            5,
            2,
            5_000,
            2_000,
            1_000,
        )
        .unwrap();
        ledger.insert(inputs).unwrap();

        let path = storage.save(&ledger).expect("save ledger");
        assert!(path.ends_with("ledgers/2025_01.csv"));

        let report = storage
            .load(jan(), &MetricsConfig::with_tax_rate(0.1))
            .expect("load ledger");
        assert!(report.existed);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.ledger, ledger);
    }

    #[test]
    fn overwriting_creates_pruned_backups() {
        let (storage, _guard) = storage_with_temp_dir();
        let ledger = PeriodLedger::new(jan(), MetricsConfig::default());
        for _ in 0..4 {
            storage.save(&ledger).expect("save ledger");
        }
        let backups = storage.list_backups(jan()).expect("list backups");
        assert_eq!(backups.len(), 2);
        assert!(backups.iter().all(|b| b.created_at.is_some()));
    }

    #[test]
    fn restore_replaces_period_file() {
        let (storage, _guard) = storage_with_temp_dir();
        let empty = PeriodLedger::new(jan(), MetricsConfig::default());
        storage.save(&empty).unwrap();

        let mut filled = empty.clone();
        filled
            .insert(DailyInputs::try_new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        storage.save(&filled).unwrap();

        let backups = storage.list_backups(jan()).unwrap();
        let report = storage
            .restore_backup(jan(), &backups[0].name, &MetricsConfig::default())
            .unwrap();
        assert!(report.ledger.is_empty());
        assert!(storage
            .restore_backup(jan(), "../escape.csv", &MetricsConfig::default())
            .is_err());
    }

    #[test]
    fn failed_save_preserves_original_file() {
        let (storage, _guard) = storage_with_temp_dir();
        let ledger = PeriodLedger::new(jan(), MetricsConfig::default());
        let path = storage.save(&ledger).unwrap();
        let original = fs::read_to_string(&path).unwrap();

        // A directory at the staging path makes File::create fail.
        fs::create_dir_all(tmp_path(&path)).unwrap();
        let mut changed = ledger.clone();
        changed
            .insert(DailyInputs::try_new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        let err = storage.save(&changed).unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn failed_save_leaves_backups_alone() {
        let (storage, _guard) = storage_with_temp_dir();
        let ledger = PeriodLedger::new(jan(), MetricsConfig::default());
        for _ in 0..3 {
            storage.save(&ledger).unwrap();
        }
        let before: Vec<_> = storage
            .list_backups(jan())
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(before.len(), 2);

        let path = storage.ledger_path(jan());
        fs::create_dir_all(tmp_path(&path)).unwrap();
        assert!(storage.save(&ledger).is_err());

        let after: Vec<_> = storage
            .list_backups(jan())
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(after, before);
    }
}
