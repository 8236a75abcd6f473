pub mod build_info;

use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Once,
};

const DEFAULT_DIR_NAME: &str = ".parcel_ledger";
const TMP_SUFFIX: &str = "tmp";
pub const HOME_ENV: &str = "PARCEL_LEDGER_HOME";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber, logging to stderr.
///
/// `RUST_LOG` overrides the default `parcel_ledger=info` filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("parcel_ledger=info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

/// Returns the application data directory, defaulting to `~/.parcel_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Sibling path used to stage writes, e.g. `2025_01.csv.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to the staging path next to `path` and returns it. A partial
/// staging file is removed when the write fails.
pub fn stage_file(path: &Path, data: &[u8]) -> io::Result<PathBuf> {
    let tmp = tmp_path(path);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(data)?;
        file.flush()
    });
    match written {
        Ok(()) => Ok(tmp),
        Err(err) => {
            discard_file(&tmp);
            Err(err)
        }
    }
}

/// Stages `data` and renames it over `path`, so a failed write never
/// truncates the previous version.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = stage_file(path, data)?;
    fs::rename(&tmp, path).inspect_err(|_| discard_file(&tmp))
}

/// Best-effort removal of a leftover file; directories are left alone.
pub fn discard_file(path: &Path) {
    if path.is_file() {
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove leftover file");
        }
    }
}
