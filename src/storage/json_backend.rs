use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    core::{
        time::{Clock, SystemClock},
        utils::{app_data_dir, ensure_dir},
    },
    desire::{Desire, DesireId, DesireStore},
    errors::{DesireError, Result},
};

use super::{migration, StorageBackend};

pub const DEFAULT_STORE_FILE: &str = "desires.json";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_RETENTION: usize = 5;

const BACKUP_DIR: &str = "backups";
const BACKUP_EXTENSION: &str = "json";
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const REPORT_PREFIX: &str = "desire_report";
const TMP_SUFFIX: &str = "tmp";

/// Result of reading and migrating a store file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub records: Vec<(DesireId, Desire)>,
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
    pub path: PathBuf,
}

/// Managed on-disk layout: one store file, rolling backups and exported reports
/// under a single application directory.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    store_file: PathBuf,
    backups_dir: PathBuf,
    reports_dir: PathBuf,
    retention: usize,
    clock: Arc<dyn Clock>,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&app_root)?;
        let backups_dir = app_root.join(BACKUP_DIR);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            store_file: app_root.join(DEFAULT_STORE_FILE),
            reports_dir: app_root.join(DEFAULT_REPORTS_DIR),
            backups_dir,
            root: app_root,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
            clock: Arc::new(SystemClock),
        })
    }

    /// Overrides the store file name (relative to the root).
    pub fn with_store_file(mut self, file_name: &str) -> Self {
        self.store_file = self.root.join(file_name);
        self
    }

    /// Overrides the report directory (relative to the root).
    pub fn with_reports_dir(mut self, dir_name: &str) -> Self {
        self.reports_dir = self.root.join(dir_name);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backup_path(&self, backup_name: &str) -> PathBuf {
        self.backups_dir.join(backup_name)
    }

    fn backup_stem(&self) -> String {
        self.store_file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("desires")
            .to_string()
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.store_file.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let backup_name = self.next_backup_name();
        fs::copy(&self.store_file, self.backup_path(&backup_name))?;
        tracing::debug!(backup = %backup_name, "created store backup");
        self.prune_backups()?;
        Ok(())
    }

    /// Backups taken within the same second get a `_<n>` suffix after the timestamp.
    fn next_backup_name(&self) -> String {
        let stem = self.backup_stem();
        let timestamp = self.clock.now().format(FILE_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("{}_{}.{}", stem, timestamp, BACKUP_EXTENSION);
        let mut counter = 1u32;
        while self.backup_path(&name).exists() {
            name = format!("{}_{}_{}.{}", stem, timestamp, counter, BACKUP_EXTENSION);
            counter += 1;
        }
        name
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(entry));
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn store_path(&self) -> PathBuf {
        self.store_file.clone()
    }

    fn save(&self, store: &DesireStore) -> Result<PathBuf> {
        self.backup_existing_file()?;
        save_store_to_path(store, &self.store_file)?;
        Ok(self.store_file.clone())
    }

    fn load(&self) -> Result<Option<LoadReport>> {
        if !self.store_file.exists() {
            return Ok(None);
        }
        load_store_from_path(&self.store_file).map(Some)
    }

    fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", self.backup_stem());
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) if name.starts_with(&prefix) => name.to_string(),
                _ => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| {
            backup_sort_key(b)
                .cmp(&backup_sort_key(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn restore(&self, backup_name: &str) -> Result<LoadReport> {
        if backup_name.contains(['/', '\\']) || backup_name.contains("..") {
            return Err(DesireError::NotFound(format!("backup `{}`", backup_name)));
        }
        let backup_path = self.backup_path(backup_name);
        if !backup_path.exists() {
            return Err(DesireError::NotFound(format!("backup `{}`", backup_name)));
        }
        // Validate before touching the live file.
        let mut report = load_store_from_path(&backup_path)?;
        let data = fs::read_to_string(&backup_path)?;
        write_atomic(&self.store_file, &data)?;
        report.path = self.store_file.clone();
        tracing::info!(backup = %backup_name, "restored store from backup");
        Ok(report)
    }

    fn report_path(&self, generated_at: NaiveDateTime) -> PathBuf {
        self.reports_dir.join(format!(
            "{}_{}.txt",
            REPORT_PREFIX,
            generated_at.format(FILE_TIMESTAMP_FORMAT)
        ))
    }
}

/// Pretty JSON object keyed by id, in store order.
pub fn serialize_store(store: &DesireStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Parses store text into a raw id → record mapping, keeping file order.
pub fn deserialize_raw(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(DesireError::Format(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

pub fn load_store_from_path(path: &Path) -> Result<LoadReport> {
    let data = String::from_utf8(fs::read(path)?).map_err(|err| {
        DesireError::Format(format!("{} is not valid UTF-8: {}", path.display(), err))
    })?;
    let raw = deserialize_raw(&data)?;
    let migrated = migration::migrate(raw)?;
    tracing::info!(
        path = %path.display(),
        records = migrated.records.len(),
        migrations = migrated.migrations.len(),
        "loaded desire store"
    );
    Ok(LoadReport {
        records: migrated.records,
        migrations: migrated.migrations,
        warnings: migrated.warnings,
        path: path.to_path_buf(),
    })
}

pub fn save_store_to_path(store: &DesireStore, path: &Path) -> Result<()> {
    let json = serialize_store(store)?;
    write_atomic(path, &json)?;
    tracing::info!(path = %path.display(), records = store.len(), "saved desire store");
    Ok(())
}

pub fn write_report(path: &Path, text: &str) -> Result<()> {
    write_atomic(path, text)?;
    tracing::info!(path = %path.display(), "exported report");
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `(timestamp, same-second counter)` from `<stem>_<date>_<time>[_<n>].json`.
fn backup_sort_key(name: &str) -> Option<(NaiveDateTime, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let segments: Vec<&str> = trimmed.rsplit('_').collect();
    let (date_part, time_part, counter) = match segments.as_slice() {
        [time, date, ..] if is_digits(date, 8) && is_digits(time, 6) => (*date, *time, 0),
        [counter, time, date, ..] => (*date, *time, counter.parse::<u32>().ok()?),
        _ => return None,
    };
    if !is_digits(date_part, 8) || !is_digits(time_part, 6) {
        return None;
    }
    let timestamp =
        NaiveDateTime::parse_from_str(&format!("{}{}", date_part, time_part), "%Y%m%d%H%M%S")
            .ok()?;
    Some((timestamp, counter))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes through a sibling temp file and renames it into place.
pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(data.as_bytes())?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
