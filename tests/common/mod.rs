#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use desire_core::{
    core::{time::FixedClock, DesireTracker},
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// Fresh directory that outlives the calling test.
pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn storage_at(root: PathBuf, retention: usize) -> JsonStorage {
    JsonStorage::new(Some(root), Some(retention))
        .expect("create json storage backend")
        .with_clock(Arc::new(FixedClock(fixed_time())))
}

/// Tracker backed by an isolated directory and a frozen clock.
pub fn setup_tracker() -> (DesireTracker, PathBuf) {
    let root = temp_root();
    let tracker = DesireTracker::new(Box::new(storage_at(root.clone(), 3)))
        .with_clock(Arc::new(FixedClock(fixed_time())));
    (tracker, root)
}
