mod common;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use chrono::{Duration, NaiveDateTime};
use desire_core::{
    core::{time::Clock, DesireTracker},
    desire::{Category, Frequency, NewDesire, Priority},
    errors::DesireError,
    storage::{JsonStorage, StorageBackend},
};

use common::{fixed_time, setup_tracker, temp_root};

/// Clock that moves one second forward on every reading.
struct SteppingClock {
    ticks: AtomicI64,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> NaiveDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        fixed_time() + Duration::seconds(tick)
    }
}

fn write_file(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn managed_store_round_trips_between_sessions() {
    let (mut tracker, root) = setup_tracker();
    tracker
        .add_desire(
            NewDesire::new("Rent", Frequency::Monthly, 3000.0)
                .with_priority(Priority::Essential)
                .with_category(Category::Housing),
        )
        .unwrap();
    let coffee = tracker
        .add_desire(NewDesire::new("Coffee", Frequency::Daily, 20.0))
        .unwrap();
    tracker.toggle_desire(&coffee, false).unwrap();
    let saved_at = tracker.save_default().unwrap();
    assert_eq!(saved_at, root.join("desires.json"));

    let storage = JsonStorage::new(Some(root), Some(3)).unwrap();
    let mut reopened = DesireTracker::new(Box::new(storage));
    let meta = reopened.load_default().unwrap().expect("store file exists");
    assert_eq!(meta.record_count, 2);
    assert!(meta.migrations.is_empty());
    assert!(meta.warnings.is_empty());
    assert_eq!(reopened.store(), tracker.store());
    assert_eq!(reopened.statistics().monthly_total, 3000.0);
}

#[test]
fn record_without_priority_and_category_gets_defaults() {
    let (mut tracker, root) = setup_tracker();
    let path = write_file(
        &root,
        "old.json",
        r#"{"desire_1_20230101_080000": {"name": "Gym", "frequency": "Monthly", "cost": 45}}"#,
    );

    let meta = tracker.load(&path).unwrap();
    assert_eq!(meta.record_count, 1);
    assert!(!meta.migrations.is_empty());

    let id = tracker.resolve("1").unwrap();
    let gym = tracker.store().get(&id).unwrap();
    assert_eq!(gym.priority, Priority::Medium);
    assert_eq!(gym.category, Category::Other);
    assert!(gym.enabled);
}

#[test]
fn legacy_labels_are_converted() {
    let (mut tracker, root) = setup_tracker();
    let path = write_file(
        &root,
        "legacy.json",
        r#"{
            "desire_1_20230101_080000": {
                "name": "房租", "frequency": "每月", "cost": 3000,
                "priority": "必需", "category": "住房", "enabled": true
            },
            "desire_2_20230101_080001": {
                "name": "咖啡", "frequency": "每天", "cost": 20,
                "priority": "低", "category": "餐饮", "enabled": false
            }
        }"#,
    );

    let meta = tracker.load(&path).unwrap();
    assert_eq!(meta.record_count, 2);
    assert!(meta.migrations.len() >= 6);

    let rows = tracker.rows();
    assert_eq!(rows[0].desire.frequency, Frequency::Monthly);
    assert_eq!(rows[0].desire.priority, Priority::Essential);
    assert_eq!(rows[0].desire.category, Category::Housing);
    assert_eq!(rows[1].desire.frequency, Frequency::Daily);
    assert!(!rows[1].desire.enabled);
    assert_eq!(tracker.statistics().monthly_total, 3000.0);
}

#[test]
fn unknown_fields_are_dropped_with_a_warning() {
    let (mut tracker, root) = setup_tracker();
    let path = write_file(
        &root,
        "extra.json",
        r#"{"desire_1_20230101_080000": {
            "name": "Books", "frequency": "Quarterly", "cost": 90,
            "priority": "High", "category": "Education", "enabled": true,
            "note": "from a newer build"
        }}"#,
    );
    let meta = tracker.load(&path).unwrap();
    assert_eq!(meta.warnings.len(), 1);
    assert!(meta.warnings[0].contains("note"));

    let out = root.join("resaved.json");
    tracker.save(&out).unwrap();
    let text = fs::read_to_string(out).unwrap();
    assert!(!text.contains("note"));
    assert!(text.contains("\"Quarterly\""));
}

#[test]
fn malformed_records_fail_the_whole_load() {
    let (mut tracker, root) = setup_tracker();
    tracker
        .add_desire(NewDesire::new("Keep", Frequency::Monthly, 10.0))
        .unwrap();
    let before = tracker.store().clone();

    let not_object = write_file(&root, "bad1.json", r#"{"desire_7_x": 42}"#);
    match tracker.load(&not_object) {
        Err(DesireError::Format(message)) => assert!(message.contains("desire_7_x")),
        other => panic!("expected format error, got {:?}", other),
    }

    let text_cost = write_file(
        &root,
        "bad2.json",
        r#"{"desire_1_x": {"name": "A", "frequency": "Daily", "cost": "lots"}}"#,
    );
    assert!(tracker.load(&text_cost).is_err());

    let not_json = write_file(&root, "bad3.json", "{ this is not json");
    assert!(matches!(tracker.load(&not_json), Err(DesireError::Format(_))));

    assert!(matches!(
        tracker.load(&root.join("missing.json")),
        Err(DesireError::Io(_))
    ));

    assert_eq!(tracker.store(), &before);
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let (mut tracker, _root) = setup_tracker();
    tracker
        .add_desire(NewDesire::new("Stable", Frequency::Monthly, 42.0))
        .unwrap();
    let path = tracker.save_default().unwrap();
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory at the temp location makes File::create fail.
    fs::create_dir_all(tmp_path_for(&path)).unwrap();

    tracker
        .add_desire(NewDesire::new("Changed", Frequency::Monthly, 99.0))
        .unwrap();
    assert!(tracker.save_default().is_err());

    let current = fs::read_to_string(&path).expect("read after failure");
    assert_eq!(current, original);
}

#[test]
fn backups_rotate_and_respect_retention() {
    let root = temp_root();
    let storage = JsonStorage::new(Some(root.clone()), Some(2))
        .unwrap()
        .with_clock(Arc::new(SteppingClock::new()));
    let mut tracker = DesireTracker::new(Box::new(storage));

    for cost in 1..=5 {
        tracker
            .add_desire(NewDesire::new(format!("Item {}", cost), Frequency::Monthly, cost as f64))
            .unwrap();
        tracker.save_default().unwrap();
    }

    let backups = tracker.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    assert!(backups[0] > backups[1], "newest backup is listed first");
    for name in &backups {
        assert!(name.starts_with("desires_"));
        assert!(root.join("backups").join(name).exists());
    }
}

#[test]
fn restore_brings_back_previous_contents() {
    let root = temp_root();
    let storage = JsonStorage::new(Some(root.clone()), Some(3))
        .unwrap()
        .with_clock(Arc::new(SteppingClock::new()));
    let mut tracker = DesireTracker::new(Box::new(storage));

    tracker
        .add_desire(NewDesire::new("First", Frequency::Yearly, 120.0))
        .unwrap();
    tracker.save_default().unwrap();
    tracker
        .add_desire(NewDesire::new("Second", Frequency::Weekly, 10.0))
        .unwrap();
    tracker.save_default().unwrap();

    let backups = tracker.list_backups().unwrap();
    assert_eq!(backups.len(), 1);
    let meta = tracker.restore_backup(&backups[0]).unwrap();
    assert_eq!(meta.record_count, 1);
    assert_eq!(meta.path, root.join("desires.json"));
    assert_eq!(tracker.store().len(), 1);
    assert_eq!(tracker.statistics().monthly_total, 10.0);

    let on_disk = fs::read_to_string(root.join("desires.json")).unwrap();
    assert!(on_disk.contains("First"));
    assert!(!on_disk.contains("Second"));
}

#[test]
fn restore_rejects_paths_outside_backups() {
    let (mut tracker, _root) = setup_tracker();
    assert!(tracker.restore_backup("../desires.json").is_err());
    assert!(tracker.restore_backup("nope.json").is_err());
}

#[test]
fn store_path_follows_configured_file_name() {
    let root = temp_root();
    let storage = JsonStorage::new(Some(root.clone()), None)
        .unwrap()
        .with_store_file("wishlist.json");
    assert_eq!(storage.store_path(), root.join("wishlist.json"));
}
