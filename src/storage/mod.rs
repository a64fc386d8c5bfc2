pub mod json_backend;
pub mod migration;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::{desire::DesireStore, errors::Result};

/// Abstraction over the managed store location, its backups and report destinations.
pub trait StorageBackend: Send + Sync {
    fn store_path(&self) -> PathBuf;
    fn save(&self, store: &DesireStore) -> Result<PathBuf>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<LoadReport>>;
    fn list_backups(&self) -> Result<Vec<String>>;
    fn restore(&self, backup_name: &str) -> Result<LoadReport>;
    fn report_path(&self, generated_at: NaiveDateTime) -> PathBuf;

    /// Ad-hoc file operations outside the managed layout.
    fn save_to_path(&self, store: &DesireStore, path: &Path) -> Result<()> {
        json_backend::save_store_to_path(store, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<LoadReport> {
        json_backend::load_store_from_path(path)
    }
}

pub use json_backend::{JsonStorage, LoadReport};
pub use migration::{migrate, MigrationReport};
