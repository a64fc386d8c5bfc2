use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::core::services::{
    desire_service::DesireRow, DesireService, ReportService, Statistics, SummaryService,
};
use crate::core::time::{Clock, SystemClock};
use crate::currency::AmountFormat;
use crate::desire::{BudgetGoal, Desire, DesireFilter, DesireId, DesireStore, NewDesire};
use crate::errors::Result;
use crate::storage::{json_backend, LoadReport, StorageBackend};

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub migrations: Vec<String>,
    pub path: PathBuf,
    pub record_count: usize,
}

/// Owns the session state: the record store, the budget goal and the active
/// view filter. Persistence goes through the configured [`StorageBackend`].
pub struct DesireTracker {
    store: DesireStore,
    budget_goal: Option<BudgetGoal>,
    filter: DesireFilter,
    amount_format: AmountFormat,
    storage: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl DesireTracker {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            store: DesireStore::new(),
            budget_goal: None,
            filter: DesireFilter::all(),
            amount_format: AmountFormat::default(),
            storage,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_amount_format(mut self, format: AmountFormat) -> Self {
        self.amount_format = format;
        self
    }

    pub fn set_amount_format(&mut self, format: AmountFormat) {
        self.amount_format = format;
    }

    pub fn amount_format(&self) -> &AmountFormat {
        &self.amount_format
    }

    /// Points persistence at a different backend; in-memory state is kept.
    pub fn set_storage(&mut self, storage: Box<dyn StorageBackend>) {
        self.storage = storage;
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn store(&self) -> &DesireStore {
        &self.store
    }

    pub fn add_desire(&mut self, input: NewDesire) -> Result<DesireId> {
        DesireService::add(&mut self.store, input, self.clock.as_ref())
    }

    pub fn toggle_desire(&mut self, id: &DesireId, enabled: bool) -> Result<()> {
        DesireService::toggle(&mut self.store, id, enabled)
    }

    pub fn delete_desire(&mut self, id: &DesireId) -> Result<Desire> {
        DesireService::delete(&mut self.store, id)
    }

    pub fn clear_all(&mut self) {
        DesireService::clear(&mut self.store);
    }

    /// Row number or id to id.
    pub fn resolve(&self, selector: &str) -> Result<DesireId> {
        self.store.resolve(selector)
    }

    /// Zero clears the goal.
    pub fn set_budget_goal(&mut self, amount: f64) -> Result<()> {
        self.budget_goal = BudgetGoal::new(amount)?;
        tracing::debug!(goal = ?self.budget_goal.map(BudgetGoal::amount), "budget goal updated");
        Ok(())
    }

    pub fn budget_goal(&self) -> Option<BudgetGoal> {
        self.budget_goal
    }

    pub fn set_filter(&mut self, filter: DesireFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> DesireFilter {
        self.filter
    }

    /// Rows visible under the active filter.
    pub fn rows(&self) -> Vec<DesireRow<'_>> {
        DesireService::list(&self.store, &self.filter)
    }

    /// Statistics under the active filter.
    pub fn statistics(&self) -> Statistics {
        self.statistics_for(&self.filter)
    }

    pub fn statistics_for(&self, filter: &DesireFilter) -> Statistics {
        SummaryService::compute(&self.store, filter, self.budget_goal)
    }

    /// Report text over every record, regardless of the active filter.
    pub fn render_report(&self) -> String {
        ReportService::build(
            &self.store,
            self.budget_goal,
            self.clock.now(),
            &self.amount_format,
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.storage.save_to_path(&self.store, path)
    }

    /// On failure the in-memory store is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<LoadMetadata> {
        let report = self.storage.load_from_path(path)?;
        self.apply_load(report)
    }

    pub fn export_report(&self, path: &Path) -> Result<()> {
        json_backend::write_report(path, &self.render_report())
    }

    pub fn save_default(&self) -> Result<PathBuf> {
        self.storage.save(&self.store)
    }

    /// `Ok(None)` when no managed store file exists yet.
    pub fn load_default(&mut self) -> Result<Option<LoadMetadata>> {
        match self.storage.load()? {
            Some(report) => self.apply_load(report).map(Some),
            None => Ok(None),
        }
    }

    /// Writes the report under the managed reports directory with a timestamped name.
    pub fn export_report_default(&self) -> Result<PathBuf> {
        let generated_at = self.clock.now();
        let path = self.storage.report_path(generated_at);
        let text = ReportService::build(
            &self.store,
            self.budget_goal,
            generated_at,
            &self.amount_format,
        );
        json_backend::write_report(&path, &text)?;
        Ok(path)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        self.storage.list_backups()
    }

    pub fn restore_backup(&mut self, backup_name: &str) -> Result<LoadMetadata> {
        let report = self.storage.restore(backup_name)?;
        self.apply_load(report)
    }

    fn apply_load(&mut self, report: LoadReport) -> Result<LoadMetadata> {
        let LoadReport {
            records,
            migrations,
            warnings,
            path,
        } = report;
        let record_count = records.len();
        self.store.replace(records)?;
        Ok(LoadMetadata {
            warnings,
            migrations,
            path,
            record_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::desire::{Category, Frequency, Priority};
    use crate::storage::JsonStorage;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn tracker() -> (DesireTracker, TempDir) {
        let temp = tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2024, 4, 2)
                .unwrap()
                .and_hms_opt(10, 15, 30)
                .unwrap(),
        );
        let tracker = DesireTracker::new(Box::new(storage)).with_clock(Arc::new(clock));
        (tracker, temp)
    }

    #[test]
    fn save_and_load_roundtrip_through_path() {
        let (mut tracker, temp) = tracker();
        tracker
            .add_desire(
                NewDesire::new("Rent", Frequency::Monthly, 3000.0)
                    .with_category(Category::Housing)
                    .with_priority(Priority::Essential),
            )
            .unwrap();
        let path = temp.path().join("export").join("mine.json");
        tracker.save(&path).unwrap();

        tracker.clear_all();
        let meta = tracker.load(&path).unwrap();
        assert_eq!(meta.record_count, 1);
        assert!(meta.migrations.is_empty());
        assert_eq!(tracker.statistics().monthly_total, 3000.0);
    }

    #[test]
    fn failed_load_keeps_existing_records() {
        let (mut tracker, temp) = tracker();
        tracker
            .add_desire(NewDesire::new("Gym", Frequency::Monthly, 50.0))
            .unwrap();
        let broken = temp.path().join("broken.json");
        fs::write(&broken, "{\"a\": 7}").unwrap();
        assert!(tracker.load(&broken).is_err());
        assert_eq!(tracker.store().len(), 1);
    }

    #[test]
    fn budget_goal_is_session_scoped() {
        let (mut tracker, _temp) = tracker();
        tracker.set_budget_goal(5000.0).unwrap();
        assert!(tracker.set_budget_goal(-1.0).is_err());
        assert_eq!(tracker.budget_goal().map(BudgetGoal::amount), Some(5000.0));
        tracker.set_budget_goal(0.0).unwrap();
        assert!(tracker.budget_goal().is_none());

        tracker.set_budget_goal(5000.0).unwrap();
        let path = tracker.save_default().unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(!text.contains("5000"));
    }

    #[test]
    fn default_export_uses_timestamped_name() {
        let (tracker, _temp) = tracker();
        let path = tracker.export_report_default().unwrap();
        assert!(path.ends_with("reports/desire_report_20240402_101530.txt"));
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("Generated: 2024-04-02 10:15:30"));
    }

    #[test]
    fn load_default_without_file_is_none() {
        let (mut tracker, _temp) = tracker();
        assert!(tracker.load_default().unwrap().is_none());
    }
}
