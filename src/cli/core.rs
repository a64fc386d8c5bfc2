//! Core CLI loop, dispatch, and shell context helpers.

use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::{tracker::LoadMetadata, utils::app_data_dir, DesireTracker},
    errors::DesireError,
    storage::JsonStorage,
};

use super::commands;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    tracker: Arc<RwLock<DesireTracker>>,
    pub(crate) theme: ColorfulTheme,
    config_manager: ConfigManager,
    config: Config,
    pub(crate) last_command: Option<String>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_root(mode, app_data_dir())
    }

    /// Builds a context whose config, store, backups and reports live under `root`.
    pub fn with_root(mode: CliMode, root: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(root.clone())?;
        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences {
            color: config.color_output,
        });

        let storage = Self::storage_for(&root, &config)?;
        let tracker = DesireTracker::new(Box::new(storage))
            .with_amount_format(config.amount_format());

        let mut app = ShellContext {
            mode,
            registry,
            tracker: Arc::new(RwLock::new(tracker)),
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            last_command: None,
            running: true,
        };
        app.auto_load();
        Ok(app)
    }

    fn storage_for(root: &Path, config: &Config) -> Result<JsonStorage, DesireError> {
        Ok(
            JsonStorage::new(Some(root.to_path_buf()), Some(config.backup_retention))?
                .with_store_file(&config.store_file)
                .with_reports_dir(&config.reports_dir),
        )
    }

    fn auto_load(&mut self) {
        if !self.config.auto_load {
            return;
        }
        let result = self.tracker_mut().and_then(|mut tracker| {
            tracker.load_default().map_err(CommandError::from)
        });
        match result {
            Ok(Some(meta)) => {
                cli_io::print_success(format!(
                    "Loaded {} desire(s) from {}.",
                    meta.record_count,
                    meta.path.display()
                ));
                self.report_load(&meta);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "auto-load failed");
                cli_io::print_warning(format!("Could not load saved desires: {}", err));
            }
        }
    }

    pub(crate) fn tracker(&self) -> Result<RwLockReadGuard<'_, DesireTracker>, CommandError> {
        self.tracker
            .read()
            .map_err(|_| CommandError::Message("desire tracker lock poisoned".into()))
    }

    pub(crate) fn tracker_mut(&self) -> Result<RwLockWriteGuard<'_, DesireTracker>, CommandError> {
        self.tracker
            .write()
            .map_err(|_| CommandError::Message("desire tracker lock poisoned".into()))
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Applies and persists a new configuration, rebuilding storage when paths change.
    pub(crate) fn update_config(&mut self, config: Config) -> CommandResult {
        self.config_manager.save(&config)?;
        output::set_preferences(OutputPreferences {
            color: config.color_output,
        });
        let root = self.config_manager_root();
        let storage = Self::storage_for(&root, &config)?;
        {
            let mut tracker = self.tracker_mut()?;
            tracker.set_storage(Box::new(storage));
            tracker.set_amount_format(config.amount_format());
        }
        self.config = config;
        Ok(())
    }

    fn config_manager_root(&self) -> PathBuf {
        self.config_manager
            .path()
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir)
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.tracker() {
            Ok(tracker) if !tracker.filter().is_all() => {
                let filter = tracker.filter();
                format!(
                    "desire[{}/{}]> ",
                    filter.category.map_or("All", |c| c.label()),
                    filter.priority.map_or("All", |p| p.label())
                )
            }
            _ => "desire> ".into(),
        }
    }

    /// Asks before a destructive action. Script mode never prompts.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode != CliMode::Interactive {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_load(&self, meta: &LoadMetadata) {
        for migration in &meta.migrations {
            cli_io::print_info(format!("  migrated: {}", migration));
        }
        for warning in &meta.warnings {
            cli_io::print_warning(warning);
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(DesireError::NotFound(what)) => {
                self.print_error(&format!("No desire matches {}.", what));
                cli_io::print_hint("Use `list` to see row numbers and ids.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] DesireError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {}", usage))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] DesireError),
    #[error("Input error: {0}")]
    Input(#[from] ReadlineError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(root: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_root(CliMode::Script, root)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desire::{Category, Priority};
    use tempfile::tempdir;

    #[test]
    fn script_adds_and_filters() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path().to_path_buf(),
            &[
                "add Rent monthly 3000 essential housing",
                "add Coffee daily 20 low food",
                "filter food",
                "disable 1",
            ],
        )
        .unwrap();
        let tracker = app.tracker().unwrap();
        assert_eq!(tracker.store().len(), 2);
        assert_eq!(tracker.filter().category, Some(Category::Food));
        assert_eq!(tracker.statistics().monthly_total, 600.0);
        let rent = tracker.resolve("1").unwrap();
        let rent = tracker.store().get(&rent).unwrap();
        assert!(!rent.enabled);
        assert_eq!(rent.priority, Priority::Essential);
    }

    #[test]
    fn invalid_input_does_not_stop_the_script() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path().to_path_buf(),
            &["add Coffee daily -5", "delete 9", "frobnicate", "add Tea daily 3"],
        )
        .unwrap();
        assert_eq!(app.tracker().unwrap().store().len(), 1);
    }

    #[test]
    fn save_then_auto_load_on_next_start() {
        let temp = tempdir().unwrap();
        process_script(
            temp.path().to_path_buf(),
            &["add Gym monthly 45 high health", "save"],
        )
        .unwrap();
        let reopened = ShellContext::with_root(CliMode::Script, temp.path().to_path_buf()).unwrap();
        assert_eq!(reopened.tracker().unwrap().store().len(), 1);
    }

    #[test]
    fn config_changes_persist() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path().to_path_buf(),
            &["config currency_symbol $", "config auto_load off"],
        )
        .unwrap();
        assert_eq!(app.config().currency_symbol, "$");
        assert_eq!(app.tracker().unwrap().amount_format().symbol, "$");

        let reopened = ShellContext::with_root(CliMode::Script, temp.path().to_path_buf()).unwrap();
        assert!(!reopened.config().auto_load);
    }

    #[test]
    fn exit_stops_processing() {
        let temp = tempdir().unwrap();
        let app = process_script(
            temp.path().to_path_buf(),
            &["exit", "add Late monthly 1"],
        )
        .unwrap();
        assert!(app.tracker().unwrap().store().is_empty());
    }
}
