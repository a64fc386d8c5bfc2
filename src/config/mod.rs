use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, config_file_in, ensure_dir},
    currency::AmountFormat,
    errors::{DesireError, Result},
    storage::json_backend::{
        write_atomic, DEFAULT_REPORTS_DIR, DEFAULT_RETENTION, DEFAULT_STORE_FILE,
    },
};

/// User preferences persisted alongside the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    pub decimal_places: u8,
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
    pub store_file: String,
    pub reports_dir: String,
    pub backup_retention: usize,
    pub auto_load: bool,
    pub color_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        let format = AmountFormat::default();
        Self {
            currency_symbol: format.symbol,
            decimal_places: format.decimal_places,
            decimal_separator: format.decimal_separator,
            grouping_separator: format.grouping_separator,
            store_file: DEFAULT_STORE_FILE.into(),
            reports_dir: DEFAULT_REPORTS_DIR.into(),
            backup_retention: DEFAULT_RETENTION,
            auto_load: true,
            color_output: true,
        }
    }
}

impl Config {
    pub fn amount_format(&self) -> AmountFormat {
        AmountFormat {
            symbol: self.currency_symbol.clone(),
            decimal_places: self.decimal_places,
            decimal_separator: self.decimal_separator,
            grouping_separator: self.grouping_separator,
        }
    }

    /// Updates one setting from its textual form, as typed at the shell.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let mut next = self.clone();
        match key {
            "currency_symbol" => next.currency_symbol = value.to_string(),
            "decimal_places" => {
                let places: u8 = value
                    .parse()
                    .map_err(|_| invalid(key, "expected a whole number"))?;
                if places > 6 {
                    return Err(invalid(key, "at most 6 places are supported"));
                }
                next.decimal_places = places;
            }
            "decimal_separator" => next.decimal_separator = single_char(key, value)?,
            "grouping_separator" => {
                next.grouping_separator = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(single_char(key, value)?)
                }
            }
            "store_file" => next.store_file = file_name(key, value)?,
            "reports_dir" => next.reports_dir = file_name(key, value)?,
            "backup_retention" => {
                let retention: usize = value
                    .parse()
                    .map_err(|_| invalid(key, "expected a whole number"))?;
                next.backup_retention = retention.max(1);
            }
            "auto_load" => next.auto_load = parse_flag(key, value)?,
            "color_output" => next.color_output = parse_flag(key, value)?,
            other => return Err(DesireError::Config(format!("unknown setting `{}`", other))),
        }
        if next.grouping_separator == Some(next.decimal_separator) {
            return Err(invalid(key, "grouping and decimal separators must differ"));
        }
        *self = next;
        Ok(())
    }

    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currency_symbol", self.currency_symbol.clone()),
            ("decimal_places", self.decimal_places.to_string()),
            ("decimal_separator", self.decimal_separator.to_string()),
            (
                "grouping_separator",
                self.grouping_separator
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".into()),
            ),
            ("store_file", self.store_file.clone()),
            ("reports_dir", self.reports_dir.clone()),
            ("backup_retention", self.backup_retention.to_string()),
            ("auto_load", self.auto_load.to_string()),
            ("color_output", self.color_output.to_string()),
        ]
    }
}

fn invalid(key: &str, message: &str) -> DesireError {
    DesireError::Config(format!("{}: {}", key, message))
}

fn single_char(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(invalid(key, "expected a single character")),
    }
}

fn file_name(key: &str, value: &str) -> Result<String> {
    if value.is_empty() || value.contains(['/', '\\']) || value == ".." {
        return Err(invalid(key, "expected a plain file or directory name"));
    }
    Ok(value.to_string())
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, "expected true or false")),
    }
}

/// Loads and saves [`Config`] at `<root>/config.json`.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    /// Defaults are returned when no file exists yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            DesireError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("currency_symbol", "$").unwrap();
        config.set("auto_load", "off").unwrap();
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"currency_symbol": "€"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.store_file, DEFAULT_STORE_FILE);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{").unwrap();
        assert!(matches!(manager.load(), Err(DesireError::Config(_))));
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("decimal_places", "two").is_err());
        assert!(config.set("store_file", "../escape.json").is_err());
        assert!(config.set("grouping_separator", ".").is_err());
        assert!(config.set("volume", "11").is_err());
        config.set("grouping_separator", "none").unwrap();
        assert_eq!(config.amount_format().format(1000.0), "¥1000.00");
    }
}
