use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DesireError;

/// Importance of a desire. Ordered from least to most important.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Essential,
}

impl Priority {
    /// Canonical reporting order.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Essential,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Essential => "Essential",
        }
    }

    fn from_legacy_label(value: &str) -> Option<Self> {
        match value {
            "低" => Some(Priority::Low),
            "中" => Some(Priority::Medium),
            "高" => Some(Priority::High),
            "必需" => Some(Priority::Essential),
            _ => None,
        }
    }

    pub fn is_legacy_label(value: &str) -> bool {
        Self::from_legacy_label(value.trim()).is_some()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = DesireError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(legacy) = Self::from_legacy_label(trimmed) {
            return Ok(legacy);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "essential" => Ok(Priority::Essential),
            _ => Err(DesireError::validation(
                "priority",
                format!("unknown priority `{}`", trimmed),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn orders_by_importance() {
        let mut values = vec![Priority::Essential, Priority::Low, Priority::High];
        values.sort();
        assert_eq!(values, vec![Priority::Low, Priority::High, Priority::Essential]);
    }

    #[test]
    fn parses_legacy_labels() {
        assert_eq!("必需".parse::<Priority>().unwrap(), Priority::Essential);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }
}
