use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DesireError;

/// Days counted per month when normalizing daily costs.
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Weeks counted per month (52 / 12, rounded) when normalizing weekly costs.
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// How often a desire's per-occurrence cost is incurred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    /// Converts a per-occurrence cost into its monthly equivalent.
    pub fn monthly_equivalent(self, cost: f64) -> f64 {
        match self {
            Frequency::Daily => cost * DAYS_PER_MONTH,
            Frequency::Weekly => cost * WEEKS_PER_MONTH,
            Frequency::Monthly => cost,
            Frequency::Quarterly => cost / 3.0,
            Frequency::Yearly => cost / 12.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }

    /// Labels written by the first, localized releases.
    fn from_legacy_label(value: &str) -> Option<Self> {
        match value {
            "每天" => Some(Frequency::Daily),
            "每周" => Some(Frequency::Weekly),
            "每月" => Some(Frequency::Monthly),
            "每季度" => Some(Frequency::Quarterly),
            "每年" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    /// Returns `true` when `value` is a legacy localized label rather than a canonical one.
    pub fn is_legacy_label(value: &str) -> bool {
        Self::from_legacy_label(value.trim()).is_some()
    }
}

/// Pure normalizer used by the aggregator and the report.
pub fn monthly_equivalent(cost: f64, frequency: Frequency) -> f64 {
    frequency.monthly_equivalent(cost)
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = DesireError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(legacy) = Self::from_legacy_label(trimmed) {
            return Ok(legacy);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Frequency::Daily),
            "weekly" | "week" => Ok(Frequency::Weekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "quarterly" | "quarter" => Ok(Frequency::Quarterly),
            "yearly" | "year" | "annual" | "annually" => Ok(Frequency::Yearly),
            _ => Err(DesireError::validation(
                "frequency",
                format!("unknown frequency `{}`", trimmed),
            )),
        }
    }
}
