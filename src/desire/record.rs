use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{DesireError, Result};

use super::{Category, Frequency, Priority};

const ID_PREFIX: &str = "desire";
const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Opaque identifier of a desire, unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesireId(String);

impl DesireId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds an id of the form `desire_{seq}_{YYYYmmdd_HHMMSS}`.
    pub fn generate(sequence: u64, at: NaiveDateTime) -> Self {
        Self(format!(
            "{}_{}_{}",
            ID_PREFIX,
            sequence,
            at.format(ID_TIMESTAMP_FORMAT)
        ))
    }

    /// Sequence number embedded in a generated id, if the id follows that shape.
    pub fn sequence(&self) -> Option<u64> {
        let rest = self.0.strip_prefix(ID_PREFIX)?.strip_prefix('_')?;
        let (seq, _) = rest.split_once('_')?;
        seq.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DesireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DesireId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A recurring expense the user wants to track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Desire {
    pub name: String,
    pub frequency: Frequency,
    pub cost: f64,
    pub priority: Priority,
    pub category: Category,
    pub enabled: bool,
}

impl Desire {
    pub fn monthly_cost(&self) -> f64 {
        self.frequency.monthly_equivalent(self.cost)
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_cost(self.cost)?;
        Ok(())
    }
}

/// Input for a new desire. New records always start enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDesire {
    pub name: String,
    pub frequency: Frequency,
    pub cost: f64,
    pub priority: Priority,
    pub category: Category,
}

impl NewDesire {
    pub fn new(name: impl Into<String>, frequency: Frequency, cost: f64) -> Self {
        Self {
            name: name.into(),
            frequency,
            cost,
            priority: Priority::default(),
            category: Category::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Parses free-text form input. Empty priority or category fall back to defaults.
    pub fn parse(
        name: &str,
        frequency: &str,
        cost: &str,
        priority: &str,
        category: &str,
    ) -> Result<Self> {
        let name = validate_name(name)?;
        let frequency: Frequency = frequency.parse()?;
        let cost = parse_cost(cost)?;
        let priority = if priority.trim().is_empty() {
            Priority::default()
        } else {
            priority.parse()?
        };
        let category = if category.trim().is_empty() {
            Category::default()
        } else {
            category.parse()?
        };
        Ok(Self {
            name,
            frequency,
            cost,
            priority,
            category,
        })
    }

    pub(crate) fn into_desire(self) -> Result<Desire> {
        let name = validate_name(&self.name)?;
        validate_cost(self.cost)?;
        Ok(Desire {
            name,
            frequency: self.frequency,
            cost: self.cost,
            priority: self.priority,
            category: self.category,
            enabled: true,
        })
    }
}

/// Session-scoped monthly spending target. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BudgetGoal(f64);

impl BudgetGoal {
    /// Returns `Ok(None)` for zero, which means "no goal".
    pub fn new(amount: f64) -> Result<Option<Self>> {
        if !amount.is_finite() {
            return Err(DesireError::validation(
                "budget",
                "amount must be a finite number",
            ));
        }
        if amount < 0.0 {
            return Err(DesireError::validation("budget", "amount cannot be negative"));
        }
        if amount == 0.0 {
            return Ok(None);
        }
        Ok(Some(Self(amount)))
    }

    pub fn amount(self) -> f64 {
        self.0
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DesireError::validation("name", "name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_cost(cost: f64) -> Result<()> {
    if !cost.is_finite() {
        return Err(DesireError::validation("cost", "cost must be a finite number"));
    }
    if cost <= 0.0 {
        return Err(DesireError::validation("cost", "cost must be greater than 0"));
    }
    Ok(())
}

fn parse_cost(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let cost: f64 = trimmed.parse().map_err(|_| {
        DesireError::validation("cost", format!("`{}` is not a number", trimmed))
    })?;
    validate_cost(cost)?;
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn generated_ids_embed_sequence_and_timestamp() {
        let id = DesireId::generate(4, at());
        assert_eq!(id.as_str(), "desire_4_20240309_140507");
        assert_eq!(id.sequence(), Some(4));
        assert_eq!(DesireId::new("custom").sequence(), None);
    }

    #[test]
    fn parse_reports_the_offending_field() {
        let err = NewDesire::parse("Coffee", "Daily", "abc", "", "").unwrap_err();
        assert_eq!(err.field(), Some("cost"));

        let err = NewDesire::parse("Coffee", "Daily", "-5", "", "").unwrap_err();
        assert_eq!(err.field(), Some("cost"));

        let err = NewDesire::parse("   ", "Daily", "5", "", "").unwrap_err();
        assert_eq!(err.field(), Some("name"));

        let err = NewDesire::parse("Coffee", "Hourly", "5", "", "").unwrap_err();
        assert_eq!(err.field(), Some("frequency"));
    }

    #[test]
    fn parse_applies_defaults_and_trims() {
        let parsed = NewDesire::parse("  Gym ", "monthly", "45.5", "", "").unwrap();
        assert_eq!(parsed.name, "Gym");
        assert_eq!(parsed.priority, Priority::Medium);
        assert_eq!(parsed.category, Category::Other);
        assert_eq!(parsed.cost, 45.5);
    }

    #[test]
    fn budget_goal_zero_clears_and_negative_fails() {
        assert_eq!(BudgetGoal::new(0.0).unwrap(), None);
        assert_eq!(BudgetGoal::new(5000.0).unwrap().unwrap().amount(), 5000.0);
        assert_eq!(BudgetGoal::new(-1.0).unwrap_err().field(), Some("budget"));
        assert!(BudgetGoal::new(f64::NAN).is_err());
    }

    #[test]
    fn new_records_start_enabled() {
        let desire = NewDesire::new("Rent", Frequency::Monthly, 3000.0)
            .with_category(Category::Housing)
            .into_desire()
            .unwrap();
        assert!(desire.enabled);
        assert_eq!(desire.monthly_cost(), 3000.0);
    }
}
