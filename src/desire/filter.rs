use std::fmt;

use crate::errors::Result;

use super::{Category, Desire, Priority};

/// View filter over the store. `None` in either slot means "All".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesireFilter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

impl DesireFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(category: Option<Category>, priority: Option<Priority>) -> Self {
        Self { category, priority }
    }

    /// Parses selector text where `all` (any case) or an empty string means no constraint.
    pub fn parse(category: &str, priority: &str) -> Result<Self> {
        Ok(Self {
            category: parse_slot(category)?,
            priority: parse_slot(priority)?,
        })
    }

    pub fn matches(&self, desire: &Desire) -> bool {
        self.category.map_or(true, |c| c == desire.category)
            && self.priority.map_or(true, |p| p == desire.priority)
    }

    pub fn is_all(&self) -> bool {
        self.category.is_none() && self.priority.is_none()
    }
}

fn parse_slot<T>(raw: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = crate::errors::DesireError>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for DesireFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category.map_or("All", Category::label);
        let priority = self.priority.map_or("All", Priority::label);
        write!(f, "category={}, priority={}", category, priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desire::Frequency;

    fn desire(category: Category, priority: Priority) -> Desire {
        Desire {
            name: "Item".into(),
            frequency: Frequency::Monthly,
            cost: 10.0,
            priority,
            category,
            enabled: true,
        }
    }

    #[test]
    fn all_matches_everything() {
        let filter = DesireFilter::parse("ALL", "all").unwrap();
        assert!(filter.is_all());
        assert!(filter.matches(&desire(Category::Food, Priority::Low)));
    }

    #[test]
    fn both_slots_must_match() {
        let filter = DesireFilter::parse("food", "high").unwrap();
        assert!(filter.matches(&desire(Category::Food, Priority::High)));
        assert!(!filter.matches(&desire(Category::Food, Priority::Low)));
        assert!(!filter.matches(&desire(Category::Housing, Priority::High)));
        assert_eq!(filter.to_string(), "category=Food, priority=High");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!(DesireFilter::parse("pets", "all").is_err());
    }
}
