//! Upgrades raw persisted records into fully populated [`Desire`] values.
//!
//! Older files may omit `priority`, `category` or `enabled`, and the first
//! releases wrote localized labels instead of the canonical English ones. Both
//! are repaired here and every repair is reported as a migration note. Fields
//! this version does not know are dropped and reported as warnings; a record
//! that cannot be trusted fails the whole load.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::desire::{Category, Desire, DesireId, Frequency, Priority};
use crate::errors::{DesireError, Result};

const KNOWN_FIELDS: [&str; 6] = ["name", "frequency", "cost", "priority", "category", "enabled"];

/// Outcome of migrating a raw id → record mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub records: Vec<(DesireId, Desire)>,
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.migrations.is_empty() && self.warnings.is_empty()
    }
}

pub fn migrate(raw: Map<String, Value>) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();
    for (id, value) in raw {
        let desire = migrate_record(&id, value, &mut report)?;
        report.records.push((DesireId::new(id), desire));
    }
    Ok(report)
}

fn migrate_record(id: &str, value: Value, report: &mut MigrationReport) -> Result<Desire> {
    let Value::Object(fields) = value else {
        return Err(DesireError::Format(format!(
            "record `{}` is not an object",
            id
        )));
    };

    let name = match fields.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => {
            if name.trim() != name {
                report
                    .migrations
                    .push(format!("{}: trimmed whitespace around name", id));
            }
            name.trim().to_string()
        }
        Some(Value::String(_)) => return Err(field_error(id, "name", "is empty")),
        Some(_) => return Err(field_error(id, "name", "is not a string")),
        None => return Err(field_error(id, "name", "is missing")),
    };

    let frequency = parse_label::<Frequency>(id, "frequency", &fields, report)?
        .ok_or_else(|| field_error(id, "frequency", "is missing"))?;

    let cost = match fields.get("cost") {
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| field_error(id, "cost", "is not representable"))?,
        Some(_) => return Err(field_error(id, "cost", "is not numeric")),
        None => return Err(field_error(id, "cost", "is missing")),
    };
    if !cost.is_finite() || cost <= 0.0 {
        return Err(field_error(id, "cost", "must be greater than 0"));
    }

    let priority = match parse_label::<Priority>(id, "priority", &fields, report)? {
        Some(priority) => priority,
        None => {
            report.migrations.push(format!(
                "{}: priority defaulted to {}",
                id,
                Priority::default()
            ));
            Priority::default()
        }
    };

    let category = match parse_label::<Category>(id, "category", &fields, report)? {
        Some(category) => category,
        None => {
            report.migrations.push(format!(
                "{}: category defaulted to {}",
                id,
                Category::default()
            ));
            Category::default()
        }
    };

    let enabled = match fields.get("enabled") {
        Some(Value::Bool(enabled)) => *enabled,
        Some(Value::Null) | None => {
            report
                .migrations
                .push(format!("{}: enabled defaulted to true", id));
            true
        }
        Some(_) => return Err(field_error(id, "enabled", "is not a boolean")),
    };

    for key in fields.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            let warning = format!("{}: dropped unknown field `{}`", id, key);
            tracing::warn!("{}", warning);
            report.warnings.push(warning);
        }
    }

    Ok(Desire {
        name,
        frequency,
        cost,
        priority,
        category,
        enabled,
    })
}

/// Reads an optional label field. `Ok(None)` means absent or null.
fn parse_label<T>(
    id: &str,
    field: &'static str,
    fields: &Map<String, Value>,
    report: &mut MigrationReport,
) -> Result<Option<T>>
where
    T: FromStr<Err = DesireError> + LegacyLabel + std::fmt::Display,
{
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(label)) => {
            let parsed: T = label
                .parse()
                .map_err(|_| field_error(id, field, &format!("has unknown label `{}`", label)))?;
            if T::is_legacy(label) {
                report.migrations.push(format!(
                    "{}: {} `{}` converted to {}",
                    id, field, label, parsed
                ));
            }
            Ok(Some(parsed))
        }
        Some(_) => Err(field_error(id, field, "is not a string")),
    }
}

trait LegacyLabel {
    fn is_legacy(label: &str) -> bool;
}

impl LegacyLabel for Frequency {
    fn is_legacy(label: &str) -> bool {
        Frequency::is_legacy_label(label)
    }
}

impl LegacyLabel for Priority {
    fn is_legacy(label: &str) -> bool {
        Priority::is_legacy_label(label)
    }
}

impl LegacyLabel for Category {
    fn is_legacy(label: &str) -> bool {
        Category::is_legacy_label(label)
    }
}

fn field_error(id: &str, field: &str, problem: &str) -> DesireError {
    DesireError::Format(format!("record `{}`: {} {}", id, field, problem))
}
