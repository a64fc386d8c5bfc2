use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::errors::{DesireError, Result};

use super::{Desire, DesireId, NewDesire};

/// In-memory collection of desires keyed by id, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesireStore {
    entries: Vec<(DesireId, Desire)>,
    next_sequence: u64,
}

impl DesireStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts a new enabled record, returning its fresh id.
    pub fn add(&mut self, input: NewDesire, at: NaiveDateTime) -> Result<DesireId> {
        let desire = input.into_desire()?;
        let id = self.allocate_id(at);
        self.entries.push((id.clone(), desire));
        Ok(id)
    }

    pub fn toggle(&mut self, id: &DesireId, enabled: bool) -> Result<()> {
        let desire = self
            .get_mut(id)
            .ok_or_else(|| DesireError::NotFound(id.to_string()))?;
        desire.enabled = enabled;
        Ok(())
    }

    pub fn delete(&mut self, id: &DesireId) -> Result<Desire> {
        let index = self
            .position(id)
            .ok_or_else(|| DesireError::NotFound(id.to_string()))?;
        Ok(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Swaps the whole contents. Records keep the order they are given in.
    /// Any duplicate id or invalid record rejects the batch and leaves the store as it was.
    pub fn replace(&mut self, records: Vec<(DesireId, Desire)>) -> Result<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for (id, desire) in &records {
            if !seen.insert(id) {
                return Err(DesireError::Format(format!("duplicate desire id `{}`", id)));
            }
            desire.validate()?;
        }
        let resume = records
            .iter()
            .filter_map(|(id, _)| id.sequence())
            .map(|seq| seq + 1)
            .max()
            .unwrap_or(0)
            .max(records.len() as u64);
        self.entries = records;
        self.next_sequence = resume;
        Ok(())
    }

    pub fn get(&self, id: &DesireId) -> Option<&Desire> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, desire)| desire)
    }

    fn get_mut(&mut self, id: &DesireId) -> Option<&mut Desire> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == id)
            .map(|(_, desire)| desire)
    }

    fn position(&self, id: &DesireId) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == id)
    }

    pub fn contains(&self, id: &DesireId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DesireId, &Desire)> {
        self.entries.iter().map(|(id, desire)| (id, desire))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maps a 1-based row number or a literal id onto an existing id.
    pub fn resolve(&self, selector: &str) -> Result<DesireId> {
        let trimmed = selector.trim();
        if let Ok(row) = trimmed.parse::<usize>() {
            return row
                .checked_sub(1)
                .and_then(|index| self.entries.get(index))
                .map(|(id, _)| id.clone())
                .ok_or_else(|| DesireError::NotFound(format!("row {}", row)));
        }
        let id = DesireId::new(trimmed);
        if self.contains(&id) {
            Ok(id)
        } else {
            Err(DesireError::NotFound(trimmed.to_string()))
        }
    }

    fn allocate_id(&mut self, at: NaiveDateTime) -> DesireId {
        loop {
            let candidate = DesireId::generate(self.next_sequence, at);
            self.next_sequence += 1;
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl Serialize for DesireStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, desire) in &self.entries {
            map.serialize_entry(id, desire)?;
        }
        map.end()
    }
}
