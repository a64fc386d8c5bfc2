use crate::core::time::Clock;
use crate::desire::{Desire, DesireFilter, DesireId, DesireStore, NewDesire};
use crate::errors::Result;

/// A record as shown in a listing. `row` is the 1-based position in the full store,
/// so it stays valid as a selector even when the listing is filtered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesireRow<'a> {
    pub row: usize,
    pub id: &'a DesireId,
    pub desire: &'a Desire,
}

pub struct DesireService;

impl DesireService {
    pub fn add(store: &mut DesireStore, input: NewDesire, clock: &dyn Clock) -> Result<DesireId> {
        let id = store.add(input, clock.now())?;
        tracing::debug!(%id, "added desire");
        Ok(id)
    }

    pub fn toggle(store: &mut DesireStore, id: &DesireId, enabled: bool) -> Result<()> {
        store.toggle(id, enabled)?;
        tracing::debug!(%id, enabled, "toggled desire");
        Ok(())
    }

    pub fn delete(store: &mut DesireStore, id: &DesireId) -> Result<Desire> {
        let removed = store.delete(id)?;
        tracing::debug!(%id, name = %removed.name, "deleted desire");
        Ok(removed)
    }

    pub fn clear(store: &mut DesireStore) {
        let count = store.len();
        store.clear();
        tracing::debug!(count, "cleared all desires");
    }

    pub fn list<'a>(store: &'a DesireStore, filter: &DesireFilter) -> Vec<DesireRow<'a>> {
        store
            .iter()
            .enumerate()
            .filter(|(_, (_, desire))| filter.matches(desire))
            .map(|(index, (id, desire))| DesireRow {
                row: index + 1,
                id,
                desire,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::desire::{Category, Frequency};
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn filtered_listing_keeps_store_row_numbers() {
        let mut store = DesireStore::new();
        let clock = clock();
        DesireService::add(
            &mut store,
            NewDesire::new("Rent", Frequency::Monthly, 3000.0).with_category(Category::Housing),
            &clock,
        )
        .unwrap();
        DesireService::add(
            &mut store,
            NewDesire::new("Coffee", Frequency::Daily, 20.0).with_category(Category::Food),
            &clock,
        )
        .unwrap();

        let rows = DesireService::list(&store, &DesireFilter::new(Some(Category::Food), None));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].desire.name, "Coffee");
        assert_eq!(store.resolve("2").unwrap(), *rows[0].id);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = DesireStore::new();
        DesireService::add(
            &mut store,
            NewDesire::new("Gym", Frequency::Monthly, 50.0),
            &clock(),
        )
        .unwrap();
        DesireService::clear(&mut store);
        assert!(store.is_empty());
    }
}
