use std::collections::BTreeMap;

use crate::desire::{BudgetGoal, Category, DesireFilter, DesireStore, Priority};

/// Aggregate view over the records that are enabled and match a filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub monthly_total: f64,
    pub yearly_total: f64,
    /// Only categories with at least one qualifying record appear.
    pub category_totals: BTreeMap<Category, f64>,
    /// Only priorities with at least one qualifying record appear.
    pub priority_counts: BTreeMap<Priority, usize>,
    /// `min(100, floor(monthly / goal * 100))` when a goal is set.
    pub budget_utilization_percent: Option<u32>,
    pub qualifying_count: usize,
    /// Records that match the filter but are switched off.
    pub disabled_count: usize,
}

impl Statistics {
    /// Compares the raw (unclamped) monthly total to the goal.
    pub fn exceeds_budget(&self, goal: Option<BudgetGoal>) -> bool {
        goal.map_or(false, |goal| self.monthly_total > goal.amount())
    }

    /// Signed difference between the goal and the monthly total.
    pub fn remaining_budget(&self, goal: Option<BudgetGoal>) -> Option<f64> {
        goal.map(|goal| goal.amount() - self.monthly_total)
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.priority_counts.get(&priority).copied().unwrap_or(0)
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn compute(
        store: &DesireStore,
        filter: &DesireFilter,
        goal: Option<BudgetGoal>,
    ) -> Statistics {
        let mut stats = Statistics::default();
        for (_, desire) in store.iter() {
            if !filter.matches(desire) {
                continue;
            }
            if !desire.enabled {
                stats.disabled_count += 1;
                continue;
            }
            let monthly = desire.monthly_cost();
            stats.monthly_total += monthly;
            *stats.category_totals.entry(desire.category).or_insert(0.0) += monthly;
            *stats.priority_counts.entry(desire.priority).or_insert(0) += 1;
            stats.qualifying_count += 1;
        }
        stats.yearly_total = stats.monthly_total * 12.0;
        stats.budget_utilization_percent =
            goal.map(|goal| utilization_percent(stats.monthly_total, goal));
        stats
    }

    /// Statistics over every enabled record, ignoring any view filter.
    pub fn overall(store: &DesireStore, goal: Option<BudgetGoal>) -> Statistics {
        Self::compute(store, &DesireFilter::all(), goal)
    }
}

fn utilization_percent(monthly_total: f64, goal: BudgetGoal) -> u32 {
    let percent = (monthly_total * 100.0 / goal.amount()).floor();
    percent.clamp(0.0, 100.0) as u32
}
