use std::{cmp::Reverse, fmt::Write};

use chrono::NaiveDateTime;

use crate::currency::AmountFormat;
use crate::desire::{BudgetGoal, Category, DesireStore, Priority};

use super::summary_service::{Statistics, SummaryService};

pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE_WIDTH: usize = 48;

/// Renders plain-text reports. Never touches the filesystem.
pub struct ReportService;

impl ReportService {
    /// Report over the whole store, independent of any view filter.
    pub fn build(
        store: &DesireStore,
        goal: Option<BudgetGoal>,
        generated_at: NaiveDateTime,
        format: &AmountFormat,
    ) -> String {
        let stats = SummaryService::overall(store, goal);
        Self::render(store, &stats, goal, generated_at, format)
    }

    /// `stats` is expected to cover every enabled record.
    pub fn render(
        store: &DesireStore,
        stats: &Statistics,
        goal: Option<BudgetGoal>,
        generated_at: NaiveDateTime,
        format: &AmountFormat,
    ) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);
        let thin = "-".repeat(RULE_WIDTH);

        let _ = writeln!(out, "Desire Report");
        let _ = writeln!(out, "Generated: {}", generated_at.format(REPORT_TIMESTAMP_FORMAT));
        let _ = writeln!(out, "{}", rule);

        let _ = writeln!(out);
        let _ = writeln!(out, "Overview");
        let _ = writeln!(out, "{}", thin);
        let _ = writeln!(out, "  Monthly total: {}", format.format(stats.monthly_total));
        let _ = writeln!(out, "  Yearly total:  {}", format.format(stats.yearly_total));
        let _ = writeln!(out, "  Active desires: {}", stats.qualifying_count);
        if let Some(goal) = goal {
            let _ = writeln!(out, "  Budget goal:   {}", format.format(goal.amount()));
            let _ = writeln!(
                out,
                "  Utilization:   {}%",
                stats.budget_utilization_percent.unwrap_or(0)
            );
            if stats.exceeds_budget(Some(goal)) {
                let _ = writeln!(
                    out,
                    "  Over budget by {}",
                    format.format(stats.monthly_total - goal.amount())
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "By category (monthly)");
        let _ = writeln!(out, "{}", thin);
        let categories = categories_by_spend(stats);
        if categories.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for (category, total) in categories {
            let _ = writeln!(out, "  {:<14} {}", category.label(), format.format(total));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "By priority");
        let _ = writeln!(out, "{}", thin);
        for priority in Priority::ALL {
            let _ = writeln!(
                out,
                "  {:<14} {}",
                priority.label(),
                stats.priority_count(priority)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Details");
        let _ = writeln!(out, "{}", thin);
        if store.is_empty() {
            let _ = writeln!(out, "  No desires recorded.");
        }
        let mut records: Vec<_> = store.iter().map(|(_, desire)| desire).collect();
        records.sort_by_key(|desire| Reverse(desire.priority));
        for desire in records {
            let status = if desire.enabled { "enabled" } else { "disabled" };
            let _ = writeln!(
                out,
                "  [{}] {} | {} | {} each | {} per month | {} | {}",
                status,
                desire.name,
                desire.frequency,
                format.format(desire.cost),
                format.format(desire.monthly_cost()),
                desire.priority,
                desire.category
            );
        }
        out
    }
}

/// Descending monthly spend; ties keep canonical category order.
fn categories_by_spend(stats: &Statistics) -> Vec<(Category, f64)> {
    let mut categories: Vec<(Category, f64)> = stats
        .category_totals
        .iter()
        .map(|(category, total)| (*category, *total))
        .collect();
    categories.sort_by(|a, b| b.1.total_cmp(&a.1));
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desire::{Frequency, NewDesire};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(18, 45, 10)
            .unwrap()
    }

    #[test]
    fn empty_store_still_renders_every_section() {
        let report = ReportService::build(&DesireStore::new(), None, at(), &AmountFormat::default());
        assert!(report.contains("Generated: 2024-06-30 18:45:10"));
        assert!(report.contains("Monthly total: ¥0.00"));
        assert!(report.contains("(none)"));
        assert!(report.contains("No desires recorded."));
        assert!(!report.contains("Budget goal"));
    }

    #[test]
    fn ties_in_category_spend_keep_canonical_order() {
        let mut store = DesireStore::new();
        store
            .add(
                NewDesire::new("Bus", Frequency::Monthly, 100.0).with_category(Category::Transport),
                at(),
            )
            .unwrap();
        store
            .add(
                NewDesire::new("Flat", Frequency::Monthly, 100.0).with_category(Category::Housing),
                at(),
            )
            .unwrap();
        let stats = SummaryService::overall(&store, None);
        let order: Vec<Category> = categories_by_spend(&stats)
            .into_iter()
            .map(|(category, _)| category)
            .collect();
        assert_eq!(order, vec![Category::Housing, Category::Transport]);
    }

    #[test]
    fn over_budget_line_appears_only_when_exceeded() {
        let mut store = DesireStore::new();
        store
            .add(NewDesire::new("Rent", Frequency::Monthly, 6000.0), at())
            .unwrap();
        let format = AmountFormat::default();
        let over = ReportService::build(&store, BudgetGoal::new(5000.0).unwrap(), at(), &format);
        assert!(over.contains("Utilization:   100%"));
        assert!(over.contains("Over budget by ¥1,000.00"));

        let under = ReportService::build(&store, BudgetGoal::new(8000.0).unwrap(), at(), &format);
        assert!(!under.contains("Over budget"));
    }
}
