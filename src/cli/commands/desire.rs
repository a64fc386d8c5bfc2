use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::Statistics;
use crate::currency::AmountFormat;
use crate::desire::{BudgetGoal, Category, Frequency, NewDesire, Priority};

const ADD_USAGE: &str = "add <name> <frequency> <cost> [priority] [category]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record a new recurring desire", ADD_USAGE, cmd_add),
        CommandEntry::new("list", "List desires under the active filter", "list", cmd_list),
        CommandEntry::new("enable", "Count a desire in totals again", "enable <row|id>", cmd_enable),
        CommandEntry::new(
            "disable",
            "Keep a desire but leave it out of totals",
            "disable <row|id>",
            cmd_disable,
        ),
        CommandEntry::new("toggle", "Flip a desire on or off", "toggle <row|id>", cmd_toggle),
        CommandEntry::new("delete", "Remove a desire", "delete <row|id>", cmd_delete),
        CommandEntry::new("clear", "Remove every desire", "clear", cmd_clear),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let input = if args.is_empty() && context.mode() == CliMode::Interactive {
        prompt_new_desire(context)?
    } else {
        if args.len() < 3 || args.len() > 5 {
            return Err(CommandError::usage(ADD_USAGE));
        }
        NewDesire::parse(
            args[0],
            args[1],
            args[2],
            args.get(3).copied().unwrap_or(""),
            args.get(4).copied().unwrap_or(""),
        )?
    };

    let name = input.name.clone();
    let (id, stats, goal, format) = {
        let mut tracker = context.tracker_mut()?;
        let id = tracker.add_desire(input)?;
        (
            id,
            tracker.statistics(),
            tracker.budget_goal(),
            tracker.amount_format().clone(),
        )
    };
    io::print_success(format!("Added desire `{}` ({}).", name, id));
    print_totals_line(&stats, goal, &format);
    Ok(())
}

fn prompt_new_desire(context: &ShellContext) -> Result<NewDesire, CommandError> {
    let theme = &context.theme;
    let name = io::prompt_text(theme, "Name")?;
    let frequencies: Vec<&str> = Frequency::ALL.iter().map(|f| f.label()).collect();
    let frequency = io::prompt_select(theme, "Frequency", &frequencies, 2)?;
    let cost = io::prompt_text(theme, "Cost per occurrence")?;
    let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.label()).collect();
    let priority = io::prompt_select(theme, "Priority", &priorities, 1)?;
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    let category = io::prompt_select(theme, "Category", &categories, categories.len() - 1)?;
    Ok(NewDesire::parse(
        &name,
        frequencies[frequency],
        &cost,
        priorities[priority],
        categories[category],
    )?)
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let tracker = context.tracker()?;
    let format = tracker.amount_format();
    let filter = tracker.filter();
    let rows = tracker.rows();

    if !filter.is_all() {
        io::print_info(format!("Filter: {}", filter));
    }
    if rows.is_empty() {
        if tracker.store().is_empty() {
            io::print_info("No desires recorded yet. Use `add` to create one.");
        } else {
            io::print_info("No desires match the active filter.");
        }
        return Ok(());
    }

    let name_width = rows
        .iter()
        .map(|row| row.desire.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    io::print_info(format!(
        "  {:>3}  {:<8}  {:<name_width$}  {:<9}  {:>12}  {:>12}  {:<9}  {:<13}  {}",
        "#",
        "Status",
        "Name",
        "Frequency",
        "Cost",
        "Monthly",
        "Priority",
        "Category",
        "Id",
        name_width = name_width
    ));
    for row in &rows {
        let desire = row.desire;
        let status = if desire.enabled { "on" } else { "off" };
        let priority = if desire.enabled {
            output::priority_badge(desire.priority, 9)
        } else {
            format!("{:<9}", desire.priority.label())
        };
        let line = format!(
            "  {:>3}  {:<8}  {:<name_width$}  {:<9}  {:>12}  {:>12}  {}  {:<13}  {}",
            row.row,
            status,
            desire.name,
            desire.frequency.label(),
            format.format(desire.cost),
            format.format(desire.monthly_cost()),
            priority,
            desire.category.label(),
            row.id,
            name_width = name_width
        );
        println!("{}", output::row(line, desire.enabled));
    }

    let stats = tracker.statistics();
    io::print_info(format!(
        "{} shown of {} total.",
        rows.len(),
        tracker.store().len()
    ));
    print_totals_line(&stats, tracker.budget_goal(), format);
    Ok(())
}

fn cmd_enable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_enabled(context, args, "enable <row|id>", Some(true))
}

fn cmd_disable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_enabled(context, args, "disable <row|id>", Some(false))
}

fn cmd_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_enabled(context, args, "toggle <row|id>", None)
}

/// `None` flips the current state.
fn set_enabled(
    context: &mut ShellContext,
    args: &[&str],
    usage: &str,
    target: Option<bool>,
) -> CommandResult {
    let selector = single_arg(args, usage)?;
    let (name, enabled, stats, goal, format) = {
        let mut tracker = context.tracker_mut()?;
        let id = tracker.resolve(selector)?;
        let (name, current) = match tracker.store().get(&id) {
            Some(desire) => (desire.name.clone(), desire.enabled),
            None => return Err(CommandError::Message(format!("desire {} vanished", id))),
        };
        let enabled = target.unwrap_or(!current);
        tracker.toggle_desire(&id, enabled)?;
        (
            name,
            enabled,
            tracker.statistics(),
            tracker.budget_goal(),
            tracker.amount_format().clone(),
        )
    };
    let state = if enabled { "enabled" } else { "disabled" };
    io::print_success(format!("`{}` {}.", name, state));
    print_totals_line(&stats, goal, &format);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = single_arg(args, "delete <row|id>")?;
    let (removed, stats, goal, format) = {
        let mut tracker = context.tracker_mut()?;
        let id = tracker.resolve(selector)?;
        let name = tracker
            .store()
            .get(&id)
            .map(|desire| desire.name.clone())
            .unwrap_or_else(|| id.to_string());
        if !context.confirm(&format!("Delete `{}`?", name))? {
            io::print_info("Deletion cancelled.");
            return Ok(());
        }
        let removed = tracker.delete_desire(&id)?;
        (
            removed,
            tracker.statistics(),
            tracker.budget_goal(),
            tracker.amount_format().clone(),
        )
    };
    io::print_success(format!("Deleted `{}`.", removed.name));
    print_totals_line(&stats, goal, &format);
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let mut tracker = context.tracker_mut()?;
    let count = tracker.store().len();
    if count == 0 {
        io::print_info("Nothing to clear.");
        return Ok(());
    }
    if !context.confirm(&format!("Remove all {} desire(s)?", count))? {
        io::print_info("Clear cancelled.");
        return Ok(());
    }
    tracker.clear_all();
    io::print_success(format!("Removed {} desire(s).", count));
    Ok(())
}

fn single_arg<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(*value),
        _ => Err(CommandError::usage(usage)),
    }
}

pub(crate) fn print_totals_line(
    stats: &Statistics,
    goal: Option<BudgetGoal>,
    format: &AmountFormat,
) {
    let mut line = format!(
        "Monthly: {} | Yearly: {}",
        format.format(stats.monthly_total),
        format.format(stats.yearly_total)
    );
    if let Some((percent, exceeded)) = budget_status(stats, goal) {
        line.push_str(&format!(
            " | Budget: {}",
            output::utilization(percent, exceeded)
        ));
    }
    io::print_info(line);
}

/// Clamped utilization plus whether the raw total is over the goal.
fn budget_status(stats: &Statistics, goal: Option<BudgetGoal>) -> Option<(u32, bool)> {
    let percent = stats.budget_utilization_percent?;
    Some((percent, stats.exceeds_budget(goal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::SummaryService;
    use crate::desire::{DesireStore, NewDesire};
    use chrono::NaiveDate;

    fn stats_for(monthly: f64, goal: Option<BudgetGoal>) -> Statistics {
        let at = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut store = DesireStore::new();
        store
            .add(NewDesire::new("Rent", Frequency::Monthly, monthly), at)
            .unwrap();
        SummaryService::overall(&store, goal)
    }

    #[test]
    fn total_equal_to_goal_is_not_over_budget() {
        let goal = BudgetGoal::new(5000.0).unwrap();
        let stats = stats_for(5000.0, goal);
        assert_eq!(budget_status(&stats, goal), Some((100, false)));
    }

    #[test]
    fn total_above_goal_is_over_budget_at_clamped_percent() {
        let goal = BudgetGoal::new(5000.0).unwrap();
        let stats = stats_for(5000.5, goal);
        assert_eq!(budget_status(&stats, goal), Some((100, true)));
    }

    #[test]
    fn no_goal_means_no_budget_status() {
        let stats = stats_for(5000.0, None);
        assert_eq!(budget_status(&stats, None), None);
    }
}
