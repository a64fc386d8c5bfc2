use std::path::Path;

use crate::cli::commands::desire::print_totals_line;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::desire::{Category, DesireFilter, Priority};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "budget",
            "Show or set the monthly budget goal (0 clears it)",
            "budget [amount]",
            cmd_budget,
        ),
        CommandEntry::new(
            "filter",
            "Restrict list and stats to a category and/or priority",
            "filter [category|all] [priority|all] | filter clear",
            cmd_filter,
        ),
        CommandEntry::new("stats", "Show totals under the active filter", "stats", cmd_stats),
        CommandEntry::new("report", "Print the full text report", "report", cmd_report),
        CommandEntry::new(
            "export",
            "Write the text report to a file",
            "export [path]",
            cmd_export,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let tracker = context.tracker()?;
            match tracker.budget_goal() {
                Some(goal) => io::print_info(format!(
                    "Budget goal: {} per month.",
                    tracker.amount_format().format(goal.amount())
                )),
                None => io::print_info("No budget goal set."),
            }
            Ok(())
        }
        [amount] => {
            let value: f64 = amount.trim().parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{}` is not a number", amount))
            })?;
            let mut tracker = context.tracker_mut()?;
            tracker.set_budget_goal(value)?;
            match tracker.budget_goal() {
                Some(goal) => io::print_success(format!(
                    "Budget goal set to {} per month.",
                    tracker.amount_format().format(goal.amount())
                )),
                None => io::print_success("Budget goal cleared."),
            }
            print_totals_line(
                &tracker.statistics(),
                tracker.budget_goal(),
                tracker.amount_format(),
            );
            Ok(())
        }
        _ => Err(CommandError::usage("budget [amount]")),
    }
}

fn cmd_filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = match args {
        [] => {
            let filter = context.tracker()?.filter();
            if filter.is_all() {
                io::print_info("No filter active.");
            } else {
                io::print_info(format!("Filter: {}", filter));
            }
            return Ok(());
        }
        [word] if word.eq_ignore_ascii_case("clear") => DesireFilter::all(),
        [single] => parse_single(single)?,
        [category, priority] => DesireFilter::parse(category, priority)?,
        _ => {
            return Err(CommandError::usage(
                "filter [category|all] [priority|all] | filter clear",
            ))
        }
    };

    context.tracker_mut()?.set_filter(filter);
    if filter.is_all() {
        io::print_success("Filter cleared.");
    } else {
        io::print_success(format!("Filter set: {}", filter));
    }
    Ok(())
}

/// One word may name either a category or a priority.
fn parse_single(word: &str) -> Result<DesireFilter, CommandError> {
    if let Ok(filter) = DesireFilter::parse(word, "") {
        return Ok(filter);
    }
    match word.parse::<Priority>() {
        Ok(priority) => Ok(DesireFilter::new(None, Some(priority))),
        Err(_) => Err(CommandError::InvalidArguments(format!(
            "`{}` is neither a category ({}) nor a priority",
            word,
            Category::ALL
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let tracker = context.tracker()?;
    let format = tracker.amount_format();
    let filter = tracker.filter();
    let stats = tracker.statistics();

    output::section("Statistics");
    if !filter.is_all() {
        io::print_info(format!("Filter: {}", filter));
    }
    io::print_info(format!(
        "  Monthly total:  {}",
        format.format(stats.monthly_total)
    ));
    io::print_info(format!(
        "  Yearly total:   {}",
        format.format(stats.yearly_total)
    ));
    io::print_info(format!(
        "  Counted:        {} ({} disabled)",
        stats.qualifying_count, stats.disabled_count
    ));

    if let Some(goal) = tracker.budget_goal() {
        let percent = stats.budget_utilization_percent.unwrap_or(0);
        let exceeded = stats.exceeds_budget(Some(goal));
        io::print_info(format!(
            "  Budget goal:    {}",
            format.format(goal.amount())
        ));
        io::print_info(format!(
            "  Utilization:    {}",
            output::utilization(percent, exceeded)
        ));
        if exceeded {
            io::print_warning(format!(
                "Over budget by {}.",
                format.format(stats.monthly_total - goal.amount())
            ));
        } else {
            io::print_info(format!(
                "  Remaining:      {}",
                format.format(stats.remaining_budget(Some(goal)).unwrap_or(0.0))
            ));
        }
    }

    if !stats.category_totals.is_empty() {
        io::print_info("  By category:");
        for (category, total) in &stats.category_totals {
            io::print_info(format!(
                "    {:<13} {}",
                category.label(),
                format.format(*total)
            ));
        }
    }
    io::print_info("  By priority:");
    for priority in Priority::ALL {
        io::print_info(format!(
            "    {}  {}",
            output::priority_badge(priority, 9),
            stats.priority_count(priority)
        ));
    }
    Ok(())
}

fn cmd_report(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let report = context.tracker()?.render_report();
    println!("{}", report);
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let tracker = context.tracker()?;
    let path = match args {
        [] => tracker.export_report_default()?,
        [path] => {
            let path = Path::new(*path);
            tracker.export_report(path)?;
            path.to_path_buf()
        }
        _ => return Err(CommandError::usage("export [path]")),
    };
    io::print_success(format!("Report written to {}.", path.display()));
    Ok(())
}
