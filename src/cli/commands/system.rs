use std::path::Path;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "save",
            "Save desires to the managed store or a given path",
            "save [path]",
            cmd_save,
        ),
        CommandEntry::new(
            "load",
            "Replace desires with the contents of a saved file",
            "load [path]",
            cmd_load,
        ),
        CommandEntry::new("backups", "List store backups, newest first", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Restore the store from a backup",
            "restore <name|index>",
            cmd_restore,
        ),
        CommandEntry::new(
            "config",
            "Show settings or change one",
            "config [key value]",
            cmd_config,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let tracker = context.tracker()?;
    let count = tracker.store().len();
    let path = match args {
        [] => tracker.save_default()?,
        [path] => {
            let path = Path::new(*path);
            tracker.save(path)?;
            path.to_path_buf()
        }
        _ => return Err(CommandError::usage("save [path]")),
    };
    io::print_success(format!("Saved {} desire(s) to {}.", count, path.display()));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let meta = {
        let mut tracker = context.tracker_mut()?;
        match args {
            [] => match tracker.load_default()? {
                Some(meta) => meta,
                None => {
                    io::print_warning(format!(
                        "No saved desires at {}.",
                        tracker.storage().store_path().display()
                    ));
                    return Ok(());
                }
            },
            [path] => tracker.load(Path::new(*path))?,
            _ => return Err(CommandError::usage("load [path]")),
        }
    };
    io::print_success(format!(
        "Loaded {} desire(s) from {}.",
        meta.record_count,
        meta.path.display()
    ));
    context.report_load(&meta);
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.tracker()?.list_backups()?;
    if backups.is_empty() {
        io::print_info("No backups yet. One is taken each time `save` overwrites the store.");
        return Ok(());
    }
    output::section("Backups");
    for (index, name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", index + 1, name));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let selector = match args {
        [value] => *value,
        _ => return Err(CommandError::usage("restore <name|index>")),
    };
    let meta = {
        let mut tracker = context.tracker_mut()?;
        let backups = tracker.list_backups()?;
        let name = match selector.parse::<usize>() {
            Ok(index) if index >= 1 && index <= backups.len() => backups[index - 1].clone(),
            Ok(index) => {
                return Err(CommandError::InvalidArguments(format!(
                    "backup {} does not exist ({} available)",
                    index,
                    backups.len()
                )))
            }
            Err(_) => selector.to_string(),
        };
        if !context.confirm(&format!("Replace current desires with `{}`?", name))? {
            io::print_info("Restore cancelled.");
            return Ok(());
        }
        tracker.restore_backup(&name)?
    };
    io::print_success(format!(
        "Restored {} desire(s) from {}.",
        meta.record_count,
        meta.path.display()
    ));
    context.report_load(&meta);
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            output::section("Configuration");
            for (key, value) in context.config().entries() {
                io::print_info(format!("  {:<20} {}", key, value));
            }
            Ok(())
        }
        [key, value] => {
            let mut next = context.config().clone();
            next.set(key, value)?;
            context.update_config(next)?;
            io::print_success(format!("{} set to {}.", key, value));
            Ok(())
        }
        _ => Err(CommandError::usage("config [key value]")),
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    io::print_info(build_info::current().summary());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&command) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
