use colored::{ColoredString, Colorize};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::RwLock;

use crate::desire::Priority;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    pub color: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self { color: true }
    }
}

static PREFERENCES: Lazy<RwLock<OutputPreferences>> =
    Lazy::new(|| RwLock::new(OutputPreferences::default()));

pub fn set_preferences(prefs: OutputPreferences) {
    if let Ok(mut guard) = PREFERENCES.write() {
        *guard = prefs;
    }
    if prefs.color {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "",
        MessageKind::Success => "[ok] ",
        MessageKind::Warning => "[!] ",
        MessageKind::Error => "[x] ",
        MessageKind::Hint => "hint: ",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}{}", build_label(kind), text),
    };

    if !preferences().color {
        return formatted;
    }

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Priority label padded to `width` and tinted with its display color.
pub fn priority_badge(priority: Priority, width: usize) -> String {
    let label = format!("{:<width$}", priority.label(), width = width);
    if !preferences().color {
        return label;
    }
    let tinted: ColoredString = match priority {
        Priority::Low => label.truecolor(0x27, 0xae, 0x60),
        Priority::Medium => label.truecolor(0xf3, 0x9c, 0x12),
        Priority::High => label.truecolor(0xe7, 0x4c, 0x3c),
        Priority::Essential => label.truecolor(0x8e, 0x44, 0xad),
    };
    tinted.to_string()
}

/// Row text, dimmed when the record is switched off.
pub fn row(text: String, enabled: bool) -> String {
    if enabled || !preferences().color {
        text
    } else {
        text.dimmed().to_string()
    }
}

/// Utilization percentage colored by how close it is to the goal.
pub fn utilization(percent: u32, exceeded: bool) -> String {
    let text = format!("{}%", percent);
    if !preferences().color {
        return text;
    }
    if exceeded {
        text.bright_red().bold().to_string()
    } else if percent >= 80 {
        text.bright_yellow().to_string()
    } else {
        text.bright_green().to_string()
    }
}
