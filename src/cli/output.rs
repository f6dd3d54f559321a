use colored::Colorize;
use std::fmt;
use std::io::IsTerminal;
use std::sync::{OnceLock, RwLock};

use budtree_config::{Config, Theme};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    pub use_color: bool,
    pub theme: Theme,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            use_color: false,
            theme: Theme::Iconic,
        }
    }
}

impl OutputPreferences {
    /// Colors only reach a terminal, and never when `NO_COLOR` is set.
    pub fn from_config(config: &Config) -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let use_color = config.ui_color_enabled
            && !no_color
            && config.theme != Theme::Plain
            && std::io::stdout().is_terminal();
        Self {
            use_color,
            theme: config.theme,
        }
    }
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    colored::control::set_override(prefs.use_color);
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

pub fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

impl MessageKind {
    fn label(self) -> &'static str {
        match self {
            MessageKind::Info => "INFO",
            MessageKind::Success => "SUCCESS",
            MessageKind::Warning => "WARNING",
            MessageKind::Error => "ERROR",
            MessageKind::Section => "",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            MessageKind::Info => "[i]",
            MessageKind::Success => "[+]",
            MessageKind::Warning => "[!]",
            MessageKind::Error => "[x]",
            MessageKind::Section => "",
        }
    }

    fn render(self, text: &str, prefs: &OutputPreferences) -> String {
        let plain = match (self, prefs.theme) {
            (MessageKind::Section, _) => format!("=== {} ===", text.trim()),
            (_, Theme::Plain) => format!("{}: {text}", self.label()),
            (_, Theme::Iconic) => format!("{}: {} {text}", self.label(), self.icon()),
        };
        if !prefs.use_color {
            return plain;
        }
        match self {
            MessageKind::Success => plain.bright_green().to_string(),
            MessageKind::Warning => plain.bright_yellow().to_string(),
            MessageKind::Error => plain.bright_red().to_string(),
            MessageKind::Section => plain.bold().to_string(),
            MessageKind::Info => plain,
        }
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let rendered = kind.render(&message.to_string(), &preferences());
    if kind == MessageKind::Section {
        println!();
    }
    println!("{rendered}");
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

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Prints pre-rendered lines verbatim.
pub fn lines<I, S>(lines: I)
where
    I: IntoIterator<Item = S>,
    S: fmt::Display,
{
    for line in lines {
        println!("{line}");
    }
}
