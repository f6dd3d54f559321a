use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    let width = registry.names().map(str::len).max().unwrap_or(0);
    output::lines(
        registry
            .list()
            .map(|entry| format!("  {:<width$}  {}", entry.name, entry.description)),
    );
    output::info("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::lines([
        format!("  description: {}", entry.description),
        format!("  usage:       {}", entry.usage),
    ]);
}
