//! Resolution of the application's home directory.

use std::path::PathBuf;

use budtree_config::Config;

/// Overrides the application home; used by tests and portable installs.
pub const HOME_ENV: &str = "BUDGET_TREE_HOME";

/// `$BUDGET_TREE_HOME` when set and non-empty, otherwise `~/.budget_tree`.
pub fn app_home() -> PathBuf {
    match std::env::var_os(HOME_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => Config::default_home(),
    }
}
