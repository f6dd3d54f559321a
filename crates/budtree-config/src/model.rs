use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::PathBuf};

use crate::ConfigError;

/// Name of the directory created under the user's home when no override is set.
pub const DEFAULT_HOME_DIR: &str = ".budget_tree";

/// User-configurable preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Quiet period, in milliseconds, before pending edits are saved.
    #[serde(default = "Config::default_autosave_quiet_ms")]
    pub autosave_quiet_ms: u64,
    /// Maximum number of history entries kept; unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_retention: Option<usize>,
    #[serde(default = "Config::default_root_name")]
    pub root_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for budget data. Defaults to `<home>/data`.
    pub default_data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            theme: Theme::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            autosave_quiet_ms: Self::default_autosave_quiet_ms(),
            history_retention: None,
            root_name: Self::default_root_name(),
            default_data_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 8] = [
        "locale",
        "currency",
        "theme",
        "ui_color_enabled",
        "autosave_quiet_ms",
        "history_retention",
        "root_name",
        "default_data_root",
    ];

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_autosave_quiet_ms() -> u64 {
        800
    }

    pub fn default_root_name() -> String {
        "General budget".into()
    }

    /// Directory holding the current tree, history and favorites.
    pub fn resolve_data_root(&self, home: &std::path::Path) -> PathBuf {
        match &self.default_data_root {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    /// Default application home, `~/.budget_tree`.
    pub fn default_home() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_HOME_DIR)
    }

    /// Current value of `key` rendered for display.
    pub fn get_value(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "theme" => self.theme.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "autosave_quiet_ms" => self.autosave_quiet_ms.to_string(),
            "history_retention" => self
                .history_retention
                .map(|limit| limit.to_string())
                .unwrap_or_else(|| "unlimited".into()),
            "root_name" => self.root_name.clone(),
            "default_data_root" => self
                .default_data_root
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(default)".into()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Updates `key` from its textual form. `none` clears optional settings.
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let value = raw.trim();
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        };
        match key {
            "locale" if !value.is_empty() => self.locale = value.to_string(),
            "currency" if !value.is_empty() => self.currency = value.to_ascii_uppercase(),
            "theme" => self.theme = Theme::parse(value).ok_or_else(invalid)?,
            "ui_color_enabled" => self.ui_color_enabled = parse_bool(value).ok_or_else(invalid)?,
            "autosave_quiet_ms" => self.autosave_quiet_ms = value.parse().map_err(|_| invalid())?,
            "history_retention" => {
                self.history_retention = if is_none(value) {
                    None
                } else {
                    match value.parse::<usize>() {
                        Ok(limit) if limit > 0 => Some(limit),
                        _ => return Err(invalid()),
                    }
                }
            }
            "root_name" if !value.is_empty() => self.root_name = value.to_string(),
            "default_data_root" => {
                self.default_data_root = (!is_none(value)).then(|| PathBuf::from(value))
            }
            "locale" | "currency" | "root_name" => return Err(invalid()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn is_none(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Output style of the command line tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Plain,
    #[default]
    Iconic,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" => Some(Theme::Plain),
            "iconic" => Some(Theme::Iconic),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Theme::Plain => "plain",
            Theme::Iconic => "iconic",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().and_then(Theme::parse).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let cfg: Config =
            serde_json::from_str(r#"{"locale":"en-US","currency":"EUR","theme":"neon"}"#).unwrap();
        assert_eq!(cfg.theme, Theme::Iconic);
        assert_eq!(cfg.autosave_quiet_ms, 800);
        assert_eq!(cfg.root_name, "General budget");
    }

    #[test]
    fn set_value_validates_input() {
        let mut cfg = Config::default();
        cfg.set_value("history_retention", "25").unwrap();
        assert_eq!(cfg.history_retention, Some(25));
        cfg.set_value("history_retention", "none").unwrap();
        assert_eq!(cfg.history_retention, None);

        assert!(matches!(
            cfg.set_value("history_retention", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set_value("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set_value("root_name", "  "),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn every_key_is_readable() {
        let cfg = Config::default();
        for key in Config::KEYS {
            assert!(cfg.get_value(key).is_ok(), "{key}");
        }
    }
}
