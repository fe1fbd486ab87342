use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PurseError, Result};
use crate::locale::Locale;

/// Overrides `~/.config/purse` (used by the integration tests).
pub const CONFIG_DIR_ENV: &str = "PURSE_CONFIG_DIR";

pub const DB_FILE: &str = "purse.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Account that category autocompletion and the entry form work against.
    #[serde(default)]
    pub current_account: Option<i64>,
    /// Enter moves to the next field instead of being passed to the field.
    #[serde(default)]
    pub enter_navigation: bool,
    #[serde(default)]
    pub locale: Locale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            current_account: None,
            enter_navigation: false,
            locale: Locale::default(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }
}

fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("purse")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("purse")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PurseError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            current_account: Some(3),
            enter_navigation: true,
            locale: Locale::default(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.current_account, Some(3));
        assert!(loaded.enter_navigation);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.current_account.is_none());
        assert!(!s.enter_navigation);
        assert_eq!(s.locale.currency_symbol, "$");
        assert!(s.db_path().ends_with(DB_FILE));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "locale": {"currency_symbol": "£"}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.current_account, None);
        assert_eq!(s.locale.currency_symbol, "£");
        assert_eq!(s.locale.decimal_separator, ".");
        assert_eq!(s.locale.date_format, "%m/%d/%Y");
    }
}
