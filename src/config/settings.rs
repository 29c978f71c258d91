//! User settings for convenios
//!
//! Persists display preferences, the HTTP listener address and report limits
//! in `config.json`. Every field has a default so older files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::ConvenioPaths;
use crate::error::ConvenioError;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Apply `HOST` / `PORT` environment overrides
    ///
    /// A `PORT` that does not parse is reported instead of silently ignored.
    pub fn with_env_overrides(mut self) -> Result<Self, ConvenioError> {
        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                self.host = host.trim().to_string();
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConvenioError::Config(format!("PORT must be a number: {}", port)))?;
        }
        Ok(self)
    }

    /// `host:port` string for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Maximum number of records listed by the report JSON endpoint
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

/// User settings for convenios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used in terminal and PDF output
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub reports: ReportSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "R$".to_string()
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_list_limit() -> usize {
    200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            server: ServerSettings::default(),
            reports: ReportSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ConvenioPaths) -> Result<Self, ConvenioError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ConvenioError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ConvenioError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ConvenioPaths) -> Result<(), ConvenioError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ConvenioError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            ConvenioError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "R$");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.reports.list_limit, 200);
        assert_eq!(settings.server.address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.server.port = 9090;
        settings.reports.list_limit = 50;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.reports.list_limit, 50);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"server": {"port": 81}}"#).unwrap();
        assert_eq!(settings.server.port, 81);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.date_format, "%d/%m/%Y");
    }
}
