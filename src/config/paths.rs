//! Path management for convenios
//!
//! Resolves where configuration, data files and the audit log live.
//!
//! ## Path Resolution Order
//!
//! 1. `CONVENIOS_DATA_DIR` environment variable (if set)
//! 2. The platform configuration directory reported by `directories`
//!    (`~/.config/convenios` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ConvenioError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "CONVENIOS_DATA_DIR";

/// Manages all paths used by convenios
#[derive(Debug, Clone)]
pub struct ConvenioPaths {
    /// Base directory for all convenios data
    base_dir: PathBuf,
}

impl ConvenioPaths {
    /// Create a new ConvenioPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform configuration directory can be found
    /// and the override variable is not set.
    pub fn new() -> Result<Self, ConvenioError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create ConvenioPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn companies_file(&self) -> PathBuf {
        self.data_dir().join("companies.json")
    }

    pub fn agreements_file(&self) -> PathBuf {
        self.data_dir().join("agreements.json")
    }

    pub fn contracts_file(&self) -> PathBuf {
        self.data_dir().join("contracts.json")
    }

    pub fn amendments_file(&self) -> PathBuf {
        self.data_dir().join("amendments.json")
    }

    pub fn payments_file(&self) -> PathBuf {
        self.data_dir().join("payments.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), ConvenioError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ConvenioError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| ConvenioError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, ConvenioError> {
    ProjectDirs::from("br", "convenios", "convenios")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            ConvenioError::Config(format!(
                "Could not determine a configuration directory; set {}",
                DATA_DIR_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConvenioPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConvenioPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.agreements_file(),
            temp_dir.path().join("data").join("agreements.json")
        );
        assert_eq!(
            paths.payments_file(),
            temp_dir.path().join("data").join("payments.json")
        );
    }
}
