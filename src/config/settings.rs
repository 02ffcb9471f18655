use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GpamError, Result};

/// User-level configuration, loaded from `~/.gpam.toml`.
///
/// Every field has a sensible default so GPAM works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file location. Relative paths are resolved against the home directory.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// `tracing` filter used when neither `GPAM_LOG` nor `--verbose` is given.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Record mutating operations in the audit database.
    #[serde(default = "default_audit_log")]
    pub audit_log: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    ".gpam.vaults.xml".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_audit_log() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            log_filter: default_log_filter(),
            audit_log: default_audit_log(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    const FILE_NAME: &'static str = ".gpam.toml";

    /// Load settings from `<home_dir>/.gpam.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(home_dir: &Path) -> Result<Self> {
        let config_path = home_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            GpamError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Build the full path to the vault file.
    ///
    /// Example: `/home/user/.gpam.vaults.xml`
    pub fn vault_path(&self, home_dir: &Path) -> PathBuf {
        home_dir.join(&self.vault_file)
    }
}

/// The current user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| GpamError::ConfigError("cannot determine the home directory".into()))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_file, ".gpam.vaults.xml");
        assert_eq!(s.log_filter, "warn");
        assert!(s.audit_log);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, ".gpam.vaults.xml");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_file = "secrets/vaults.xml"
log_filter = "gpam=debug"
audit_log = false
"#;
        fs::write(tmp.path().join(".gpam.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "secrets/vaults.xml");
        assert_eq!(settings.log_filter, "gpam=debug");
        assert!(!settings.audit_log);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gpam.toml"), "audit_log = false\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert!(!settings.audit_log);
        // Rest should be defaults
        assert_eq!(settings.vault_file, ".gpam.vaults.xml");
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gpam.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(GpamError::ConfigError(_))));
    }

    #[test]
    fn vault_path_is_relative_to_home() {
        let s = Settings::default();
        let path = s.vault_path(Path::new("/home/user"));
        assert_eq!(path, PathBuf::from("/home/user/.gpam.vaults.xml"));
    }

    #[test]
    fn vault_path_keeps_absolute_paths() {
        let s = Settings {
            vault_file: "/var/lib/gpam/vaults.xml".to_string(),
            ..Settings::default()
        };
        let path = s.vault_path(Path::new("/home/user"));
        assert_eq!(path, PathBuf::from("/var/lib/gpam/vaults.xml"));
    }
}
