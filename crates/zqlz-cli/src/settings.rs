//! Settings file for restore defaults
//!
//! An optional TOML file at `<config dir>/zqlz/restore.toml` supplies
//! defaults; command line flags override whatever it sets.
//!
//! ```toml
//! batch_size = 50
//! error_threshold = 20
//! progress_interval = 500
//! schema = "public"
//! connect_timeout_secs = 60
//!
//! [tls]
//! mode = "require"       # or "disable" for a local server
//! verify_server = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use zqlz_core::TlsConfig;
use zqlz_restore::RestoreOptions;

pub const SETTINGS_FILE_NAME: &str = "restore.toml";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub restore: RestoreOptions,
    pub connect_timeout_secs: u64,
    pub tls: TlsConfig,
    /// Write the rolling JSON log file
    pub log_to_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restore: RestoreOptions::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            tls: TlsConfig::default(),
            log_to_file: true,
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from the default location when it
    /// exists. An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_settings_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("zqlz"))
}

pub fn default_settings_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.restore.batch.batch_size, 50);
        assert_eq!(settings.connect_timeout_secs, 60);
    }

    #[test]
    fn test_parse_overrides() {
        let settings = Settings::parse(indoc! {r#"
            batch_size = 100
            error_threshold = 5
            schema = "shop"
            force_batches = true
            connect_timeout_secs = 15
            log_to_file = false
        "#})
        .unwrap();

        assert_eq!(settings.restore.batch.batch_size, 100);
        assert_eq!(settings.restore.batch.error_threshold, 5);
        assert_eq!(settings.restore.batch.progress_interval, 500);
        assert_eq!(settings.restore.schema, "shop");
        assert!(settings.restore.force_batches);
        assert_eq!(settings.connect_timeout_secs, 15);
        assert!(!settings.log_to_file);
    }

    #[test]
    fn test_tls_table() {
        let settings = Settings::parse(indoc! {r#"
            batch_size = 25

            [tls]
            verify_server = true
        "#})
        .unwrap();

        assert_eq!(settings.restore.batch.batch_size, 25);
        assert_eq!(settings.tls, TlsConfig::require().verify_server(true));
        assert_eq!(Settings::default().tls, TlsConfig::require());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Settings::parse("batch_size = \"lots\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/no/such/restore.toml"))).unwrap_err();

        assert!(err.to_string().contains("Failed to read settings file"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restore.toml");
        std::fs::write(&path, "error_threshold = 3\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.restore.batch.error_threshold, 3);
    }
}
