//! Runtime configuration.
//!
//! Loaded from a TOML file; every field has a default, so an empty file is a
//! valid configuration.
//!
//! ```toml
//! path_escaping = "rfc6901"
//! coalesce_replaces = true
//! validate_schema_on_apply = true
//! max_path_depth = 256
//! log_filter = "content_patch=debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use content_path::{PathEscaping, MAX_PATH_DEPTH};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::apply::ApplyPatchOptions;
use crate::merge::MergeOptions;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CONTENT_PATCH_CONFIG";
/// Environment variable overriding `log_filter`.
pub const LOG_ENV: &str = "CONTENT_PATCH_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(deserialize_with = "deserialize_escaping")]
    pub path_escaping: PathEscaping,
    pub coalesce_replaces: bool,
    pub validate_schema_on_apply: bool,
    pub max_path_depth: usize,
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            path_escaping: PathEscaping::Raw,
            coalesce_replaces: true,
            validate_schema_on_apply: true,
            max_path_depth: MAX_PATH_DEPTH,
            log_filter: "info".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Load from `CONTENT_PATCH_CONFIG` when set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_options(&self) -> ApplyPatchOptions {
        ApplyPatchOptions { max_path_depth: self.max_path_depth }
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions { coalesce_replaces: self.coalesce_replaces }
    }
}

fn deserialize_escaping<'de, D>(deserializer: D) -> Result<PathEscaping, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    match name.as_str() {
        "raw" => Ok(PathEscaping::Raw),
        "rfc6901" => Ok(PathEscaping::Rfc6901),
        other => Err(serde::de::Error::unknown_variant(other, &["raw", "rfc6901"])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CoreConfig::from_toml_str("").unwrap(), CoreConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = CoreConfig::from_toml_str(
            r#"
            path_escaping = "rfc6901"
            coalesce_replaces = false
            validate_schema_on_apply = false
            max_path_depth = 12
            log_filter = "content_patch=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.path_escaping, PathEscaping::Rfc6901);
        assert!(!config.merge_options().coalesce_replaces);
        assert!(!config.validate_schema_on_apply);
        assert_eq!(config.apply_options().max_path_depth, 12);
        assert_eq!(config.log_filter, "content_patch=debug");
    }

    #[test]
    fn rejects_unknown_escaping_and_fields() {
        assert!(CoreConfig::from_toml_str(r#"path_escaping = "url""#).is_err());
        assert!(CoreConfig::from_toml_str("colour = true").is_err());
    }

    #[test]
    fn missing_file() {
        let err = CoreConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
