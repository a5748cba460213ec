//! Configuration
//!
//! YAML document with three optional sections:
//!
//! ```yaml
//! prefixes:
//!   ex: http://example.org/
//! materialize:
//!   compact: true
//!   meshed: false
//! adapter:
//!   default_timeout_ms: 2000
//! ```
//!
//! Missing sections and fields take their defaults. A `prefixes` section
//! replaces the default prefix set rather than extending it.

use crate::persistence::{AdapterConfig, MemoryStorage, PersistenceAdapter};
use crate::rdf::{MaterializeOptions, PrefixMap};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML syntax or shape error
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemstoreConfig {
    /// Prefixes used for compaction and ID expansion
    pub prefixes: PrefixMap,
    /// Default materialization options
    pub materialize: MaterializeOptions,
    /// Persistence adapter settings
    pub adapter: AdapterConfig,
}

impl Default for SemstoreConfig {
    fn default() -> Self {
        Self {
            prefixes: PrefixMap::with_common_prefixes(),
            materialize: MaterializeOptions::default(),
            adapter: AdapterConfig::default(),
        }
    }
}

impl SemstoreConfig {
    pub fn from_yaml_str(input: &str) -> ConfigResult<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        info!(
            "Loaded config from {:?} ({} prefixes)",
            path,
            config.prefixes.len()
        );
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Adapter over a fresh in-memory backend using these settings
    pub fn memory_adapter(&self) -> PersistenceAdapter {
        PersistenceAdapter::new(Arc::new(MemoryStorage::new()), &self.adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_round_trip() {
        let config = SemstoreConfig::default();
        assert!(config.prefixes.get_iri("rdfs").is_ok());

        let yaml = config.to_yaml_string().unwrap();
        let parsed = SemstoreConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_document() {
        let config = SemstoreConfig::from_yaml_str(
            "prefixes:\n  ex: http://example.org/\nmaterialize:\n  meshed: false\nadapter:\n  default_timeout_ms: 250\n",
        )
        .unwrap();

        assert_eq!(config.prefixes.len(), 1);
        assert_eq!(config.prefixes.expand("ex:a").unwrap(), "http://example.org/a");
        assert!(config.materialize.compact);
        assert!(!config.materialize.meshed);
        assert_eq!(config.adapter.default_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.memory_adapter().timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_empty_and_invalid() {
        assert_eq!(SemstoreConfig::from_yaml_str("").unwrap(), SemstoreConfig::default());
        assert!(matches!(
            SemstoreConfig::from_yaml_str("materialize: 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SemstoreConfig::from_yaml_file("/nonexistent/semstore.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
