//! Compiler configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! threads = 4
//! include_unconfirmed = false
//! locales = ["en_GB", "fr-CA"]
//! ```

use crate::locale::{LocaleId, TagError};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("invalid compiler configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot read configuration `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },
    #[error(transparent)]
    Locale(#[from] TagError),
    #[error("`threads` must be at least 1")]
    ZeroThreads,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Size of a dedicated worker pool. `None` uses rayon's global pool.
    pub threads: Option<usize>,
    /// Keep elements marked `draft="unconfirmed"` or `draft="provisional"`.
    pub include_unconfirmed: bool,
    /// Compile only these locales and their ancestors.
    pub locales: Option<Vec<String>>,
}

impl CompileConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            source: Arc::new(e),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        self.locale_filter().map(drop)
    }

    /// The requested locales plus all their ancestors, or `None` when every
    /// locale is wanted.
    pub fn locale_filter(&self) -> Result<Option<BTreeSet<LocaleId>>, ConfigError> {
        let Some(tags) = &self.locales else {
            return Ok(None);
        };
        let mut wanted = BTreeSet::new();
        for tag in tags {
            wanted.extend(LocaleId::parse(tag)?.ancestors());
        }
        Ok(Some(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(CompileConfig::from_toml_str("").unwrap(), CompileConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let c = CompileConfig::from_toml_str(
            "threads = 2\ninclude_unconfirmed = true\nlocales = [\"en-GB\"]\n",
        )
        .unwrap();
        assert_eq!(c.threads, Some(2));
        assert!(c.include_unconfirmed);
        let filter = c.locale_filter().unwrap().unwrap();
        let tags: Vec<String> = filter.iter().map(ToString::to_string).collect();
        assert_eq!(tags, ["en", "en_GB", "root"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CompileConfig::from_toml_str("threads = 0"),
            Err(ConfigError::ZeroThreads)
        ));
        assert!(matches!(
            CompileConfig::from_toml_str("locales = [\"e\"]"),
            Err(ConfigError::Locale(_))
        ));
        assert!(matches!(
            CompileConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locdata.toml");
        std::fs::write(&path, "threads = 3").unwrap();
        assert_eq!(CompileConfig::from_path(&path).unwrap().threads, Some(3));
        assert!(matches!(
            CompileConfig::from_path(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
