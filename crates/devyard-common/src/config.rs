//! User configuration model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DevyardError, Result};
use crate::layout::Layout;

/// Root configuration read from `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevyardConfig {
    /// Directory containing `bundles/`, `apps/`, `libs/`, and `services/`.
    pub specs_dir: PathBuf,
    /// Bundles activated when none are given on the command line.
    pub active_bundles: Vec<String>,
    /// Where the compiled compose document is written.
    pub compose_file: PathBuf,
    /// Port allocation table, if one has been produced.
    pub ports_file: Option<PathBuf>,
    /// Path conventions shared with collaborators.
    pub layout: Layout,
}

impl Default for DevyardConfig {
    fn default() -> Self {
        let data_dir = crate::constants::data_dir();
        Self {
            specs_dir: data_dir.join("specs"),
            active_bundles: Vec::new(),
            compose_file: data_dir.join("compose").join("docker-compose.yml"),
            ports_file: None,
            layout: Layout::default(),
        }
    }
}

impl DevyardConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML, or
    /// [`DevyardError::Config`] if its layout is unusable.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| DevyardError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content, path)
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| DevyardError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.layout.validate()?;
        Ok(config)
    }
}
