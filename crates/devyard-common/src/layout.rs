//! Filesystem conventions shared between the compiler and its collaborators.
//!
//! The staging mount is populated by the file-copy service, the run-state
//! sentinel is read by whatever restarts containers, and repos are checked
//! out by the repo manager. The compiler only needs to agree with them on
//! paths, so all of that lives in one value passed by reference.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{DevyardError, Result};

/// Host and container paths the compiled artifacts refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Host root under which managed repos are checked out.
    pub repos_dir: PathBuf,
    /// Host root of per-app staging directories.
    pub host_staging_root: PathBuf,
    /// Staging mount point inside every app container.
    pub container_staging_dir: String,
    /// Run-state directory inside app containers.
    pub run_state_dir: String,
    /// Sentinel file name inside `run_state_dir`.
    pub sentinel_name: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            repos_dir: PathBuf::from(constants::DEFAULT_REPOS_DIR),
            host_staging_root: PathBuf::from(constants::DEFAULT_HOST_STAGING_ROOT),
            container_staging_dir: constants::CONTAINER_STAGING_DIR.to_string(),
            run_state_dir: constants::CONTAINER_RUN_STATE_DIR.to_string(),
            sentinel_name: constants::FIRST_START_SENTINEL.to_string(),
        }
    }
}

impl Layout {
    /// Returns a layout rooted at `repos_dir` with default container paths.
    #[must_use]
    pub fn with_repos_dir(repos_dir: impl Into<PathBuf>) -> Self {
        Self {
            repos_dir: repos_dir.into(),
            ..Self::default()
        }
    }

    /// Host staging directory of one app.
    #[must_use]
    pub fn host_staging_dir(&self, app: &str) -> PathBuf {
        self.host_staging_root.join(app)
    }

    /// `host:container` volume string for the staging mount of `app`.
    #[must_use]
    pub fn staging_volume(&self, app: &str) -> String {
        format!(
            "{}:{}",
            self.host_staging_dir(app).display(),
            self.container_staging_dir
        )
    }

    /// Absolute sentinel path inside the container.
    #[must_use]
    pub fn sentinel_path(&self) -> String {
        format!(
            "{}/{}",
            self.run_state_dir.trim_end_matches('/'),
            self.sentinel_name
        )
    }

    /// Checks the container-side paths that are embedded in startup
    /// commands.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::Config`] if a container directory is not
    /// absolute, or a path contains whitespace, or the sentinel name is empty
    /// or contains `/`.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("container_staging_dir", &self.container_staging_dir),
            ("run_state_dir", &self.run_state_dir),
        ] {
            if !value.starts_with('/') {
                return Err(invalid(format!("layout.{field} must be absolute, got \"{value}\"")));
            }
        }
        if self.sentinel_name.is_empty() || self.sentinel_name.contains('/') {
            return Err(invalid(format!(
                "layout.sentinel_name must be a plain file name, got \"{}\"",
                self.sentinel_name
            )));
        }
        for (field, value) in [
            ("container_staging_dir", &self.container_staging_dir),
            ("run_state_dir", &self.run_state_dir),
            ("sentinel_name", &self.sentinel_name),
        ] {
            if value.chars().any(char::is_whitespace) {
                return Err(invalid(format!("layout.{field} must not contain whitespace")));
            }
        }
        Ok(())
    }

    /// Host repos root.
    #[must_use]
    pub fn repos_dir(&self) -> &Path {
        &self.repos_dir
    }
}

fn invalid(message: String) -> DevyardError {
    DevyardError::Config { message }
}
