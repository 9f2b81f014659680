//! Domain primitive types used across the devyard workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The four kinds of declared specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    /// Named activation group.
    Bundle,
    /// Application running in its own container.
    App,
    /// Library mounted into the containers of the apps using it.
    Lib,
    /// Third-party service container.
    Service,
}

impl SpecKind {
    /// Every kind, in the order collections are stored.
    pub const ALL: [Self; 4] = [Self::Bundle, Self::App, Self::Lib, Self::Service];

    /// Directory name holding specs of this kind.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Bundle => "bundles",
            Self::App => "apps",
            Self::Lib => "libs",
            Self::Service => "services",
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundle => write!(f, "bundle"),
            Self::App => write!(f, "app"),
            Self::Lib => write!(f, "lib"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// Source repository location of an app or lib.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Repo(String);

impl Repo {
    /// Creates a repo from its declared location.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Returns the declared location.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, e.g. `a` for `github.com/app/a`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.0)
    }

    /// Where the managed checkout of this repo lives under `repos_dir`.
    #[must_use]
    pub fn managed_path(&self, repos_dir: &Path) -> PathBuf {
        repos_dir.join(self.0.trim_start_matches('/').trim_end_matches('/'))
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One allocated host/container port pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Port published on the host.
    pub mapped_host_port: u16,
    /// Port the process listens on inside the container.
    pub in_container_port: u16,
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mapped_host_port, self.in_container_port)
    }
}

/// Port allocation table keyed by app or service name.
///
/// Produced by the port allocator, read by the compose compiler. Entry order
/// within each list is preserved in the compiled output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortMap(std::collections::BTreeMap<String, Vec<PortMapping>>);

impl PortMap {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the mappings of `name`.
    pub fn insert(&mut self, name: impl Into<String>, mappings: Vec<PortMapping>) {
        let _ = self.0.insert(name.into(), mappings);
    }

    /// Mappings of `name`; empty when the allocator assigned none.
    #[must_use]
    pub fn get(&self, name: &str) -> &[PortMapping] {
        self.0.get(name).map_or(&[], Vec::as_slice)
    }
}
