//! The four spec collections of one invocation.

use std::collections::BTreeMap;

use devyard_common::error::{DevyardError, Result};
use devyard_common::types::SpecKind;
use serde::{Deserialize, Serialize};

use crate::records::{App, Bundle, Lib, Service};

/// Dependency edges a spec holds, grouped by the kind they point at.
pub trait DependencyEdges {
    /// Names of `target` kind this spec depends on, in declared order.
    fn edges(&self, target: SpecKind) -> &[String];
}

impl DependencyEdges for App {
    fn edges(&self, target: SpecKind) -> &[String] {
        match target {
            SpecKind::App => &self.depends.apps,
            SpecKind::Lib => &self.depends.libs,
            SpecKind::Service => &self.depends.services,
            SpecKind::Bundle => &[],
        }
    }
}

impl DependencyEdges for Lib {
    fn edges(&self, target: SpecKind) -> &[String] {
        match target {
            SpecKind::Lib => &self.depends.libs,
            _ => &[],
        }
    }
}

impl DependencyEdges for Service {
    fn edges(&self, _target: SpecKind) -> &[String] {
        &[]
    }
}

/// Bundles, apps, libs, and services keyed by name.
///
/// Maps are ordered so every walk over a collection is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecSet {
    /// Activation groups.
    pub bundles: BTreeMap<String, Bundle>,
    /// Applications.
    pub apps: BTreeMap<String, App>,
    /// Libraries.
    pub libs: BTreeMap<String, Lib>,
    /// Services.
    pub services: BTreeMap<String, Service>,
}

impl SpecSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bundle.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::DuplicateName`] if the name is already taken.
    pub fn insert_bundle(&mut self, name: impl Into<String>, bundle: Bundle) -> Result<()> {
        let name = name.into();
        self.claim(&name, SpecKind::Bundle)?;
        let _ = self.bundles.insert(name, bundle);
        Ok(())
    }

    /// Adds an app.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::DuplicateName`] if the name is already taken.
    pub fn insert_app(&mut self, name: impl Into<String>, app: App) -> Result<()> {
        let name = name.into();
        self.claim(&name, SpecKind::App)?;
        let _ = self.apps.insert(name, app);
        Ok(())
    }

    /// Adds a lib.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::DuplicateName`] if the name is already taken.
    pub fn insert_lib(&mut self, name: impl Into<String>, lib: Lib) -> Result<()> {
        let name = name.into();
        self.claim(&name, SpecKind::Lib)?;
        let _ = self.libs.insert(name, lib);
        Ok(())
    }

    /// Adds a service.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::DuplicateName`] if the name is already taken.
    pub fn insert_service(&mut self, name: impl Into<String>, service: Service) -> Result<()> {
        let name = name.into();
        self.claim(&name, SpecKind::Service)?;
        let _ = self.services.insert(name, service);
        Ok(())
    }

    fn claim(&self, name: &str, kind: SpecKind) -> Result<()> {
        match self.kind_of(name) {
            Some(first) => Err(DevyardError::DuplicateName {
                name: name.to_string(),
                first,
                second: kind,
            }),
            None => Ok(()),
        }
    }

    /// Kind under which `name` is declared, checking bundles first.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<SpecKind> {
        SpecKind::ALL
            .into_iter()
            .find(|&kind| self.contains(kind, name))
    }

    /// Returns true if `name` is declared as `kind`.
    #[must_use]
    pub fn contains(&self, kind: SpecKind, name: &str) -> bool {
        match kind {
            SpecKind::Bundle => self.bundles.contains_key(name),
            SpecKind::App => self.apps.contains_key(name),
            SpecKind::Lib => self.libs.contains_key(name),
            SpecKind::Service => self.services.contains_key(name),
        }
    }

    /// Sorted names declared as `kind`.
    #[must_use]
    pub fn names(&self, kind: SpecKind) -> Vec<&str> {
        match kind {
            SpecKind::Bundle => self.bundles.keys().map(String::as_str).collect(),
            SpecKind::App => self.apps.keys().map(String::as_str).collect(),
            SpecKind::Lib => self.libs.keys().map(String::as_str).collect(),
            SpecKind::Service => self.services.keys().map(String::as_str).collect(),
        }
    }

    /// Edges of `target` kind held by the `kind` spec called `name`.
    ///
    /// Returns `None` when no such spec is declared. Bundles hold members,
    /// not dependency edges, so they always yield an empty slice.
    #[must_use]
    pub fn edges(&self, kind: SpecKind, name: &str, target: SpecKind) -> Option<&[String]> {
        match kind {
            SpecKind::Bundle => self.bundles.get(name).map(|_| &[] as &[String]),
            SpecKind::App => self.apps.get(name).map(|s| s.edges(target)),
            SpecKind::Lib => self.libs.get(name).map(|s| s.edges(target)),
            SpecKind::Service => self.services.get(name).map(|s| s.edges(target)),
        }
    }

    /// Total number of declared specs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len() + self.apps.len() + self.libs.len() + self.services.len()
    }

    /// Returns true when nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
