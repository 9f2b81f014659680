//! Spec assembly: the fully resolved, active-only view of a [`SpecSet`].
//!
//! Assembly filters the raw specs down to the active set, replaces every
//! app's and lib's direct lib list with its transitive lib closure, and
//! fills in defaults. Direct app and service dependencies are kept as
//! declared. The result is rebuilt from scratch on every call.

use std::collections::{BTreeMap, BTreeSet};

use devyard_common::constants::KEEPALIVE_COMMAND;
use devyard_common::error::{DevyardError, Result};
use devyard_common::types::{Repo, SpecKind};
use devyard_spec::{App, Commands, ConditionalLinks, ImageSource, Lib, Service, SpecSet};
use indexmap::IndexSet;

use crate::expander::{self, ActiveSet};

/// A repo checkout and where it is mounted inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMount {
    /// Source repository.
    pub repo: Repo,
    /// In-container mount point.
    pub mount: String,
}

/// An active app with its lib closure expanded and defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledApp {
    /// Repo and mount, when the app has source code.
    pub source: Option<SourceMount>,
    /// Resolved image or build context.
    pub image: ImageSource,
    /// Direct app dependencies, duplicates removed.
    pub apps: Vec<String>,
    /// Transitive lib closure, in discovery order.
    pub libs: IndexSet<String>,
    /// Direct service dependencies, duplicates removed.
    pub services: Vec<String>,
    /// Startup instructions with defaults applied.
    pub commands: Commands,
    /// Optional links, resolved later against the active set.
    pub conditional_links: ConditionalLinks,
    /// Declared in-container ports.
    pub ports: Vec<u16>,
}

/// An active lib with its lib closure expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledLib {
    /// Source repository.
    pub repo: Repo,
    /// In-container mount point.
    pub mount: String,
    /// Install instruction.
    pub install: Option<String>,
    /// Transitive lib closure, in discovery order.
    pub libs: IndexSet<String>,
}

/// The assembled view of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledSpecs {
    /// Bundles that were activated.
    pub bundles: BTreeSet<String>,
    /// Active apps.
    pub apps: BTreeMap<String, AssembledApp>,
    /// Active libs.
    pub libs: BTreeMap<String, AssembledLib>,
    /// Active services, unchanged from their declarations.
    pub services: BTreeMap<String, Service>,
}

impl AssembledSpecs {
    /// Looks up an active app.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::NotFound`] if the app is not active.
    pub fn app(&self, name: &str) -> Result<&AssembledApp> {
        self.apps.get(name).ok_or_else(|| not_found(SpecKind::App, name))
    }

    /// Looks up an active lib.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::NotFound`] if the lib is not active.
    pub fn lib(&self, name: &str) -> Result<&AssembledLib> {
        self.libs.get(name).ok_or_else(|| not_found(SpecKind::Lib, name))
    }

    /// Looks up an active service.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::NotFound`] if the service is not active.
    pub fn service(&self, name: &str) -> Result<&Service> {
        self.services
            .get(name)
            .ok_or_else(|| not_found(SpecKind::Service, name))
    }

    /// Kind of the active spec called `name`.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<SpecKind> {
        if self.apps.contains_key(name) {
            Some(SpecKind::App)
        } else if self.libs.contains_key(name) {
            Some(SpecKind::Lib)
        } else if self.services.contains_key(name) {
            Some(SpecKind::Service)
        } else {
            None
        }
    }

    /// Names of active apps and services, apps first, each sorted.
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.apps
            .keys()
            .chain(self.services.keys())
            .map(String::as_str)
    }

    /// `(name, kind)` of every active app, lib, and service.
    pub fn entries(&self) -> impl Iterator<Item = (&str, SpecKind)> {
        let apps = self.apps.keys().map(|n| (n.as_str(), SpecKind::App));
        let libs = self.libs.keys().map(|n| (n.as_str(), SpecKind::Lib));
        let services = self.services.keys().map(|n| (n.as_str(), SpecKind::Service));
        apps.chain(libs).chain(services)
    }

    /// In-container ports each active app and service asks to publish.
    ///
    /// Containers declaring no ports are left out. This is what the port
    /// allocator works from when it writes the port map.
    #[must_use]
    pub fn declared_ports(&self) -> BTreeMap<String, Vec<u16>> {
        let apps = self.apps.iter().map(|(name, app)| (name, &app.ports));
        let services = self.services.iter().map(|(name, svc)| (name, &svc.ports));
        apps.chain(services)
            .filter(|(_, ports)| !ports.is_empty())
            .map(|(name, ports)| (name.clone(), ports.clone()))
            .collect()
    }
}

fn not_found(kind: SpecKind, name: &str) -> DevyardError {
    DevyardError::NotFound {
        kind,
        name: name.to_string(),
    }
}

/// Assembles the active view of `specs` for `active_bundles`.
///
/// # Errors
///
/// Returns an error if a bundle or hard dependency is undeclared, or an
/// active app does not declare exactly one of `image` and `build`. No
/// partial result is returned.
pub fn assemble<S: AsRef<str>>(specs: &SpecSet, active_bundles: &[S]) -> Result<AssembledSpecs> {
    tracing::info!(bundles = active_bundles.len(), "assembling specs");
    let active = expander::active_entities(active_bundles, specs)?;

    let mut assembled = AssembledSpecs {
        bundles: active.bundles.clone(),
        ..AssembledSpecs::default()
    };
    for name in &active.apps {
        let app = specs.apps.get(name).ok_or_else(|| not_found(SpecKind::App, name))?;
        let _ = assembled
            .apps
            .insert(name.clone(), assemble_app(name, app, specs)?);
    }
    for name in &active.libs {
        let lib = specs.libs.get(name).ok_or_else(|| not_found(SpecKind::Lib, name))?;
        let _ = assembled
            .libs
            .insert(name.clone(), assemble_lib(name, lib, specs)?);
    }
    for name in &active.services {
        let service = specs
            .services
            .get(name)
            .ok_or_else(|| not_found(SpecKind::Service, name))?;
        let _ = assembled.services.insert(name.clone(), service.clone());
    }

    debug_assert!(closure_is_active(&assembled, &active));
    tracing::info!(
        apps = assembled.apps.len(),
        libs = assembled.libs.len(),
        services = assembled.services.len(),
        "specs assembled"
    );
    Ok(assembled)
}

fn assemble_app(name: &str, app: &App, specs: &SpecSet) -> Result<AssembledApp> {
    let image = app.image_source(name)?;
    let source = match (&app.repo, &app.mount) {
        (Some(repo), Some(mount)) => Some(SourceMount {
            repo: repo.clone(),
            mount: mount.clone(),
        }),
        (None, None) => None,
        _ => {
            tracing::warn!(app = %name, "repo and mount must be declared together, ignoring source");
            None
        }
    };
    let libs = expander::discovery_order(SpecKind::Lib, name, specs, SpecKind::App)?;
    tracing::debug!(app = %name, libs = libs.len(), "lib closure expanded");

    Ok(AssembledApp {
        source,
        image,
        apps: dedup(&app.depends.apps),
        libs,
        services: dedup(&app.depends.services),
        commands: app.commands.clone().unwrap_or_else(default_commands),
        conditional_links: app.conditional_links.clone(),
        ports: app.ports.clone(),
    })
}

fn assemble_lib(name: &str, lib: &Lib, specs: &SpecSet) -> Result<AssembledLib> {
    Ok(AssembledLib {
        repo: lib.repo.clone(),
        mount: lib.mount.clone(),
        install: lib.install.clone(),
        libs: expander::discovery_order(SpecKind::Lib, name, specs, SpecKind::Lib)?,
    })
}

/// Commands of an app that declares none: nothing once, and a placeholder
/// that keeps the container up for its dependents.
fn default_commands() -> Commands {
    Commands {
        once: Vec::new(),
        always: vec![KEEPALIVE_COMMAND.to_string()],
    }
}

fn dedup(names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

fn closure_is_active(assembled: &AssembledSpecs, active: &ActiveSet) -> bool {
    assembled.apps.values().all(|app| {
        app.apps.iter().all(|n| active.apps.contains(n))
            && app.libs.iter().all(|n| active.libs.contains(n))
            && app.services.iter().all(|n| active.services.contains(n))
    }) && assembled
        .libs
        .values()
        .all(|lib| lib.libs.iter().all(|n| active.libs.contains(n)))
}
