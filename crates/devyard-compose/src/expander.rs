//! Dependency expansion over the raw spec graph.
//!
//! Edges are followed by kind: an app's lib closure walks the app's direct
//! libs and then every discovered lib's own libs. Walks keep a visited set,
//! so cyclic declarations terminate.

use std::collections::BTreeSet;

use devyard_common::error::{DevyardError, Result};
use devyard_common::types::SpecKind;
use devyard_spec::SpecSet;
use indexmap::IndexSet;

/// Referrer reported when an activated bundle itself is undeclared.
pub const ACTIVE_BUNDLES: &str = "active bundle list";

/// Names of every spec live in the current invocation, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    /// Active bundles.
    pub bundles: BTreeSet<String>,
    /// Active apps.
    pub apps: BTreeSet<String>,
    /// Active libs.
    pub libs: BTreeSet<String>,
    /// Active services.
    pub services: BTreeSet<String>,
}

impl ActiveSet {
    /// Returns true if `name` is active as `kind`.
    #[must_use]
    pub fn contains(&self, kind: SpecKind, name: &str) -> bool {
        match kind {
            SpecKind::Bundle => self.bundles.contains(name),
            SpecKind::App => self.apps.contains(name),
            SpecKind::Lib => self.libs.contains(name),
            SpecKind::Service => self.services.contains(name),
        }
    }
}

/// Edges of `edge` kind held by a declared spec.
fn edges_of<'a>(
    specs: &'a SpecSet,
    kind: SpecKind,
    name: &str,
    edge: SpecKind,
) -> Result<&'a [String]> {
    specs.edges(kind, name, edge).ok_or_else(|| DevyardError::NotFound {
        kind,
        name: name.to_string(),
    })
}

fn require(specs: &SpecSet, kind: SpecKind, name: &str, referenced_by: &str) -> Result<()> {
    if specs.contains(kind, name) {
        Ok(())
    } else {
        Err(DevyardError::UndeclaredReference {
            kind,
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }
}

/// Every name reachable from `root` by one or more `edge` hops.
///
/// The root is only part of the result if a cycle leads back to it.
///
/// # Errors
///
/// Returns [`DevyardError::NotFound`] if `root` is not declared as
/// `root_kind`, and [`DevyardError::UndeclaredReference`] if a traversed
/// edge names an undeclared spec.
pub fn transitive_closure(
    edge: SpecKind,
    root: &str,
    specs: &SpecSet,
    root_kind: SpecKind,
) -> Result<BTreeSet<String>> {
    let mut found = BTreeSet::new();
    let mut pending: Vec<(&str, &str)> = edges_of(specs, root_kind, root, edge)?
        .iter()
        .map(|target| (root, target.as_str()))
        .collect();

    while let Some((referrer, name)) = pending.pop() {
        require(specs, edge, name, referrer)?;
        if !found.insert(name.to_string()) {
            continue;
        }
        pending.extend(
            edges_of(specs, edge, name, edge)?
                .iter()
                .map(|target| (name, target.as_str())),
        );
    }

    Ok(found)
}

/// The same set as [`transitive_closure`], in discovery order.
///
/// Direct edges come first in declared order. Each following level holds
/// the names first reached from the previous level, sorted by name. A name
/// reachable along several paths keeps the position of its first discovery.
///
/// # Errors
///
/// Same as [`transitive_closure`].
pub fn discovery_order(
    edge: SpecKind,
    root: &str,
    specs: &SpecSet,
    root_kind: SpecKind,
) -> Result<IndexSet<String>> {
    let mut order = IndexSet::new();
    let mut level: Vec<&str> = Vec::new();

    for target in edges_of(specs, root_kind, root, edge)? {
        require(specs, edge, target, root)?;
        if order.insert(target.clone()) {
            level.push(target);
        }
    }

    while !level.is_empty() {
        let mut next = BTreeSet::new();
        for &name in &level {
            for target in edges_of(specs, edge, name, edge)? {
                require(specs, edge, target, name)?;
                if !order.contains(target.as_str()) {
                    let _ = next.insert(target.as_str());
                }
            }
        }
        level = next.into_iter().collect();
        for &name in &level {
            let _ = order.insert(name.to_string());
        }
    }

    Ok(order)
}

/// Computes the active set for `active_bundles`.
///
/// Bundle members are activated directly. Every active app then pulls in
/// its app closure, and every active app or lib pulls in its lib closure.
/// Every active app's direct services are activated as well.
///
/// # Errors
///
/// Returns [`DevyardError::UndeclaredReference`] if a bundle, bundle
/// member, or hard dependency is not declared.
pub fn active_entities<S: AsRef<str>>(active_bundles: &[S], specs: &SpecSet) -> Result<ActiveSet> {
    let mut active = ActiveSet::default();

    for bundle_name in active_bundles.iter().map(AsRef::as_ref) {
        let bundle = specs
            .bundles
            .get(bundle_name)
            .ok_or_else(|| DevyardError::UndeclaredReference {
                kind: SpecKind::Bundle,
                name: bundle_name.to_string(),
                referenced_by: ACTIVE_BUNDLES.to_string(),
            })?;
        let _ = active.bundles.insert(bundle_name.to_string());

        let members = [
            (SpecKind::App, &bundle.apps, &mut active.apps),
            (SpecKind::Lib, &bundle.libs, &mut active.libs),
            (SpecKind::Service, &bundle.services, &mut active.services),
        ];
        for (kind, names, into) in members {
            for name in names {
                require(specs, kind, name, bundle_name)?;
                let _ = into.insert(name.clone());
            }
        }
    }

    let bundled_apps: Vec<String> = active.apps.iter().cloned().collect();
    for app in &bundled_apps {
        active
            .apps
            .extend(transitive_closure(SpecKind::App, app, specs, SpecKind::App)?);
    }

    let bundled_libs: Vec<String> = active.libs.iter().cloned().collect();
    for lib in &bundled_libs {
        active
            .libs
            .extend(transitive_closure(SpecKind::Lib, lib, specs, SpecKind::Lib)?);
    }

    for app in &active.apps {
        active
            .libs
            .extend(transitive_closure(SpecKind::Lib, app, specs, SpecKind::App)?);
        active
            .services
            .extend(transitive_closure(SpecKind::Service, app, specs, SpecKind::App)?);
    }

    tracing::debug!(
        apps = active.apps.len(),
        libs = active.libs.len(),
        services = active.services.len(),
        "active set computed"
    );
    Ok(active)
}
