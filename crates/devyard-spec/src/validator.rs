//! Static validation of a loaded [`SpecSet`].
//!
//! Checks for clashing names, image source declarations, and hard
//! references to undeclared specs before anything is assembled.

use std::collections::BTreeMap;

use devyard_common::error::{DevyardError, Result};
use devyard_common::types::SpecKind;

use crate::set::SpecSet;

/// Validates a spec set for semantic correctness.
///
/// # Checks performed
///
/// 1. No name is declared under two kinds.
/// 2. Every app declares exactly one of `image` and `build`.
/// 3. Every bundle member names a declared spec of the member's kind.
/// 4. Every hard dependency names a declared spec of the expected kind.
///
/// Conditional links are not checked: their targets may legitimately be
/// absent.
///
/// # Errors
///
/// Returns the first failing check's error.
pub fn validate(specs: &SpecSet) -> Result<()> {
    tracing::info!(specs = specs.len(), "validating specs");
    check_duplicate_names(specs)?;
    check_image_sources(specs)?;
    check_bundle_members(specs)?;
    check_dependency_references(specs)?;
    Ok(())
}

fn check_duplicate_names(specs: &SpecSet) -> Result<()> {
    let mut seen: BTreeMap<&str, SpecKind> = BTreeMap::new();
    for kind in SpecKind::ALL {
        for name in specs.names(kind) {
            if let Some(&first) = seen.get(name) {
                return Err(DevyardError::DuplicateName {
                    name: name.to_string(),
                    first,
                    second: kind,
                });
            }
            let _ = seen.insert(name, kind);
        }
    }
    Ok(())
}

fn check_image_sources(specs: &SpecSet) -> Result<()> {
    for (name, app) in &specs.apps {
        let _ = app.image_source(name)?;
    }
    Ok(())
}

fn check_bundle_members(specs: &SpecSet) -> Result<()> {
    for (name, bundle) in &specs.bundles {
        let members = [
            (SpecKind::App, &bundle.apps),
            (SpecKind::Lib, &bundle.libs),
            (SpecKind::Service, &bundle.services),
        ];
        for (kind, names) in members {
            require_declared(specs, kind, names, name)?;
        }
    }
    Ok(())
}

fn check_dependency_references(specs: &SpecSet) -> Result<()> {
    for (name, app) in &specs.apps {
        require_declared(specs, SpecKind::App, &app.depends.apps, name)?;
        require_declared(specs, SpecKind::Lib, &app.depends.libs, name)?;
        require_declared(specs, SpecKind::Service, &app.depends.services, name)?;
    }
    for (name, lib) in &specs.libs {
        require_declared(specs, SpecKind::Lib, &lib.depends.libs, name)?;
    }
    Ok(())
}

fn require_declared(
    specs: &SpecSet,
    kind: SpecKind,
    names: &[String],
    referenced_by: &str,
) -> Result<()> {
    match names.iter().find(|n| !specs.contains(kind, n)) {
        Some(missing) => Err(DevyardError::UndeclaredReference {
            kind,
            name: missing.clone(),
            referenced_by: referenced_by.to_string(),
        }),
        None => Ok(()),
    }
}
