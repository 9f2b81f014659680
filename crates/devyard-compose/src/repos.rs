//! Repository queries.
//!
//! A repo is "in" a container when its checkout is mounted there: the app's
//! own repo plus the repos of every lib in its closure.

use std::collections::BTreeSet;

use devyard_common::error::{DevyardError, Result};
use devyard_common::types::{Repo, SpecKind};
use devyard_spec::SpecSet;

use crate::assembler::AssembledSpecs;
use crate::expander;

/// The repo of an app or lib.
///
/// Returns `Ok(None)` for an app without source.
///
/// # Errors
///
/// Returns [`DevyardError::NotFound`] if `name` is neither an app nor a lib.
pub fn repo_of<'a>(name: &str, specs: &'a SpecSet) -> Result<Option<&'a Repo>> {
    if let Some(app) = specs.apps.get(name) {
        return Ok(app.repo.as_ref());
    }
    if let Some(lib) = specs.libs.get(name) {
        return Ok(Some(&lib.repo));
    }
    Err(DevyardError::NotFound {
        kind: SpecKind::App,
        name: name.to_string(),
    })
}

/// Repos mounted in the container of app or lib `name`.
///
/// # Errors
///
/// Returns [`DevyardError::NotFound`] if `name` is neither an app nor a lib,
/// or an error if its lib closure references an undeclared lib.
pub fn same_container_repos(name: &str, specs: &SpecSet) -> Result<BTreeSet<Repo>> {
    let kind = match specs.kind_of(name) {
        Some(kind @ (SpecKind::App | SpecKind::Lib)) => kind,
        _ => {
            return Err(DevyardError::NotFound {
                kind: SpecKind::App,
                name: name.to_string(),
            });
        }
    };

    let mut repos: BTreeSet<Repo> = repo_of(name, specs)?.into_iter().cloned().collect();
    for lib_name in expander::transitive_closure(SpecKind::Lib, name, specs, kind)? {
        if let Some(repo) = repo_of(&lib_name, specs)? {
            let _ = repos.insert(repo.clone());
        }
    }
    Ok(repos)
}

/// Every repo mounted by an active app or lib.
#[must_use]
pub fn active_repos(assembled: &AssembledSpecs) -> BTreeSet<Repo> {
    assembled
        .apps
        .values()
        .filter_map(|app| app.source.as_ref().map(|s| s.repo.clone()))
        .chain(assembled.libs.values().map(|lib| lib.repo.clone()))
        .collect()
}
