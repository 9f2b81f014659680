//! Inter-container links.
//!
//! Hard links come from an app's direct app and service dependencies.
//! Conditional links are best effort: a declared target is linked only when
//! it is active in the current assembly, and silently dropped otherwise.

use std::collections::BTreeSet;

use devyard_common::error::{DevyardError, Result};
use devyard_common::types::SpecKind;

use crate::assembler::AssembledSpecs;

/// Conditional link targets of `app_name` that are active.
///
/// Active app targets come first, then active service targets, each group
/// sorted by name.
///
/// # Errors
///
/// Returns [`DevyardError::NotFound`] if `app_name` is not an active app.
pub fn conditional_links(assembled: &AssembledSpecs, app_name: &str) -> Result<Vec<String>> {
    let declared = &assembled.app(app_name)?.conditional_links;

    let apps: BTreeSet<&String> = declared
        .apps
        .iter()
        .filter(|n| assembled.apps.contains_key(n.as_str()))
        .collect();
    let services: BTreeSet<&String> = declared
        .services
        .iter()
        .filter(|n| assembled.services.contains_key(n.as_str()))
        .collect();

    let links: Vec<String> = apps.into_iter().chain(services).cloned().collect();
    tracing::debug!(app = %app_name, ?links, "conditional links resolved");
    Ok(links)
}

/// Every link of an active app or service, in descriptor order.
///
/// For an app: direct apps, then direct services, then resolved conditional
/// links. Services declare no links.
///
/// # Errors
///
/// Returns [`DevyardError::NotFound`] if `name` is neither an active app nor
/// an active service.
pub fn links_for(name: &str, assembled: &AssembledSpecs) -> Result<Vec<String>> {
    if let Some(app) = assembled.apps.get(name) {
        let mut links: Vec<String> = app.apps.iter().chain(&app.services).cloned().collect();
        links.extend(conditional_links(assembled, name)?);
        return Ok(links);
    }
    if assembled.services.contains_key(name) {
        return Ok(Vec::new());
    }
    Err(DevyardError::NotFound {
        kind: SpecKind::App,
        name: name.to_string(),
    })
}
