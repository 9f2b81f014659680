//! Image references used by the declared apps and services.

use std::collections::BTreeSet;

use devyard_common::constants::DEFAULT_IMAGE_TAG;
use devyard_spec::SpecSet;

/// Appends the default tag to a reference carrying neither a tag nor a
/// digest.
///
/// A registry port (`host:5000/name`) is not a tag, so only the last path
/// segment is inspected.
#[must_use]
pub fn normalize_image(reference: &str) -> String {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    if last.contains(':') || last.contains('@') {
        reference.to_string()
    } else {
        format!("{reference}:{DEFAULT_IMAGE_TAG}")
    }
}

/// Every image referenced by an app or service, normalized.
///
/// Apps built from a local context reference no image.
#[must_use]
pub fn referenced_images(specs: &SpecSet) -> BTreeSet<String> {
    specs
        .apps
        .values()
        .filter_map(|app| app.image.as_deref())
        .chain(specs.services.values().map(|s| s.image.as_str()))
        .map(normalize_image)
        .collect()
}

#[cfg(test)]
mod tests {
    use devyard_spec::{App, Service};

    use super::*;

    #[test]
    fn untagged_reference_gets_latest() {
        assert_eq!(normalize_image("postgres"), "postgres:latest");
        assert_eq!(normalize_image("gc/app"), "gc/app:latest");
    }

    #[test]
    fn tagged_reference_is_kept() {
        assert_eq!(normalize_image("postgres:9.4"), "postgres:9.4");
        assert_eq!(normalize_image("busybox@sha256:abc"), "busybox@sha256:abc");
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        assert_eq!(
            normalize_image("registry:5000/team/app"),
            "registry:5000/team/app:latest"
        );
    }

    #[test]
    fn collects_apps_and_services() {
        let mut specs = SpecSet::new();
        let _ = specs.apps.insert(
            "app1".into(),
            App {
                image: Some("gc/app1".into()),
                ..App::default()
            },
        );
        let _ = specs.apps.insert(
            "built".into(),
            App {
                build: Some("/src/built".into()),
                ..App::default()
            },
        );
        for (name, image) in [("db", "postgres:9.4"), ("cache", "redis"), ("cache2", "redis:latest")] {
            let _ = specs.services.insert(
                name.into(),
                Service {
                    image: image.into(),
                    ..Service::default()
                },
            );
        }

        let images: Vec<String> = referenced_images(&specs).into_iter().collect();
        assert_eq!(images, vec!["gc/app1:latest", "postgres:9.4", "redis:latest"]);
    }
}
