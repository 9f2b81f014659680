//! Loading tests for a specs directory on disk.
//!
//! These cover what `load_specs` does across kinds: reading each
//! subdirectory, normalizing string-or-list commands, and rejecting the
//! first invalid declaration with the file or names involved.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use devyard_common::error::{DevyardError, ImageSourceConflict};
use devyard_common::types::{Repo, SpecKind};
use devyard_spec::store::load_specs;
use devyard_spec::{Commands, ImageSource};
use pretty_assertions::assert_eq;

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write spec");
}

fn spec_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "bundles/web.yml", "apps: [site]\nservices: [db]\n");
    write(
        root,
        "apps/site.yml",
        "repo: github.com/acme/site\n\
         mount: /gc/site\n\
         image: acme/site:3\n\
         ports: [8000]\n\
         depends:\n  libs: [ui]\n  services: [db]\n\
         commands:\n  once: ./setup.sh\n  always:\n    - ./migrate.sh\n    - ./serve.sh\n",
    );
    write(root, "apps/worker.yml", "build: ./worker\n");
    write(root, "libs/ui.yml", "repo: github.com/acme/ui\nmount: /gc/ui\ninstall: make\n");
    write(root, "services/db.yml", "image: postgres:15\nports: [5432]\nvolumes: [/data:/var/lib/postgresql]\n");
    write(root, "services/notes.txt", "ignored");
    dir
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn loads_every_kind_sorted_by_name() {
    let dir = spec_tree();
    let specs = load_specs(dir.path()).expect("load");

    assert_eq!(specs.names(SpecKind::Bundle), vec!["web"]);
    assert_eq!(specs.names(SpecKind::App), vec!["site", "worker"]);
    assert_eq!(specs.names(SpecKind::Lib), vec!["ui"]);
    assert_eq!(specs.names(SpecKind::Service), vec!["db"]);
    assert_eq!(specs.len(), 5);
}

#[test]
fn commands_accept_a_string_or_a_list() {
    let dir = spec_tree();
    let specs = load_specs(dir.path()).expect("load");

    let site = &specs.apps["site"];
    assert_eq!(
        site.commands,
        Some(Commands {
            once: vec!["./setup.sh".into()],
            always: vec!["./migrate.sh".into(), "./serve.sh".into()],
        })
    );
    assert_eq!(specs.apps["worker"].commands, None);
}

#[test]
fn records_keep_declared_fields() {
    let dir = spec_tree();
    let specs = load_specs(dir.path()).expect("load");

    let site = &specs.apps["site"];
    assert_eq!(site.repo, Some(Repo::new("github.com/acme/site")));
    assert_eq!(site.ports, vec![8000]);
    assert_eq!(
        specs.apps["worker"].image_source("worker").expect("source"),
        ImageSource::Build("./worker".into())
    );
    assert_eq!(specs.libs["ui"].install.as_deref(), Some("make"));

    let db = &specs.services["db"];
    assert_eq!(db.image, "postgres:15");
    assert_eq!(db.ports, vec![5432]);
    assert_eq!(db.volumes, vec!["/data:/var/lib/postgresql"]);
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

#[test]
fn name_shared_across_kinds_is_rejected() {
    let dir = spec_tree();
    write(dir.path(), "apps/db.yml", "image: acme/db\n");

    let err = load_specs(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            DevyardError::DuplicateName { ref name, first: SpecKind::App, second: SpecKind::Service }
                if name == "db"
        ),
        "got: {err}"
    );
}

#[test]
fn undeclared_dependency_is_rejected() {
    let dir = spec_tree();
    write(dir.path(), "libs/ui.yml", "repo: github.com/acme/ui\nmount: /gc/ui\ndepends:\n  libs: [icons]\n");

    let err = load_specs(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            DevyardError::UndeclaredReference { kind: SpecKind::Lib, ref name, ref referenced_by }
                if name == "icons" && referenced_by == "ui"
        ),
        "got: {err}"
    );
}

#[test]
fn app_without_image_source_is_rejected() {
    let dir = spec_tree();
    write(dir.path(), "apps/worker.yml", "commands:\n  always: ./run.sh\n");

    let err = load_specs(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            DevyardError::ImageSource { ref app, conflict: ImageSourceConflict::Neither }
                if app == "worker"
        ),
        "got: {err}"
    );
}

#[test]
fn lib_missing_mount_reports_its_file() {
    let dir = spec_tree();
    write(dir.path(), "libs/ui.yml", "repo: github.com/acme/ui\n");

    match load_specs(dir.path()).unwrap_err() {
        DevyardError::Yaml { path, .. } => assert!(path.ends_with("libs/ui.yml")),
        other => panic!("unexpected error: {other}"),
    }
}
