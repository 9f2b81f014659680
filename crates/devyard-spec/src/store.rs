//! Loading a specs directory from disk.
//!
//! The directory holds one subdirectory per kind (`bundles/`, `apps/`,
//! `libs/`, `services/`), each containing one YAML file per spec. The file
//! stem is the spec name. Missing subdirectories are treated as empty.

use std::path::{Path, PathBuf};

use devyard_common::constants::SPEC_EXTENSION;
use devyard_common::error::{DevyardError, Result};
use devyard_common::types::SpecKind;
use serde::de::DeserializeOwned;

use crate::set::SpecSet;

/// Loads and validates every spec under `dir`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or if the loaded
/// set fails [`crate::validator::validate`].
pub fn load_specs(dir: &Path) -> Result<SpecSet> {
    tracing::info!(dir = %dir.display(), "loading specs");
    let mut specs = SpecSet::new();

    for kind in SpecKind::ALL {
        for (name, path) in spec_files(&dir.join(kind.dir_name()))? {
            match kind {
                SpecKind::Bundle => specs.insert_bundle(name, read_spec(&path)?)?,
                SpecKind::App => specs.insert_app(name, read_spec(&path)?)?,
                SpecKind::Lib => specs.insert_lib(name, read_spec(&path)?)?,
                SpecKind::Service => specs.insert_service(name, read_spec(&path)?)?,
            }
        }
    }

    tracing::debug!(
        bundles = specs.bundles.len(),
        apps = specs.apps.len(),
        libs = specs.libs.len(),
        services = specs.services.len(),
        "specs loaded"
    );
    crate::validator::validate(&specs)?;
    Ok(specs)
}

/// Lists `(name, path)` of spec files in `dir`, sorted by path.
fn spec_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "spec directory absent");
        return Ok(Vec::new());
    }
    let io_err = |e| DevyardError::Io {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == SPEC_EXTENSION || e == "yaml");
        if path.is_file() && is_yaml {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_string();
            Some((name, path))
        })
        .collect())
}

fn read_spec<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| DevyardError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| DevyardError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })
}
