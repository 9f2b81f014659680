//! Unified error types for the devyard workspace.
//!
//! Every variant carries the offending names as structured fields so callers
//! can decide how to present them. Loading, assembly, and compilation all
//! fail fast: the first configuration error aborts the whole operation.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SpecKind;

/// Which half of the `image`/`build` exclusivity rule an app violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSourceConflict {
    /// Both `image` and `build` were declared.
    Both,
    /// Neither `image` nor `build` was declared.
    Neither,
}

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DevyardError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A YAML document could not be parsed.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        source: serde_yaml::Error,
    },

    /// A tool configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A hard dependency or bundle member names an entity that was never declared.
    #[error("{referenced_by} references undeclared {kind} \"{name}\"")]
    UndeclaredReference {
        /// Kind the reference was expected to resolve to.
        kind: SpecKind,
        /// The unresolved name.
        name: String,
        /// Entity holding the reference.
        referenced_by: String,
    },

    /// Two specs share a name.
    #[error("duplicate spec name \"{name}\" declared as both {first} and {second}")]
    DuplicateName {
        /// The clashing name.
        name: String,
        /// Kind of the first declaration.
        first: SpecKind,
        /// Kind of the second declaration.
        second: SpecKind,
    },

    /// An app does not declare exactly one of `image` and `build`.
    #[error("app \"{app}\" must declare exactly one of image or build ({conflict:?})")]
    ImageSource {
        /// Offending app name.
        app: String,
        /// Which side of the rule was broken.
        conflict: ImageSourceConflict,
    },

    /// A lookup by name found nothing in the current collection.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind that was searched.
        kind: SpecKind,
        /// Name that was not found.
        name: String,
    },

    /// A hard link cycle makes a startup order impossible.
    #[error("cyclic link detected involving \"{name}\"")]
    LinkCycle {
        /// One entity on the cycle.
        name: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DevyardError>;
