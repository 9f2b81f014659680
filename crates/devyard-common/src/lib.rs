//! # devyard-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire devyard workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the spec loader, the compiler,
//! and the CLI build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod types;
