//! # devyard-compose
//!
//! Turns raw specs and a set of active bundles into runtime service
//! descriptors.
//!
//! Handles:
//! - **Expander**: transitive dependency closures and the active set.
//! - **Assembler**: the fully resolved, active-only view of the specs.
//! - **Links**: hard and conditional links between containers.
//! - **Once guard**: first-start versus restart command gating.
//! - **Compiler**: volumes, startup command, ports, and descriptors.
//! - **Graph**: startup ordering over hard links.
//! - **Images** and **Repos**: queries used by image pulls and repo syncs.
//!
//! Everything here is a pure function of its inputs. Nothing is cached
//! between calls and nothing touches the filesystem.

pub mod assembler;
pub mod compiler;
pub mod expander;
pub mod graph;
pub mod images;
pub mod links;
pub mod once_guard;
pub mod repos;

pub use assembler::{AssembledApp, AssembledLib, AssembledSpecs, assemble};
pub use compiler::{ComposeDocument, ComposeServiceDescriptor, compose_document};
