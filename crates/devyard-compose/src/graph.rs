//! Startup ordering over hard links using `petgraph`.
//!
//! Builds a directed graph from app-to-app and app-to-service links and
//! resolves a topological order in which every container comes after the
//! containers it links to.

use std::collections::HashMap;

use devyard_common::error::{DevyardError, Result};
use petgraph::graph::NodeIndex;

use crate::assembler::AssembledSpecs;

/// A link graph of containers.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container node, returning the existing node if `name` is
    /// already present.
    pub fn add_container(&mut self, name: impl Into<String>) -> NodeIndex {
        let name = name.into();
        if let Some(&idx) = self.nodes.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        let _ = self.nodes.insert(name, idx);
        idx
    }

    /// Adds a link: `dependent` needs `dependency` up first.
    ///
    /// The edge points from `dependency` to `dependent` so a topological
    /// sort yields dependencies first.
    pub fn add_link(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.add_edge(dependency, dependent, ());
    }

    /// Returns containers with every dependency before its dependents.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::LinkCycle`] naming a container on a cycle.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => Err(DevyardError::LinkCycle {
                name: self
                    .graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default(),
            }),
        }
    }
}

/// Startup order of every active app and service over hard links.
///
/// Conditional links do not constrain the order.
///
/// # Errors
///
/// Returns [`DevyardError::LinkCycle`] if hard links form a cycle.
pub fn startup_order(assembled: &AssembledSpecs) -> Result<Vec<String>> {
    let mut graph = DependencyGraph::new();
    for name in assembled.container_names() {
        let _ = graph.add_container(name);
    }
    for (name, app) in &assembled.apps {
        let dependent = graph.add_container(name.as_str());
        for target in app.apps.iter().chain(&app.services) {
            let dependency = graph.add_container(target.as_str());
            graph.add_link(dependent, dependency);
        }
    }
    let order = graph.resolve_order()?;
    tracing::debug!(?order, "startup order resolved");
    Ok(order)
}
