//! `dyd plan`: Show what the active bundles activate and in which order.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clap::Args;
use devyard_compose::{AssembledSpecs, graph, links};
use serde::Serialize;

use crate::commands::GlobalArgs;
use crate::output;
use crate::session::Session;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {}

/// What an invocation would bring up.
#[derive(Debug, Serialize)]
pub struct Plan {
    /// Activated bundles.
    pub bundles: Vec<String>,
    /// Active apps.
    pub apps: Vec<String>,
    /// Active libs.
    pub libs: Vec<String>,
    /// Active services.
    pub services: Vec<String>,
    /// Containers in startup order, dependencies first.
    pub startup_order: Vec<String>,
    /// Links of every container that has any.
    pub links: BTreeMap<String, Vec<String>>,
    /// In-container ports of every container that declares any.
    pub ports: BTreeMap<String, Vec<u16>>,
}

impl Plan {
    /// Builds the plan of an assembly.
    ///
    /// # Errors
    ///
    /// Returns an error if hard links form a cycle.
    pub fn from_assembled(assembled: &AssembledSpecs) -> anyhow::Result<Self> {
        let mut link_map = BTreeMap::new();
        for name in assembled.container_names() {
            let targets = links::links_for(name, assembled)?;
            if !targets.is_empty() {
                let _ = link_map.insert(name.to_string(), targets);
            }
        }
        Ok(Self {
            bundles: assembled.bundles.iter().cloned().collect(),
            apps: assembled.apps.keys().cloned().collect(),
            libs: assembled.libs.keys().cloned().collect(),
            services: assembled.services.keys().cloned().collect(),
            startup_order: graph::startup_order(assembled)?,
            links: link_map,
            ports: assembled.declared_ports(),
        })
    }

    /// Text rendering.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = output::heading(&format!("Plan for: {}", self.bundles.join(", ")));
        for (label, names) in [
            ("Apps", &self.apps),
            ("Libs", &self.libs),
            ("Services", &self.services),
        ] {
            let _ = writeln!(out, "\n{label} ({}):", names.len());
            out.push_str(&output::list(names));
        }

        let _ = writeln!(out, "\nStartup order:");
        for (i, name) in self.startup_order.iter().enumerate() {
            let _ = writeln!(out, "  {}. {name}", i + 1);
        }

        if !self.links.is_empty() {
            let _ = writeln!(out, "\nLinks:");
            for (name, targets) in &self.links {
                let _ = writeln!(out, "  {name} -> {}", targets.join(", "));
            }
        }

        if !self.ports.is_empty() {
            let _ = writeln!(out, "\nPorts to publish:");
            for (name, ports) in &self.ports {
                let ports: Vec<String> = ports.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "  {name}: {}", ports.join(", "));
            }
        }
        out
    }
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if loading or assembly fails, or hard links form a
/// cycle.
pub fn execute(_args: PlanArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let session = Session::load(global)?;
    let plan = Plan::from_assembled(&session.assemble()?)?;
    output::emit(&output::render(global.format, &plan, Plan::to_text)?);
    Ok(())
}
