//! Per-invocation inputs: configuration merged with command-line flags, the
//! loaded specs, and the port map.

use std::path::Path;

use anyhow::Context;
use devyard_common::config::DevyardConfig;
use devyard_common::constants::default_config_file;
use devyard_common::types::PortMap;
use devyard_compose::AssembledSpecs;
use devyard_spec::SpecSet;

use crate::commands::GlobalArgs;

/// Everything a command needs, loaded once.
#[derive(Debug)]
pub struct Session {
    /// Effective configuration, flags applied.
    pub config: DevyardConfig,
    /// Validated specs.
    pub specs: SpecSet,
    /// Allocated ports; empty when no port file is configured.
    pub ports: PortMap,
}

impl Session {
    /// Loads configuration, specs, and ports for `global`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, a spec, or the port file
    /// cannot be read or is invalid.
    pub fn load(global: &GlobalArgs) -> anyhow::Result<Self> {
        let config_path = global.config.clone().unwrap_or_else(default_config_file);
        let config = apply_flags(DevyardConfig::load_or_default(&config_path)?, global);
        tracing::info!(
            specs_dir = %config.specs_dir.display(),
            bundles = ?config.active_bundles,
            "session configured"
        );

        let specs = devyard_spec::store::load_specs(&config.specs_dir)
            .with_context(|| format!("loading specs from {}", config.specs_dir.display()))?;
        let ports = match &config.ports_file {
            Some(path) => load_port_map(path)?,
            None => PortMap::new(),
        };
        Ok(Self {
            config,
            specs,
            ports,
        })
    }

    /// Assembles the specs for the active bundles.
    ///
    /// # Errors
    ///
    /// Returns an error if assembly fails.
    pub fn assemble(&self) -> anyhow::Result<AssembledSpecs> {
        Ok(devyard_compose::assemble(
            &self.specs,
            &self.config.active_bundles,
        )?)
    }
}

fn apply_flags(mut config: DevyardConfig, global: &GlobalArgs) -> DevyardConfig {
    if let Some(dir) = &global.specs_dir {
        config.specs_dir.clone_from(dir);
    }
    if !global.bundles.is_empty() {
        config.active_bundles.clone_from(&global.bundles);
    }
    if let Some(ports) = &global.ports {
        config.ports_file = Some(ports.clone());
    }
    config
}

/// Reads a port allocation file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_port_map(path: &Path) -> anyhow::Result<PortMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading port file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(PortMap::new());
    }
    serde_yaml::from_str(&content).with_context(|| format!("parsing port file {}", path.display()))
}
