//! `dyd compile`: Compile the active bundles into a compose document.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use devyard_compose::{ComposeDocument, compose_document};

use crate::commands::GlobalArgs;
use crate::output;
use crate::session::Session;

/// Arguments for the `compile` command.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Write the document here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write to the configured compose file.
    #[arg(long, conflicts_with = "output")]
    pub write: bool,
}

/// Executes the `compile` command.
///
/// Loads and assembles the specs, compiles every active app and service,
/// and writes the YAML document. Nothing is written if any step fails.
///
/// # Errors
///
/// Returns an error if loading, assembly, compilation, or writing fails.
pub fn execute(args: CompileArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let session = Session::load(global)?;
    let assembled = session.assemble()?;
    let document = compose_document(&assembled, &session.ports, &session.config.layout)?;
    let yaml = to_yaml(&document)?;

    let target = if args.write {
        Some(session.config.compose_file.clone())
    } else {
        args.output
    };
    match target {
        Some(path) => {
            write_document(&path, &yaml)?;
            tracing::info!(
                path = %path.display(),
                services = document.len(),
                "compose document written"
            );
        }
        None => output::emit(&yaml),
    }
    Ok(())
}

/// YAML rendering of a compiled document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml(document: &ComposeDocument) -> anyhow::Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

fn write_document(path: &Path, yaml: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))
}
