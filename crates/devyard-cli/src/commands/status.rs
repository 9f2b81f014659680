//! `dyd status`: List the assembled specs by type.

use clap::Args;
use devyard_common::types::SpecKind;
use devyard_compose::AssembledSpecs;
use serde::Serialize;

use crate::commands::GlobalArgs;
use crate::output;
use crate::session::Session;

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// One assembled spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    /// Spec name.
    pub name: String,
    /// Spec kind.
    #[serde(rename = "type")]
    pub kind: SpecKind,
}

/// Rows sorted by kind, then by name.
#[must_use]
pub fn status_rows(assembled: &AssembledSpecs) -> Vec<StatusRow> {
    let mut rows: Vec<StatusRow> = assembled
        .entries()
        .map(|(name, kind)| StatusRow {
            name: name.to_string(),
            kind,
        })
        .collect();
    rows.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[allow(clippy::ptr_arg)]
fn to_text(rows: &Vec<StatusRow>) -> String {
    if rows.is_empty() {
        return "No active specs.\n".to_string();
    }
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.name.clone(), r.kind.to_string()])
        .collect();
    output::table(&["NAME", "TYPE"], &cells)
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if loading or assembly fails.
pub fn execute(_args: StatusArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let session = Session::load(global)?;
    let rows = status_rows(&session.assemble()?);
    output::emit(&output::render(global.format, &rows, to_text)?);
    Ok(())
}
