//! `dyd repos`: List repos mounted into one container, or into every
//! active one.

use std::collections::BTreeSet;

use clap::Args;
use devyard_common::layout::Layout;
use devyard_common::types::Repo;
use devyard_compose::repos::{active_repos, same_container_repos};
use serde::Serialize;

use crate::commands::GlobalArgs;
use crate::output;
use crate::session::Session;

/// Arguments for the `repos` command.
#[derive(Args, Debug)]
pub struct ReposArgs {
    /// App or lib whose container repos to list. All active repos when
    /// omitted.
    pub name: Option<String>,
}

/// One repo with its managed checkout location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRow {
    /// Short name, the last path segment.
    pub name: String,
    /// Declared location.
    pub repo: Repo,
    /// Host path of the managed checkout.
    pub path: String,
}

/// Rows for `repos`, sorted by declared location.
#[must_use]
pub fn repo_rows(repos: &BTreeSet<Repo>, layout: &Layout) -> Vec<RepoRow> {
    repos
        .iter()
        .map(|repo| RepoRow {
            name: repo.short_name().to_string(),
            repo: repo.clone(),
            path: repo.managed_path(layout.repos_dir()).display().to_string(),
        })
        .collect()
}

/// Executes the `repos` command.
///
/// # Errors
///
/// Returns an error if loading or assembly fails, or `name` is not an app
/// or lib.
pub fn execute(args: ReposArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let session = Session::load(global)?;
    let repos = match args.name.as_deref() {
        Some(name) => same_container_repos(name, &session.specs)?,
        None => active_repos(&session.assemble()?),
    };
    let rows = repo_rows(&repos, &session.config.layout);

    let rendered = output::render(global.format, &rows, |rows| {
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|r| vec![r.name.clone(), r.repo.to_string(), r.path.clone()])
            .collect();
        output::table(&["NAME", "REPO", "PATH"], &cells)
    })?;
    output::emit(&rendered);
    Ok(())
}
