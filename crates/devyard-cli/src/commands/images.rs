//! `dyd images`: List every image referenced by the specs.

use clap::Args;
use devyard_compose::images::referenced_images;

use crate::commands::GlobalArgs;
use crate::output;
use crate::session::Session;

/// Arguments for the `images` command.
#[derive(Args, Debug)]
pub struct ImagesArgs {
    /// Only images used by the active bundles.
    #[arg(long)]
    pub active: bool,
}

/// Executes the `images` command.
///
/// Images are listed across every declared app and service, or only the
/// active ones with `--active`.
///
/// # Errors
///
/// Returns an error if loading or assembly fails.
pub fn execute(args: ImagesArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let session = Session::load(global)?;
    let images: Vec<String> = if args.active {
        let assembled = session.assemble()?;
        let mut active = session.specs.clone();
        active.apps.retain(|name, _| assembled.apps.contains_key(name));
        active.services.retain(|name, _| assembled.services.contains_key(name));
        referenced_images(&active).into_iter().collect()
    } else {
        referenced_images(&session.specs).into_iter().collect()
    };
    tracing::debug!(count = images.len(), "images referenced");

    let rendered = output::render(global.format, &images, |images| {
        let rows: Vec<Vec<String>> = images.iter().map(|i| vec![i.clone()]).collect();
        output::table(&["IMAGE"], &rows)
    })?;
    output::emit(&rendered);
    Ok(())
}
