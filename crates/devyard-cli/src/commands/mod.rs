//! CLI command definitions and dispatch.

pub mod compile;
pub mod images;
pub mod plan;
pub mod repos;
pub mod status;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use devyard_common::constants;

/// devyard: local development environments from composable specs.
#[derive(Parser, Debug)]
#[command(name = constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the configuration file.
    #[arg(long, global = true, env = "DEVYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the bundle, app, lib, and service specs.
    #[arg(long, global = true)]
    pub specs_dir: Option<PathBuf>,

    /// Bundle to activate. Repeat for several; replaces the configured list.
    #[arg(long = "bundle", global = true)]
    pub bundles: Vec<String>,

    /// Port allocation file (YAML map of name to port pairs).
    #[arg(long, global = true)]
    pub ports: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output format of query commands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// JSON, one document per invocation.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the active bundles into a compose document.
    Compile(compile::CompileArgs),
    /// Show what the active bundles activate and in which order.
    Plan(plan::PlanArgs),
    /// List the assembled specs by type.
    Status(status::StatusArgs),
    /// List every image referenced by the specs.
    Images(images::ImagesArgs),
    /// List repos mounted into one container, or into every active one.
    Repos(repos::ReposArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global;
    match cli.command {
        Command::Compile(args) => compile::execute(args, &global),
        Command::Plan(args) => plan::execute(args, &global),
        Command::Status(args) => status::execute(args, &global),
        Command::Images(args) => images::execute(args, &global),
        Command::Repos(args) => repos::execute(args, &global),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), constants::BIN_NAME);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "dyd", "plan", "--bundle", "web", "--bundle", "tools", "--format", "json", "-vv",
        ]);
        assert!(matches!(cli.command, Command::Plan(_)));
        assert_eq!(cli.global.bundles, vec!["web", "tools"]);
        assert_eq!(cli.global.format, Format::Json);
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn compile_accepts_output_file() {
        let cli = Cli::parse_from(["dyd", "compile", "--output", "out.yml"]);
        match cli.command {
            Command::Compile(args) => assert_eq!(args.output, Some(PathBuf::from("out.yml"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn repos_name_is_optional() {
        let cli = Cli::parse_from(["dyd", "repos"]);
        assert!(matches!(cli.command, Command::Repos(ref args) if args.name.is_none()));
        let cli = Cli::parse_from(["dyd", "repos", "app1"]);
        assert!(matches!(cli.command, Command::Repos(ref args) if args.name.as_deref() == Some("app1")));
    }
}
