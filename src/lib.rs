//! nws: Notion workspace shell.
//!
//! **nws points an integration token at one Notion root and proves, not
//! assumes, that later workflow steps will work there.**
//!
//! The tool does three things:
//!
//! - **Resolve**: turn a pasted URL or id into a page or database despite
//!   both kinds sharing one opaque id namespace
//! - **Verify**: run live read / write / archive probes under that root and
//!   report each capability separately
//! - **Persist**: save the token and the verified root as local JSON
//!   configuration, atomically, only after every probe passed
//!
//! # Commands
//!
//! ```bash
//! # Verify access and save the workspace root
//! nws init
//!
//! # Authoring workflow steps (operate on the saved root)
//! nws plan
//! nws apply
//! nws handover
//!
//! # Install agent command packs
//! nws pack install --target claude --scope local
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: errors, id parsing, prompts, timestamps, output rendering
//! - [`notion`]: session boundary, HTTP client, root resolution, capability
//!   verification
//! - [`config`] / [`state`]: durable JSON records (credential, workspace root)
//! - [`workflow`]: the command pipelines behind the CLI
//! - [`packs`]: embedded command-pack templates and their installer

pub mod config;
pub mod core;
pub mod notion;
pub mod packs;
pub mod state;
pub mod workflow;

use clap::{Parser, Subcommand};

use crate::core::error::NwsError;
use crate::core::output::log_result;
use packs::schema::{PackScope, PackTarget};
use workflow::{WorkflowOptions, WorkflowResult};

#[derive(Parser, Debug)]
#[clap(
    name = "nws",
    version = env!("CARGO_PKG_VERSION"),
    about = "Notion workspace shell"
)]
struct Cli {
    /// Assume yes for all prompts
    #[clap(short = 'y', long, global = true)]
    yes: bool,

    /// Output result as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify Notion access and save the workspace root
    Init,

    /// Draft a plan for the workspace
    Plan,

    /// Apply the reviewed plan
    Apply,

    /// Hand the workspace over
    Handover,

    /// Manage command packs
    Pack(PackCli),
}

#[derive(clap::Args, Debug)]
struct PackCli {
    #[clap(subcommand)]
    command: PackCommand,
}

#[derive(Subcommand, Debug)]
enum PackCommand {
    /// Install a command pack
    Install {
        /// Pack to install (opencode|claude)
        #[clap(long)]
        target: String,
        /// Install scope (local|global)
        #[clap(long)]
        scope: String,
        /// Overwrite existing pack files
        #[clap(long)]
        force: bool,
    },
}

fn run_pack_install(target: &str, scope: &str, force: bool) -> WorkflowResult {
    let install = PackTarget::parse(target)
        .and_then(|target| PackScope::parse(scope).map(|scope| (target, scope)))
        .and_then(|(target, scope)| packs::install::install_pack(target, scope, force));

    match install {
        Ok(result) => {
            let message = format!(
                "Installed {} ({}) to {}.",
                result.pack.name,
                result.pack.target.name(),
                result.scope.name()
            );
            let mut details = serde_json::Map::new();
            details.insert(
                "installed_paths".to_string(),
                serde_json::json!(result
                    .installed_paths
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()),
            );
            WorkflowResult::ok("pack install", &message).with_details(details)
        }
        Err(error) => WorkflowResult::error("pack install", &error.to_string()),
    }
}

/// Parses arguments, runs the selected command, and renders its result.
/// Returns whether the command succeeded; `main` turns `false` into exit
/// code 1.
///
/// # Errors
///
/// Propagates identifier-parse and required-input validation failures from
/// the init pipeline; every other failure is rendered as an error result.
pub fn run() -> Result<bool, NwsError> {
    let cli = Cli::parse();
    let options = WorkflowOptions {
        yes: cli.yes,
        json: cli.json,
    };

    let result = match cli.command {
        Command::Init => workflow::init::init_workflow(&options)?,
        Command::Plan => workflow::plan_workflow(&options),
        Command::Apply => workflow::apply_workflow(&options),
        Command::Handover => workflow::handover_workflow(&options),
        Command::Pack(pack_cli) => match pack_cli.command {
            PackCommand::Install {
                target,
                scope,
                force,
            } => run_pack_install(&target, &scope, force),
        },
    };

    log_result(&serde_json::to_value(&result)?, cli.json);
    Ok(result.succeeded())
}
