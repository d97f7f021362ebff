use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devlink::commands;
use devlink::config::Config;
use devlink::npm::NpmCli;

#[derive(Parser)]
#[command(name = "devlink")]
#[command(version, about = "Deploy local library builds and restore registry versions")]
struct Cli {
    /// Workspace root containing the library sources and dist output
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install the locally built package into a sibling project
    Deploy {
        /// Path to the target project
        target: PathBuf,
    },
    /// Restore a sibling project to a registry-published version
    Restore {
        /// Path to the target project
        target: PathBuf,
        /// Specific version to install instead of the latest stable one
        version: Option<String>,
    },
    /// Sync pinned dependency versions from the root manifest into the library manifest
    Sync {
        /// Dependency to sync (repeatable); defaults to the built-in peer dependency set
        #[arg(long = "dep")]
        deps: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.workspace)?;

    match cli.command {
        Command::Deploy { target } => {
            let target = std::path::absolute(&target)?;
            let npm = NpmCli::new(&target);
            commands::deploy::run(&config, &target, &npm)
        }
        Command::Restore { target, version } => {
            let target = std::path::absolute(&target)?;
            let npm = NpmCli::new(&target);
            commands::restore::run(&config, &target, version.as_deref(), &npm)
        }
        Command::Sync { deps } => commands::sync::run(&config, &deps),
    }
}
