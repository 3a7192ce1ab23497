use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vxmod_core::module_manager::{ModuleManager, ModuleManagerConfig};

mod commands;

/// vxmod - assemble and package platform modules
#[derive(Parser)]
#[command(name = "vxmod")]
#[command(about = "Resolve module includes, then assemble and package a module")]
#[command(version)]
struct Cli {
    /// Path to the project root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the declared includes and show the registered dependencies
    Resolve,
    /// Generate the module descriptor (mod.json)
    Descriptor,
    /// Copy build output and library jars into the module directory
    Assemble,
    /// Zip the assembled module directory
    Package,
    /// Resolve, assemble and package
    Build,
    /// Manage installed modules
    Mods {
        #[command(subcommand)]
        mods_command: ModsCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum ModsCommands {
    /// List installed modules
    List,
    /// Remove all installed modules
    Clear,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut manager = ModuleManager::new(ModuleManagerConfig {
        project_root: cli.project,
    })
    .map_err(|e| anyhow::anyhow!("Failed to load project: {}", e))?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::Resolve => commands::resolve::execute(&mut manager).await,
        Commands::Descriptor => commands::descriptor::execute(&manager),
        Commands::Assemble => commands::assemble::execute(&manager),
        Commands::Package => commands::package::execute(&manager),
        Commands::Build => commands::build::execute(&mut manager).await,
        Commands::Mods { mods_command } => commands::mods::execute(&manager, mods_command).await,
    }
}
