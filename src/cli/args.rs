//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// offcache - Offline Resource Cache
///
/// Seeds versioned cache generations from a resource manifest and serves
/// requests from the current generation without touching the network.
#[derive(Parser, Debug)]
#[command(name = "offcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "OFFCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed a new generation from the manifest
    Install(InstallArgs),

    /// Make a generation current and delete all others
    Activate(ActivateArgs),

    /// Answer one request from the cache
    Get(GetArgs),

    /// List cache stores
    List(ListArgs),

    /// Show cache status
    Status,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Generation to install (defaults to the manifest's, then cache.generation)
    #[arg(short, long)]
    pub generation: Option<String>,

    /// Manifest file (overrides cache.manifest_file and cache.manifest)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
}

/// Arguments for the activate command
#[derive(Parser, Debug)]
pub struct ActivateArgs {
    /// Generation to activate (defaults to cache.generation)
    #[arg(short, long)]
    pub generation: Option<String>,

    /// Activate even if the generation has no store
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Request URL or path, matched exactly
    pub url: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Generation to serve from (defaults to cache.generation)
    #[arg(short, long)]
    pub generation: Option<String>,

    /// Print the status line and headers before the body
    #[arg(short, long)]
    pub include: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
