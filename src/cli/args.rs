//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Artcache - artifact resolution cache
///
/// Inspect and maintain the per-repository record of where dependency
/// artifacts were found, or that they could not be found.
#[derive(Parser, Debug)]
#[command(name = "artcache")]
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
    #[arg(short, long, global = true, env = "ARTCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache directory holding the index file
    #[arg(long, global = true, env = "ARTCACHE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record where an artifact was found
    Store(StoreArgs),

    /// Record that an artifact was not found
    StoreMissing(StoreMissingArgs),

    /// Show the cached resolution for an artifact
    Lookup(LookupArgs),

    /// Forget the cached resolution for an artifact
    Clear(ClearArgs),

    /// List every entry in the index
    List(ListArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Identifies one artifact in one repository
#[derive(Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("kind").required(true).args(["artifact", "file_name"])))]
pub struct ArtifactArgs {
    /// Repository id
    #[arg(short, long)]
    pub repo: String,

    /// Owning component as group:module:version
    #[arg(short, long)]
    pub module: String,

    /// Ivy artifact name as name:type[:extension[:classifier]]
    #[arg(short, long)]
    pub artifact: Option<String>,

    /// File name, for artifacts identified only by file
    #[arg(long)]
    pub file_name: Option<String>,
}

/// Where the descriptor hash comes from
#[derive(Args, Debug, Clone, Default)]
pub struct DescriptorArgs {
    /// Module descriptor file to hash (SHA-256)
    #[arg(long, conflicts_with = "descriptor_hash")]
    pub descriptor: Option<PathBuf>,

    /// Descriptor hash as hex
    #[arg(long)]
    pub descriptor_hash: Option<String>,
}

/// Arguments for the store command
#[derive(Parser, Debug)]
pub struct StoreArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Cached artifact file
    #[arg(short, long)]
    pub path: PathBuf,

    /// File last-modified time in epoch millis (default: read from the file)
    #[arg(long)]
    pub last_modified: Option<i64>,

    #[command(flatten)]
    pub descriptor: DescriptorArgs,
}

/// Arguments for the store-missing command
#[derive(Parser, Debug)]
pub struct StoreMissingArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Location that was tried (repeat in resolution order)
    #[arg(short, long = "location")]
    pub locations: Vec<String>,

    #[command(flatten)]
    pub descriptor: DescriptorArgs,
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only entries for this repository
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Only negative (missing) entries
    #[arg(long)]
    pub missing: bool,

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

    /// Write the default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for lookup and list
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
