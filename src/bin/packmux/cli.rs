//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use packmux::util::context::HOME_ENV;

/// packmux - one interface over every package format
#[derive(Parser)]
#[command(name = "packmux")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Directory holding packmux configuration and package manager state
    #[arg(long, global = true, env = HOME_ENV, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Abort package manager operations after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the local catalog cache of every package manager
    Update(UpdateArgs),

    /// Manage catalog sources
    Source(SourceArgs),

    /// List packages matching a query
    Catalog(CatalogArgs),

    /// Pack a project into distributable packages
    Pack(PackArgs),

    /// Unpack a package from the catalog
    Unpack(UnpackArgs),

    /// Show which package manager handles a source
    Detect(DetectArgs),

    /// List registered package managers
    Formats,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Package manager selection shared by most commands.
#[derive(Args)]
pub struct FormatArg {
    /// Use only the package manager for this format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct SourceArgs {
    #[command(subcommand)]
    pub command: SourceCommands,
}

#[derive(Subcommand)]
pub enum SourceCommands {
    /// Register a catalog source
    Add(SourceTarget),

    /// Deregister a catalog source
    Remove(SourceTarget),
}

#[derive(Args)]
pub struct SourceTarget {
    /// Source location (path or URL)
    pub source: String,

    #[command(flatten)]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Package name (glob patterns allowed)
    pub name: Option<String>,

    /// Version or semver requirement
    #[arg(long = "version", value_name = "REQ")]
    pub version_req: Option<String>,

    /// Only list packages from this source
    #[arg(long)]
    pub source: Option<String>,

    /// Ignore cached catalogs
    #[arg(long)]
    pub no_cache: bool,

    /// Print packages as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct PackArgs {
    /// Project directory (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Override the project name
    #[arg(long)]
    pub name: Option<String>,

    /// Override the project version
    #[arg(long = "version", value_name = "VERSION")]
    pub version_override: Option<String>,

    /// Directory receiving the packages
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Produce a single package for the project and all its targets
    #[arg(long)]
    pub flatten: bool,

    /// Replace packages that already exist
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct UnpackArgs {
    /// Package name
    pub name: String,

    /// Version or semver requirement (defaults to the highest version)
    #[arg(long = "version", value_name = "REQ")]
    pub version_req: Option<String>,

    /// Directory to unpack into (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    pub into: Option<PathBuf>,

    /// Replace the destination directory if it already has content
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Source location (path or URL)
    pub source: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
