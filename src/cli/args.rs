//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Declarative deployment orchestrator with templated manifests and
/// dependency-ordered rollout.
#[derive(Debug, Parser)]
#[command(name = "rigger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the entry config file
    #[arg(
        short = 'f',
        long = "config",
        global = true,
        default_value = "rigger.json",
        env = "RIGGER_CONFIG"
    )]
    pub config: PathBuf,

    /// Platform context to run against (overrides the config's context)
    #[arg(short = 'C', long, global = true, env = "RIGGER_CONTEXT")]
    pub context: Option<String>,

    /// Act only on resources the pattern names, ignoring their dependencies
    #[arg(long, global = true)]
    pub skip_deps: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render manifests and roll out matching resources in dependency order
    Apply(TargetArgs),

    /// Wait for matching resources to report ready
    Check(TargetArgs),

    /// Tear down matching resources, continuing past individual failures
    Delete(TargetArgs),

    /// Tear down matching resources, then roll them out again
    Recreate(TargetArgs),

    /// Render manifests for matching resources without touching the platform
    Inject(TargetArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments shared by every resource-targeting command.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Glob pattern matched against qualified resource names
    #[arg(value_name = "PATTERN")]
    pub target: String,
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
