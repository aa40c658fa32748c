use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// termux-bootstrap - Resolve the host app's package manager and variant
#[derive(Parser, Debug)]
#[command(name = "termux-bootstrap")]
#[command(about = "Resolve and validate the package manager and variant of a Termux host app build")]
#[command(version)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a variant name; fails on an unsupported variant or manager
    Resolve {
        /// Package variant name (e.g. nix-android-8)
        #[arg(env = "TERMUX_PACKAGE_VARIANT")]
        variant: String,
    },
    /// Read the variant from the host app's build constants; never fails
    FromHost {
        /// JSON file with the host's build constants
        #[arg(short, long)]
        build_config: Option<PathBuf>,

        /// Host app package name
        #[arg(short, long)]
        package: Option<String>,

        /// JSON file describing the host context
        #[arg(short, long, conflicts_with_all = ["build_config", "package"])]
        config: Option<PathBuf>,
    },
    /// List registered package managers and variants
    List,
    /// Check that every variant's prefix names a registered manager
    Check,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
