//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: start or resume the hunt loop
//! - status: progress report from the state and result files
//! - check: one-shot classification of a single domain

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Huntr - a progressive short-domain availability hunter
#[derive(Parser, Debug)]
#[command(name = "huntr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start or resume the hunt (default when no subcommand is given)
    Run,

    /// Show search progress and found domains
    Status,

    /// Classify a single domain and print the evidence
    Check {
        /// Domain to classify, e.g. "abc.io"
        domain: String,
    },
}
