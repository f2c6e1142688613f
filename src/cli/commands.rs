//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - replay: run a YAML operation script against a fresh scheduler
//! - demo: run the built-in five-task trace

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// taskheap - Indexed priority scheduler
#[derive(Parser, Debug)]
#[command(name = "taskheap")]
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
    pub command: Commands,
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
    /// Replay an operation script
    Replay {
        /// Path to the YAML script
        script: PathBuf,

        /// Print outcomes as JSON lines
        #[arg(short, long)]
        json: bool,
    },

    /// Run the built-in demonstration trace
    Demo,
}
