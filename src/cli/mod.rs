//! CLI module for taskheap - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
