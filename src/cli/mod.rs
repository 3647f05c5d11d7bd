//! CLI module for huntr - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running the hunt,
//! reporting progress, and one-shot candidate checks.

pub mod commands;

pub use commands::Cli;
