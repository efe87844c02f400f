//! CLI interface for devcrew
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// devcrew - a crew of AI specialists that turns one sentence into a project
///
/// A planner breaks the description into tasks, frontend, backend and
/// security specialists answer them, and annotated code blocks are written
/// to disk.
#[derive(Parser, Debug)]
#[command(name = "devcrew")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use this model for every agent in this invocation
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a project from a description
    Build {
        /// What to build, e.g. "a todo app with user accounts"
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Ask a single agent
    Chat {
        /// Agent name, e.g. @frontend (prefixes work)
        agent: String,

        /// The message
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// List available agents
    Agents,

    /// Create the default configuration file
    Init,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,

    /// Store the Groq API key in the OS keychain
    SetKey {
        /// The API key
        key: String,
    },

    /// Set the default model
    SetModel {
        /// Model identifier, e.g. llama-3.3-70b-versatile
        model: String,
    },

    /// Validate the configuration file
    Validate,
}
