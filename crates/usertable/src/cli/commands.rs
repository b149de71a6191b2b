//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::ui::FormFields;

/// Arguments for starting the API service.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Interface to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Database file (overrides configuration)
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,
}

/// Options shared by every user command.
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Base URL of the API (defaults to the configured server address)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,
}

/// Form values for create and update.
#[derive(Debug, Args)]
pub struct FormArgs {
    /// Name of the user
    #[arg(long)]
    pub name: String,

    /// Age of the user
    #[arg(long)]
    pub age: String,

    /// Mobile number of the user
    #[arg(long)]
    pub mobile: String,
}

impl From<FormArgs> for FormFields {
    fn from(args: FormArgs) -> Self {
        FormFields::new(args.name, args.age, args.mobile)
    }
}

/// User table commands, run against a live API.
#[derive(Debug, Args)]
pub struct UsersCommand {
    /// API connection options
    #[command(flatten)]
    pub api: ApiArgs,

    /// The action to perform
    #[command(subcommand)]
    pub action: UsersAction,
}

/// Actions on the user table.
#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// List users, one page at a time
    List {
        /// Page to show (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Load a user into the edit form
    Show {
        /// Id of the user
        id: String,
    },

    /// Create a user
    Create(FormArgs),

    /// Update a user
    Update {
        /// Id of the user
        id: String,

        /// New values
        #[command(flatten)]
        form: FormArgs,
    },

    /// Delete a user
    Delete {
        /// Id of the user
        id: String,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration management commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file (uses default if not specified)
        file: Option<PathBuf>,
    },
}
