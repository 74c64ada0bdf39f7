//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use uuid::Uuid;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show recipes whose name or ingredients contain this text
    #[arg(short = 's', long = "query")]
    pub query: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Recipe id
    pub id: Uuid,

    /// Output the detail document as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Dish name
    pub name: String,

    /// Ingredient (repeatable)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,

    /// Category name
    #[arg(long)]
    pub category: Option<String>,

    /// Free-text description
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Update command arguments.
///
/// Only the fields a summary carries can be changed here; the rest of the
/// detail document is preserved.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Recipe id
    pub id: Uuid,

    /// New dish name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Replace the ingredient list (repeatable)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,

    /// New category name
    #[arg(long)]
    pub category: Option<String>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Recipe id
    pub id: Uuid,
}

/// Attach command arguments.
#[derive(Debug, Args)]
pub struct AttachCommand {
    /// Recipe id
    pub id: Uuid,

    /// Step number, starting at 1
    #[arg(short, long)]
    pub step: usize,

    /// Image files to attach
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Configuration commands.
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
        /// Path to config file (uses default if not specified)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
