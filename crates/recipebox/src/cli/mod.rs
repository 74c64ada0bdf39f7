//! Command-line interface for recipebox.
//!
//! This module provides the CLI structure for the `recipebox` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, AttachCommand, ConfigCommand, DeleteCommand, ListCommand, ShowCommand,
    UpdateCommand,
};

/// recipebox - Keep your own recipes
///
/// Manage the recipe index, detail documents and step photos stored under
/// the recipebox data directory.
#[derive(Debug, Parser)]
#[command(name = "recipebox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List recipes
    List(ListCommand),

    /// Show one recipe in full
    Show(ShowCommand),

    /// Add a recipe
    Add(AddCommand),

    /// Change a recipe's name, ingredients or category
    Update(UpdateCommand),

    /// Delete a recipe with its detail and photos
    Delete(DeleteCommand),

    /// Attach photos to a step
    Attach(AttachCommand),

    /// List the built-in categories
    Categories,

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::logging::Verbosity;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["recipebox", "-q", "categories"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["recipebox", "categories"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["recipebox", "-v", "categories"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["recipebox", "-vv", "categories"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_list_with_query() {
        let cli = parse(&["recipebox", "list", "--query", "tofu", "--json"]);
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.query.as_deref(), Some("tofu"));
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add() {
        let cli = parse(&[
            "recipebox", "add", "Mapo Tofu", "-i", "tofu", "-i", "pork", "--category",
            "Home Cooking",
        ]);
        match cli.command {
            Command::Add(cmd) => {
                assert_eq!(cmd.name, "Mapo Tofu");
                assert_eq!(cmd.ingredients, vec!["tofu".to_string(), "pork".to_string()]);
                assert_eq!(cmd.category.as_deref(), Some("Home Cooking"));
                assert!(cmd.description.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_requires_uuid() {
        assert!(Cli::try_parse_from(["recipebox", "show", "not-a-uuid"]).is_err());

        let id = uuid::Uuid::new_v4();
        let cli = parse(&["recipebox", "show", &id.to_string()]);
        assert!(matches!(
            cli.command,
            Command::Show(ShowCommand { id: parsed, .. }) if parsed == id
        ));
    }

    #[test]
    fn test_parse_attach_requires_files() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(Cli::try_parse_from(["recipebox", "attach", &id, "--step", "1"]).is_err());

        let cli = parse(&["recipebox", "attach", &id, "--step", "2", "a.png", "b.jpg"]);
        match cli.command {
            Command::Attach(cmd) => {
                assert_eq!(cmd.step, 2);
                assert_eq!(cmd.files.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["recipebox", "-c", "/custom/config.toml", "config", "path"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));
    }
}
