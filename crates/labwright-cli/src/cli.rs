//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Labwright CLI - Resolve lab systems into a bill of materials.
#[derive(Debug, Parser)]
#[command(name = "labwright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(long, global = true, env = "LABWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Indented tree format
    Tree,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List catalog items
    List(ListArgs),

    /// Show the full dependency hierarchy of an item
    Show(ShowArgs),

    /// Add or update an item from its documentation
    Add(AddArgs),

    /// Resolve a system into a bill of materials
    Resolve(ResolveArgs),

    /// Report cycles and dangling references in the catalog
    Check,

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only items of this category
    #[arg(short, long)]
    pub category: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Item name (case-insensitive)
    pub item: String,

    /// Maximum depth to expand
    #[arg(short, long, default_value = "8")]
    pub depth: usize,
}

/// Arguments for the add command.
#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Item name
    pub name: String,

    /// Item category (System, Module, Component, Part, Raw Material, or any other)
    #[arg(short, long)]
    pub category: String,

    /// Attribute as key=value (repeatable)
    #[arg(short, long = "attr", value_name = "KEY=VALUE")]
    pub attrs: Vec<String>,

    /// Documentation text
    #[arg(long, conflicts_with = "doc_file")]
    pub doc: Option<String>,

    /// Read documentation text from a file
    #[arg(long)]
    pub doc_file: Option<PathBuf>,
}

/// Arguments for the resolve command.
#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Root system name (case-insensitive)
    pub system: String,

    /// Free-text design intent
    #[arg(short, long, default_value = "")]
    pub intent: String,

    /// Units of the system to build
    #[arg(short, long, default_value = "1")]
    pub quantity: u32,
}

/// Arguments for config management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Tree => crate::config::OutputFormat::Tree,
        }
    }
}
