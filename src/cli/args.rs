//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Mount widget layouts, query them, and watch removal and focus at work
#[derive(Parser, Debug)]
#[command(name = "widgetdom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the mounted layout as a tree
    Tree {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,
    },

    /// List nodes matching a selector
    Query {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,
        /// Selector, e.g. "Container Button" or "#ok"
        selector: String,
    },

    /// Remove matching nodes and show the resulting tree and focus
    Remove {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,
        /// Selectors whose matches are removed together as one batch
        #[arg(required = true)]
        selectors: Vec<String>,
        /// Press tab this many times before removing
        #[arg(long, default_value_t = 0)]
        tab: usize,
        /// Focus the single node matching this selector before removing
        #[arg(long, conflicts_with = "tab")]
        focus: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings as TOML
    Show,
    /// Print the global config file location
    Path,
}
