//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Browse composite wiki trees: pinned pages and documents merged under one root
#[derive(Parser, Debug)]
#[command(name = "wikitree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Tree file (default: `tree_file` from config)
    #[arg(short = 'f', long, global = true, value_hint = ValueHint::FilePath)]
    pub tree_file: Option<PathBuf>,

    /// Node property forwarded to providers, repeatable (e.g. -p locale=fr)
    #[arg(short = 'p', long = "property", global = true, value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Number of direct children of a node
    Count {
        /// Node identifier
        id: String,
    },

    /// List a page of children of a node
    Children {
        /// Node identifier
        id: String,
        /// Position of the first child
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
        /// Maximum number of children (default: page_size from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Parent of a node
    Parent {
        /// Node identifier
        id: String,
    },

    /// Show the tree below a node (default: the tree file's root)
    Tree {
        /// Node identifier
        id: Option<String>,
        /// Levels to show (default: max_depth from config)
        #[arg(long)]
        depth: Option<usize>,
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
    /// Show effective configuration
    Show,
    /// Print a commented template config
    Template,
    /// Show config file locations
    Path,
}

/// Parse `key=value`.
pub fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
