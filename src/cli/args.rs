//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Ordered N-ary tree playground: build sample trees and print their traversals
#[derive(Parser, Debug)]
#[command(name = "ntree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "NTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the demo tree and print every traversal
    Demo {
        /// Children of the root (1-9)
        #[arg(long)]
        fanout: Option<usize>,

        /// Children of every root child (0-9)
        #[arg(long)]
        grandchildren: Option<usize>,

        /// Show node handles in the rendering
        #[arg(long)]
        show_ids: bool,
    },

    /// Iterate a flat node both ways, then remove its first child
    Children {
        /// Number of children below the root
        #[arg(short = 'n', long, default_value_t = 19)]
        count: usize,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,
    /// Print a commented template config file
    Template,
    /// Print the global config file location
    Path,
}
