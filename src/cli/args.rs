//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Build postfix expression trees, score them over input pairs, and rank them
#[derive(Parser, Debug)]
#[command(name = "postrank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding .postrank.toml (default: cwd); relative paths in
    /// that file resolve against it
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Without a subcommand, ranks the configured files
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every expression over the input pairs and print them ranked
    Rank {
        /// Postfix expressions, one per line
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        expressions: Option<PathBuf>,
        /// Input pairs "a b", one per line
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        inputs: Option<PathBuf>,
        /// Score expressions on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Evaluate one postfix expression for a single (a, b)
    #[command(allow_negative_numbers = true)]
    Eval {
        /// Postfix expression, e.g. "a b +"
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Value bound to `a`
        a: f64,
        /// Value bound to `b`
        b: f64,
    },

    /// Print the fully parenthesized infix form
    Render {
        /// Postfix expression
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },

    /// Show the expression tree
    Tree {
        /// Postfix expression
        #[arg(allow_hyphen_values = true)]
        expression: String,
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
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
