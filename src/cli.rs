//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for pagewriter using the `clap` crate.
//! Every command runs one visit to the document view: the session is entered,
//! the action is performed through the controller, and the session is left.
//!
//! # Commands
//!
//! - **submit**: Append a snippet (to `--title`, or the marked document)
//! - **show**: Print the current document, or open another one
//! - **docs**: List document names
//! - **pick**: Run the fuzzy picker non-interactively
//! - **edit** / **rm**: Change or delete a snippet of the current document
//! - **export**: Write every document as Markdown
//! - **keys**: Show the effective keybindings
//! - **config**: Configuration helpers
//!
//! # Examples
//!
//! ```
//! use pagewriter::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["pagewriter", "pick", "open", "tod"]);
//! assert!(matches!(cli.get_command(), Commands::Pick { .. }));
//! ```

use crate::db::SnippetId;
use crate::picker::PickerMode;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Picker mode as written on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    /// Mark the best match
    Mark,
    /// Open the best match
    Open,
    /// Delete the best match
    Delete,
    /// Move `--snippet` into the best match
    Move,
}

impl From<PickMode> for PickerMode {
    fn from(mode: PickMode) -> Self {
        match mode {
            PickMode::Mark => Self::MarkDocument,
            PickMode::Open => Self::SetCurrentDocument,
            PickMode::Delete => Self::DeleteDocument,
            PickMode::Move => Self::MoveSnippet,
        }
    }
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the path of the configuration file
    Path,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pagewriter")]
#[command(about = "Keyboard-driven documents of snippets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Database directory to use (overrides config)
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Append a snippet to a document
    #[command(visible_alias = "s")]
    Submit {
        /// Snippet text
        text: String,

        /// Target document (defaults to the marked document, or the first line)
        #[arg(short = 't', long = "title")]
        title: Option<String>,
    },

    /// Print the current document, or open DOCUMENT first (default)
    Show {
        /// Document to open
        document: Option<String>,
    },

    /// List documents
    #[command(visible_alias = "ls")]
    Docs,

    /// Apply the best fuzzy match for QUERY
    #[command(visible_alias = "p")]
    Pick {
        /// What to do with the match
        #[arg(value_enum)]
        mode: PickMode,

        /// Fuzzy query over document names
        query: String,

        /// Snippet to move (required for `move`)
        #[arg(long = "snippet", value_name = "ID")]
        snippet: Option<SnippetId>,
    },

    /// Replace the text of a snippet in the current document
    Edit {
        id: SnippetId,
        text: String,
    },

    /// Delete a snippet from the current document
    #[command(name = "rm")]
    Remove {
        id: SnippetId,
    },

    /// Export every document as Markdown
    Export,

    /// Show the effective keybindings
    Keys,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to Show if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Show { document: None })
    }
}
