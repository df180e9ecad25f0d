//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract comments and their code context from source files
//! - `languages`: List supported languages and their comment syntax
//! - `init`: Initialize a corex configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::core::Language;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Languages) | Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by commands that read source files.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// One JSON document with every record
    Json,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Files or directories to read (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Treat every file as this language instead of detecting it from the extension
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Lines of code searched for and shown as context (overrides config file)
    #[arg(long)]
    pub context_lines: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract comments with the code they document
    Extract(ExtractCommand),
    /// List supported languages, extensions and comment syntax
    Languages,
    /// Initialize a new .corexrc.json configuration file
    Init,
}
