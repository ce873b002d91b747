use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::error_reporter::MessageLanguage;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show failures
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show raw engine messages and debug logging
    Verbose,
}

impl VerbosityLevel {
    pub fn from_config(config: &Config) -> Self {
        if config.output.quiet {
            VerbosityLevel::Quiet
        } else if config.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Maximum log level installed for this verbosity
    pub fn log_level(&self) -> tracing::Level {
        match self {
            VerbosityLevel::Quiet => tracing::Level::ERROR,
            VerbosityLevel::Normal => tracing::Level::WARN,
            VerbosityLevel::Verbose => tracing::Level::DEBUG,
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-file report followed by a summary
    Human,
    /// One JSON array with a report per file
    Json,
}

impl OutputFormat {
    pub fn from_config(config: &Config) -> Self {
        config.output.format.into()
    }
}

/// Validate CT-e and NF-e documents against their XSD schemas
#[derive(Parser, Debug, Clone)]
#[command(name = "fiscal-xml-validator")]
#[command(about = "Validate CT-e/NF-e XML documents and explain every schema violation")]
#[command(version)]
pub struct Cli {
    /// Documents to validate
    #[arg(required = true, help = "XML documents to validate")]
    pub files: Vec<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory holding the CT-e/ and NF-e/ schema folders
    #[arg(long = "schema-dir")]
    pub schema_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Language of diagnostic messages
    #[arg(short = 'l', long = "language", value_enum)]
    pub language: Option<MessageLanguage>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (failures only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
