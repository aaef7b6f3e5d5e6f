//! Command-line argument definitions for the hl7tree CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the output format,
//! configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

use hl7tree::TextLayout;

/// Command-line arguments for the hl7tree message tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input message file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// What to write for each parsed message
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// How text output writes trailing fields; overrides the configuration
    #[arg(short, long, value_enum)]
    pub layout: Option<Layout>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Output rendering of parsed messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Re-serialized wire text
    #[default]
    Text,
    /// Indented element tree with annotation counts
    Tree,
    /// Element mappings as a JSON array
    Json,
}

/// Trailing field handling for text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Every field position the layout declares
    Padded,
    /// Lines as short as they were read
    AsParsed,
}

impl From<Layout> for TextLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Padded => TextLayout::Padded,
            Layout::AsParsed => TextLayout::AsParsed,
        }
    }
}
