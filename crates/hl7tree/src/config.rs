//! Configuration types for hl7tree parsing.
//!
//! This module provides configuration structures that control how messages
//! are framed and which schema tables they are parsed against. All types
//! implement [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining framing and schema settings.
//! - [`FramingConfig`] - Controls how raw text is cut into segment lines.
//! - [`SchemaConfig`] - Points at a catalog file replacing the built-in tables.
//! - [`OutputConfig`] - Chooses how serialized segments write trailing fields.
//!
//! # Example
//!
//! ```
//! # use hl7tree::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.framing().segment_terminator(), '\r');
//! assert!(config.schema().catalog().is_none());
//! assert_eq!(config.output().layout(), hl7tree::TextLayout::Padded);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use hl7tree_core::control::CR;
use hl7tree_parser::{FramingOptions, TextLayout};

/// Top-level application configuration combining framing and schema settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Framing configuration section.
    #[serde(default)]
    framing: FramingConfig,

    /// Schema configuration section.
    #[serde(default)]
    schema: SchemaConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified framing and schema configurations.
    ///
    /// # Arguments
    ///
    /// * `framing` - Line framing settings.
    /// * `schema` - Schema table settings.
    pub fn new(framing: FramingConfig, schema: SchemaConfig) -> Self {
        Self {
            framing,
            schema,
            output: OutputConfig::default(),
        }
    }

    /// Replaces the output configuration.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Returns the framing configuration.
    pub fn framing(&self) -> &FramingConfig {
        &self.framing
    }

    /// Returns the schema configuration.
    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Line framing configuration.
///
/// ```toml
/// [framing]
/// segment_terminator = "\r"
/// fall_back_to_lf = true
/// strip_vertical_tab = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Character ending each segment line.
    segment_terminator: char,

    /// Split on line feeds when the terminator does not occur.
    fall_back_to_lf: bool,

    /// Remove vertical tabs, block markers included, from every line.
    strip_vertical_tab: bool,
}

impl FramingConfig {
    /// Creates a new [`FramingConfig`].
    pub fn new(segment_terminator: char, fall_back_to_lf: bool, strip_vertical_tab: bool) -> Self {
        Self {
            segment_terminator,
            fall_back_to_lf,
            strip_vertical_tab,
        }
    }

    /// Returns the segment terminator.
    pub fn segment_terminator(&self) -> char {
        self.segment_terminator
    }

    /// Returns the [`FramingOptions`] the parser runs with.
    pub fn options(&self) -> FramingOptions {
        FramingOptions::new(
            self.segment_terminator,
            self.fall_back_to_lf,
            self.strip_vertical_tab,
        )
    }
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self::new(CR, true, true)
    }
}

/// Schema table configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    /// Catalog file replacing the built-in catalog and level table.
    #[serde(default)]
    catalog: Option<PathBuf>,
}

impl SchemaConfig {
    /// Creates a new [`SchemaConfig`] pointing at a catalog file.
    pub fn new(catalog: Option<PathBuf>) -> Self {
        Self { catalog }
    }

    /// Returns the catalog file path, or `None` for the built-in tables.
    pub fn catalog(&self) -> Option<&Path> {
        self.catalog.as_deref()
    }
}

/// Output configuration.
///
/// ```toml
/// [output]
/// layout = "as_parsed"
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `padded` writes every field position, `as_parsed` keeps parsed lines
    /// as short as they came in.
    layout: TextLayout,
}

impl OutputConfig {
    pub fn new(layout: TextLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> TextLayout {
        self.layout
    }
}
