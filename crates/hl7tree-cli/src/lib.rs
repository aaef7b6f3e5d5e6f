//! CLI logic for the hl7tree message tool.
//!
//! Reads a file of one or more messages, parses every message and writes
//! them back out as wire text, as an element tree or as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Layout, OutputFormat};

use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
};

use log::info;

use hl7tree::{Hl7TreeError, Message, MessageParser, config::OutputConfig};

/// Run the hl7tree CLI application
///
/// # Errors
///
/// Returns `Hl7TreeError` for:
/// - File I/O errors
/// - Configuration and catalog loading errors
/// - Parsing errors, one diagnostic per failing message
pub fn run(args: &Args) -> Result<(), Hl7TreeError> {
    info!(
        input_path = args.input,
        output_path:? = args.output,
        format:? = args.format,
        layout:? = args.layout;
        "Processing messages"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(layout) = args.layout {
        app_config = app_config.with_output(OutputConfig::new(layout.into()));
    }
    let tables = config::load_tables(&app_config)?;

    let source = fs::read_to_string(&args.input)?;

    let mut parser = MessageParser::new(app_config);
    if let Some((catalog, levels)) = tables {
        parser = parser.with_tables(catalog, levels);
    }
    let messages = parser.parse_all(&source)?;
    let output = render(&parser, &messages, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file = path, messages = messages.len(); "Messages written");
        }
        None => io::stdout().write_all(output.as_bytes())?,
    }

    Ok(())
}

/// Render parsed messages in the requested format.
///
/// # Errors
///
/// Returns `Hl7TreeError::Io` if JSON encoding fails.
pub fn render(
    parser: &MessageParser,
    messages: &[Message],
    format: OutputFormat,
) -> Result<String, Hl7TreeError> {
    match format {
        OutputFormat::Text => Ok(parser.serialize_all(messages)),
        OutputFormat::Tree => {
            let mut out = String::new();
            for (index, message) in messages.iter().enumerate() {
                let kind = match (message.message_code(), message.event_code()) {
                    (Some(code), Some(event)) => format!("{code}^{event}"),
                    (Some(code), None) => code.to_string(),
                    _ => "unknown".to_string(),
                };
                let _ = writeln!(out, "# message {} ({kind})", index + 1);
                out.push_str(&message.format_tree());
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let data: Vec<_> = messages.iter().map(Message::to_data).collect();
            let mut json = serde_json::to_string_pretty(&data).map_err(io::Error::from)?;
            json.push('\n');
            Ok(json)
        }
    }
}
