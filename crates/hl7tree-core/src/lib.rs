//! hl7tree Core Types and Definitions
//!
//! This crate provides the foundational types shared by the hl7tree parser
//! and its front ends. It includes:
//!
//! - **Delimiters**: The per-message delimiter tuple declared in the header line ([`delimiters::Delimiters`])
//! - **Values**: Semantic types, typed leaf values and nested mappings ([`value`] module)
//! - **Schema**: Segment layouts keyed by element code ([`schema::SchemaCatalog`])
//! - **Levels**: The static code to nesting-level table ([`levels::LevelTable`])
//! - **Built-in tables**: A catalog and level table for common segments ([`builtin`] module)
//! - **Control characters**: Framing characters and debug helpers ([`control`] module)

pub mod builtin;
pub mod control;
pub mod delimiters;
pub mod levels;
pub mod schema;
pub mod value;
