//! ngi18n - i18n checker for Angular templates
//!
//! ngi18n indexes every `i18n` / `i18n-<attr>` marker in an Angular project's
//! HTML templates, keeps a by-file and a by-identifier index of the extracted
//! messages, and validates them: duplicate values, mismatching values for one
//! identifier, identifier patterns, nested HTML and interpolations. Flagged
//! records carry fix actions that rewrite the templates.
//!
//! ## Module Structure
//!
//! - `actions`: Fixers and the text edits they produce
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and live configuration
//! - `core`: Template parsing, indexing and span queries
//! - `issues`: Issue type definitions and reporting
//! - `mcp`: Model Context Protocol server implementation
//! - `validators`: Validation pipeline over the identifier index

pub mod actions;
pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod mcp;
pub mod validators;
