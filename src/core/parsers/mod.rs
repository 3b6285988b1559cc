//! Template parsers.
//!
//! - `html`: tolerant HTML/Angular template parser producing a span-annotated tree

pub mod html;
