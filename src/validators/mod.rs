//! Validators over the identifier index.
//!
//! Two shapes exist:
//! - [`GroupValidator`]: sees every record of one identifier and may rewrite them
//! - [`EntryValidator`]: sees one record still in success state and returns it
//!   unchanged or a flagged copy
//!
//! Both get optional `initialize`/`cleanup` hooks. Stateful validators
//! (duplicate values) reset there. Dispatch goes through `enum_dispatch`.

mod duplicate_value;
mod html_content;
mod id_pattern;
mod interpolation;
mod pipeline;
mod value_mismatch;

use std::collections::BTreeSet;

use enum_dispatch::enum_dispatch;

pub use duplicate_value::DuplicateValueValidator;
pub use html_content::HtmlContentValidator;
pub use id_pattern::IdPatternValidator;
pub use interpolation::InterpolationValidator;
pub use pipeline::{ValidationPipeline, spawn_validation_service, validate_index};
pub use value_mismatch::{ValueMismatchValidator, normalize_value};

use crate::core::record::{ByIdRecord, IdIndex};

/// Read-only view handed to validators for one identifier group.
pub struct ValidatorContext<'a> {
    pub id: &'a str,
    /// Raw (unvalidated) identifier index of the whole project.
    pub index: &'a IdIndex,
}

impl ValidatorContext<'_> {
    /// Files containing at least one record for `id`.
    pub fn files_using(&self, id: &str) -> BTreeSet<String> {
        self.index
            .get(id)
            .map(|entries| entries.iter().map(|entry| entry.file.clone()).collect())
            .unwrap_or_default()
    }
}

#[enum_dispatch]
pub trait EntryValidator {
    fn initialize(&mut self) {}

    /// Return `entry` unchanged or a flagged copy. Records that are already
    /// flagged must come back unchanged.
    fn validate(&mut self, entry: ByIdRecord, ctx: &ValidatorContext<'_>) -> ByIdRecord;

    fn cleanup(&mut self) {}
}

#[enum_dispatch]
pub trait GroupValidator {
    fn initialize(&mut self) {}

    fn validate_group(&mut self, entries: &mut Vec<ByIdRecord>, ctx: &ValidatorContext<'_>);

    fn cleanup(&mut self) {}
}

#[enum_dispatch(EntryValidator)]
#[derive(Debug)]
pub enum AnyEntryValidator {
    DuplicateValue(DuplicateValueValidator),
    IdPattern(IdPatternValidator),
    HtmlContent(HtmlContentValidator),
    Interpolation(InterpolationValidator),
}

#[enum_dispatch(GroupValidator)]
#[derive(Debug)]
pub enum AnyGroupValidator {
    ValueMismatch(ValueMismatchValidator),
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::{
        parsers::html::parse_html,
        record::{ByIdRecord, IdIndex, IndexSnapshot},
        walker::walk_document,
    };

    /// Build an identifier index from (file, template) pairs.
    pub fn index_of(files: &[(&str, &str)]) -> IdIndex {
        let mut snapshot = IndexSnapshot::default();
        for (file, source) in files {
            let doc = parse_html(source.to_string(), file);
            snapshot.insert_file(file, walk_document(&doc));
        }
        snapshot.by_id
    }

    pub fn entry(index: &IdIndex, id: &str, n: usize) -> ByIdRecord {
        index[id][n].clone()
    }
}
