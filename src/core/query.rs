//! Maps an (identifier, occurrence) pair back to a source span.
//!
//! Uses the walker's traversal, so occurrence numbers agree with the ones
//! stored in the index as long as the document has not changed since.

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::core::{
    parsers::html::{Attribute, Element, HtmlDocument, Span, parse_html},
    walker::{Marker, parse_marker, visit_elements},
};

/// Which span of a marker to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanTarget {
    /// Value of the `i18n`/`i18n-*` attribute itself.
    Id,
    /// Element content (content mode) or sibling attribute value (attribute mode).
    Content,
}

/// One marker found by [`find_occurrence`].
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub element: &'a Element,
    pub marker_attr: &'a Attribute,
    pub marker: Marker<'a>,
}

impl Located<'_> {
    pub fn span(&self, target: SpanTarget) -> Option<Span> {
        match target {
            SpanTarget::Id => Some(
                self.marker_attr
                    .value_span
                    .unwrap_or(self.marker_attr.name_span),
            ),
            SpanTarget::Content => match self.marker {
                Marker::Content => self.element.content_span,
                Marker::Attribute(name) => self.element.attr(name).and_then(|attr| attr.value_span),
            },
        }
    }
}

/// The `occurrence`-th marker (0-indexed) carrying `id` in traversal order.
pub fn find_occurrence<'a>(doc: &'a HtmlDocument, id: &str, occurrence: usize) -> Option<Located<'a>> {
    let mut remaining = occurrence;
    let mut found = None;
    visit_elements(&doc.root_nodes, &mut |element| {
        if found.is_some() {
            return;
        }
        for attr in &element.attrs {
            let Some(marker) = parse_marker(&attr.name) else {
                continue;
            };
            if attr.value != id {
                continue;
            }
            if remaining == 0 {
                found = Some(Located {
                    element,
                    marker_attr: attr,
                    marker,
                });
                return;
            }
            remaining -= 1;
        }
    });
    found
}

/// Span for one occurrence, or `None` when the document has fewer occurrences
/// or the target has no span (missing sibling attribute, void element).
pub fn locate_span(doc: &HtmlDocument, id: &str, occurrence: usize, target: SpanTarget) -> Option<Span> {
    find_occurrence(doc, id, occurrence).and_then(|located| located.span(target))
}

/// Every occurrence of `id`, in order. Entries are `None` where an occurrence
/// exists but has no span for `target`.
pub fn locate_all(doc: &HtmlDocument, id: &str, target: SpanTarget) -> Vec<Option<Span>> {
    (0..)
        .map_while(|occurrence| find_occurrence(doc, id, occurrence).map(|located| located.span(target)))
        .collect()
}

/// Read and parse `file`, then locate one occurrence in it.
pub fn locate_in_file(file: &Path, id: &str, occurrence: usize, target: SpanTarget) -> Result<Option<Span>> {
    let doc = read_document(file)?;
    Ok(locate_span(&doc, id, occurrence, target))
}

pub fn read_document(file: &Path) -> Result<HtmlDocument> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read template: {}", file.display()))?;
    Ok(parse_html(source, &file.to_string_lossy()))
}
