//! Finds i18n markers in a parsed template.
//!
//! A marker is an attribute named `i18n` (content mode) or `i18n-<name>`
//! (attribute mode). Elements are visited in pre-order with children in
//! source order; [`crate::core::query`] relies on the same order to map an
//! (id, occurrence) pair back to a span.

use std::collections::HashMap;

use crate::{
    core::{
        parsers::html::{Element, HtmlDocument, Node, Span},
        record::{AttributeRef, ElementRef, ExtractionMode, Finding, OccurrenceRecord, RecordState},
    },
    issues::{Rule, Severity},
};

pub const MARKER_ATTRIBUTE: &str = "i18n";

/// Kind of i18n marker carried by an attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    Content,
    Attribute(&'a str),
}

pub fn parse_marker(attr_name: &str) -> Option<Marker<'_>> {
    if attr_name == MARKER_ATTRIBUTE {
        return Some(Marker::Content);
    }
    attr_name
        .strip_prefix("i18n-")
        .filter(|suffix| !suffix.is_empty())
        .map(Marker::Attribute)
}

/// Visit every element of the document in pre-order.
pub(crate) fn visit_elements<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            visit(element);
            visit_elements(&element.children, visit);
        }
    }
}

/// Walk a document and return its occurrence records in document order.
pub fn walk_document(doc: &HtmlDocument) -> Vec<OccurrenceRecord> {
    let mut records = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    visit_elements(&doc.root_nodes, &mut |element| {
        for attr in &element.attrs {
            let Some(marker) = parse_marker(&attr.name) else {
                continue;
            };
            let id = attr.value.clone();
            let counter = seen.entry(id.clone()).or_insert(0);
            let occurrence = *counter;
            *counter += 1;

            let id_span = attr.value_span.unwrap_or(attr.name_span);
            records.push(extract(doc, element, marker, id, occurrence, id_span));
        }
    });

    records
}

fn extract(
    doc: &HtmlDocument,
    element: &Element,
    marker: Marker<'_>,
    id: String,
    occurrence: usize,
    id_span: Span,
) -> OccurrenceRecord {
    let element_ref = ElementRef {
        name: element.name.clone(),
        start_span: element.start_span,
        content_span: element.content_span,
        text_content: element.text_content(),
        has_child_elements: element.has_child_elements(),
    };

    let (mode, attribute, extracted) = match marker {
        Marker::Content => {
            let value = element
                .content_span
                .map(|span| doc.slice(span).trim().to_string())
                .filter(|value| !value.is_empty());
            let extracted = value.ok_or_else(|| "no inner content found".to_string());
            (ExtractionMode::Content, None, extracted)
        }
        Marker::Attribute(name) => {
            let sibling = element.attr(name);
            let attribute = sibling.map(|attr| AttributeRef {
                name: attr.name.clone(),
                value_span: attr.value_span,
            });
            let extracted = match sibling {
                None => Err(format!("matching attribute was not found: {}", name)),
                Some(attr) if attr.value.trim().is_empty() => {
                    Err(format!("matching attribute is empty: {}", name))
                }
                Some(attr) => Ok(attr.value.trim().to_string()),
            };
            (
                ExtractionMode::Attribute {
                    name: name.to_string(),
                },
                attribute,
                extracted,
            )
        }
    };

    let (value, state) = match extracted {
        Ok(value) => (Some(value), RecordState::Success),
        Err(message) => (
            None,
            RecordState::Flagged(Finding {
                severity: Severity::Error,
                rule: Rule::Extraction,
                message,
            }),
        ),
    };

    OccurrenceRecord {
        id,
        occurrence,
        element: element_ref,
        mode,
        attribute,
        id_span,
        source_line: doc.line_text(id_span.start.line).to_string(),
        value,
        state,
        fixer: None,
    }
}
