//! Fix capabilities attached to flagged records.
//!
//! A fixer knows which identifier(s) and files it concerns. Spans are never
//! taken from the index: every file is re-read and re-parsed when the fix is
//! planned, then occurrences are located again by (id, occurrence).

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use anyhow::{Context, Result, bail};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    actions::{
        ActionStats,
        operation::{Edit, Operation, execute_operations},
    },
    core::{
        parsers::html::{HtmlDocument, Span},
        query::{SpanTarget, find_occurrence, read_document},
        walker::Marker,
    },
};

/// One selectable way of resolving a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixAction {
    pub id: String,
    pub label: String,
}

impl FixAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

pub const KEEP_ACTION_PREFIX: &str = "keep:";
pub const FLATTEN_ACTION: &str = "flatten";
pub const USE_ACTION_PREFIX: &str = "use:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fixer {
    /// Two identifiers share a value; keep one and rename every usage of the other.
    ReplaceId {
        /// Each candidate identifier and the files using it.
        usages: BTreeMap<String, BTreeSet<String>>,
    },
    /// Replace nested markup in the content of every `id` occurrence with its text.
    FlattenContent { id: String, files: BTreeSet<String> },
    /// Rewrite every diverging value of `id` to one of `values`.
    UnifyValue {
        id: String,
        values: Vec<String>,
        files: BTreeSet<String>,
    },
}

impl Fixer {
    pub fn actions(&self) -> Vec<FixAction> {
        match self {
            Fixer::ReplaceId { usages } => usages
                .keys()
                .map(|id| FixAction::new(format!("{KEEP_ACTION_PREFIX}{id}"), format!("Keep {}", id)))
                .collect(),
            Fixer::FlattenContent { .. } => {
                vec![FixAction::new(FLATTEN_ACTION, "Remove nested HTML tags")]
            }
            Fixer::UnifyValue { values, .. } => values
                .iter()
                .enumerate()
                .map(|(n, value)| FixAction::new(format!("{USE_ACTION_PREFIX}{n}"), format!("Use \"{}\"", value)))
                .collect(),
        }
    }

    /// Build the edits for `action_id` against the current file contents.
    pub fn plan(&self, action_id: &str) -> Result<Vec<Operation>> {
        match self {
            Fixer::ReplaceId { usages } => {
                let Some(winner) = action_id
                    .strip_prefix(KEEP_ACTION_PREFIX)
                    .filter(|id| usages.contains_key(*id))
                else {
                    bail!(unknown_action(self, action_id));
                };
                let mut ops = Vec::new();
                for (loser, files) in usages.iter().filter(|(id, _)| *id != winner) {
                    for file in files {
                        let doc = read_document(Path::new(file))?;
                        push_operation(&mut ops, file, rename_edits(&doc, loser, winner));
                    }
                }
                Ok(ops)
            }
            Fixer::FlattenContent { id, files } => {
                if action_id != FLATTEN_ACTION {
                    bail!(unknown_action(self, action_id));
                }
                let mut ops = Vec::new();
                for file in files {
                    let doc = read_document(Path::new(file))?;
                    push_operation(&mut ops, file, flatten_edits(&doc, id));
                }
                Ok(ops)
            }
            Fixer::UnifyValue { id, values, files } => {
                let Some(target) = action_id
                    .strip_prefix(USE_ACTION_PREFIX)
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| values.get(n))
                else {
                    bail!(unknown_action(self, action_id));
                };
                let mut ops = Vec::new();
                for file in files {
                    let doc = read_document(Path::new(file))?;
                    push_operation(&mut ops, file, unify_edits(&doc, id, target));
                }
                Ok(ops)
            }
        }
    }
}

fn unknown_action(fixer: &Fixer, action_id: &str) -> String {
    let known: Vec<String> = fixer.actions().into_iter().map(|a| a.id).collect();
    format!(
        "Unknown fix action '{}' (available: {})",
        action_id,
        known.join(", ")
    )
}

fn edit_for(span: Span, replacement: String) -> Edit {
    Edit {
        range: span.range(),
        replacement,
        line: span.start.line + 1,
    }
}

fn push_operation(ops: &mut Vec<Operation>, file: &str, edits: Vec<Edit>) {
    if !edits.is_empty() {
        ops.push(Operation {
            file_path: file.to_string(),
            edits,
        });
    }
}

/// Drop edits lying inside an earlier, enclosing edit.
fn drop_nested(mut edits: Vec<Edit>) -> Vec<Edit> {
    edits.sort_by_key(|edit| edit.range.start);
    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if kept
            .last()
            .is_some_and(|outer| edit.range.start < outer.range.end)
        {
            continue;
        }
        kept.push(edit);
    }
    kept
}

/// Point every marker carrying `from` at `to`. A valueless `i18n` marker
/// gets the value inserted after its name.
fn rename_edits(doc: &HtmlDocument, from: &str, to: &str) -> Vec<Edit> {
    (0..)
        .map_while(|occurrence| find_occurrence(doc, from, occurrence))
        .map(|located| {
            let attr = located.marker_attr;
            match attr.value_span {
                Some(span) => edit_for(span, to.to_string()),
                None => {
                    let end = attr.name_span.end;
                    edit_for(
                        Span { start: end, end },
                        format!("=\"{}\"", escape_for_quote(to, Some('"'))),
                    )
                }
            }
        })
        .collect()
}

fn flatten_edits(doc: &HtmlDocument, id: &str) -> Vec<Edit> {
    let edits = (0..)
        .map_while(|occurrence| find_occurrence(doc, id, occurrence))
        .filter(|located| matches!(located.marker, Marker::Content))
        .filter(|located| located.element.has_child_elements())
        .filter_map(|located| {
            let span = located.element.content_span?;
            Some(edit_for(span, located.element.text_content()))
        })
        .collect();
    drop_nested(edits)
}

fn unify_edits(doc: &HtmlDocument, id: &str, target: &str) -> Vec<Edit> {
    let edits = (0..)
        .map_while(|occurrence| find_occurrence(doc, id, occurrence))
        .filter_map(|located| {
            let span = located.span(SpanTarget::Content)?;
            let current = doc.slice(span);
            if current.trim() == target {
                return None;
            }
            let value = match located.marker {
                Marker::Content => target.to_string(),
                Marker::Attribute(_) => match quote_before(doc, span) {
                    Some(quote) => escape_for_quote(target, Some(quote)),
                    None => format!("\"{}\"", escape_for_quote(target, Some('"'))),
                },
            };
            let leading = &current[..current.len() - current.trim_start().len()];
            let trailing = &current[current.trim_end().len()..];
            Some(edit_for(span, format!("{leading}{value}{trailing}")))
        })
        .collect();
    drop_nested(edits)
}

fn quote_before(doc: &HtmlDocument, span: Span) -> Option<char> {
    doc.source[..span.start.offset]
        .chars()
        .next_back()
        .filter(|c| matches!(c, '"' | '\''))
}

fn escape_for_quote(value: &str, quote: Option<char>) -> String {
    match quote {
        Some('"') => value.replace('"', "&quot;"),
        Some('\'') => value.replace('\'', "&#39;"),
        _ => value.to_string(),
    }
}

/// Run `action_id` of a fixer and return what changed.
pub fn apply_fixer(fixer: &Fixer, action_id: &str) -> Result<ActionStats> {
    let ops = fixer.plan(action_id)?;
    execute_operations(&ops)
        .with_context(|| format!("Failed to apply fix action '{}'", action_id))
}
