//! Occurrence records and the two project indices built from them.
//!
//! Records are immutable values: validators build replacements through
//! [`ByIdRecord::flagged`] and [`ByIdRecord::with_fixer`] instead of mutating
//! records that may be shared with other snapshots.

use std::collections::BTreeMap;

use crate::{
    actions::Fixer,
    core::parsers::html::Span,
    issues::{Rule, Severity},
};

/// How the translatable value of a marker is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Bare `i18n`: the element content is the value.
    Content,
    /// `i18n-<name>`: the sibling attribute `<name>` holds the value.
    Attribute { name: String },
}

/// Snapshot of the element that owns a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub name: String,
    pub start_span: Span,
    pub content_span: Option<Span>,
    /// Plain text of the content with nested element wrappers dropped.
    pub text_content: String,
    pub has_child_elements: bool,
}

/// The attribute a value was read from in attribute mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    pub name: String,
    pub value_span: Option<Span>,
}

/// Problem attached to a record by extraction or validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub rule: Rule,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    Success,
    Flagged(Finding),
}

impl RecordState {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            RecordState::Success => None,
            RecordState::Flagged(finding) => Some(finding.severity),
        }
    }
}

/// One i18n marker found in one file.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceRecord {
    pub id: String,
    /// Index among same-id markers of the same file, in traversal order.
    pub occurrence: usize,
    pub element: ElementRef,
    pub mode: ExtractionMode,
    pub attribute: Option<AttributeRef>,
    /// Span of the marker attribute's value (the id itself).
    pub id_span: Span,
    /// Source line holding the marker, kept for reports.
    pub source_line: String,
    /// Trimmed extracted value; `None` when extraction failed.
    pub value: Option<String>,
    pub state: RecordState,
    pub fixer: Option<Fixer>,
}

impl OccurrenceRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.state, RecordState::Success)
    }

    pub fn finding(&self) -> Option<&Finding> {
        match &self.state {
            RecordState::Success => None,
            RecordState::Flagged(finding) => Some(finding),
        }
    }
}

/// A record as seen from the identifier index: it knows its file.
#[derive(Debug, Clone, PartialEq)]
pub struct ByIdRecord {
    pub file: String,
    pub record: OccurrenceRecord,
}

impl ByIdRecord {
    pub fn flagged(self, severity: Severity, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            file: self.file,
            record: OccurrenceRecord {
                state: RecordState::Flagged(Finding {
                    severity,
                    rule,
                    message: message.into(),
                }),
                ..self.record
            },
        }
    }

    pub fn with_fixer(self, fixer: Fixer) -> Self {
        Self {
            file: self.file,
            record: OccurrenceRecord {
                fixer: Some(fixer),
                ..self.record
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn value(&self) -> Option<&str> {
        self.record.value.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.record.is_success()
    }
}

/// File path to the records walked from that file, in document order.
pub type FileIndex = BTreeMap<String, Vec<OccurrenceRecord>>;

/// Identifier to every record using it, ordered by file then document order.
pub type IdIndex = BTreeMap<String, Vec<ByIdRecord>>;

/// Identifier index after the validator pipeline ran over it.
pub type AnnotatedIndex = BTreeMap<String, Vec<ByIdRecord>>;

/// Both indices, always published together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSnapshot {
    pub by_file: FileIndex,
    pub by_id: IdIndex,
}

impl IndexSnapshot {
    /// Add the records of a file that is not indexed yet.
    pub fn insert_file(&mut self, file: &str, records: Vec<OccurrenceRecord>) {
        let mut touched = Vec::new();
        for record in &records {
            let entries = self.by_id.entry(record.id.clone()).or_default();
            entries.push(ByIdRecord {
                file: file.to_string(),
                record: record.clone(),
            });
            touched.push(record.id.clone());
        }
        touched.dedup();
        for id in touched {
            if let Some(entries) = self.by_id.get_mut(&id) {
                // Stable: document order within a file is preserved.
                entries.sort_by(|a, b| a.file.cmp(&b.file));
            }
        }
        self.by_file.insert(file.to_string(), records);
    }

    /// Drop every record of `file`, removing identifiers left without records.
    pub fn remove_file(&mut self, file: &str) {
        let Some(previous) = self.by_file.remove(file) else {
            return;
        };
        for record in previous {
            let now_empty = match self.by_id.get_mut(&record.id) {
                Some(entries) => {
                    entries.retain(|entry| entry.file != file);
                    entries.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_id.remove(&record.id);
            }
        }
    }

    pub fn replace_file(&mut self, file: &str, records: Vec<OccurrenceRecord>) {
        self.remove_file(file);
        self.insert_file(file, records);
    }

    pub fn record_count(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::{parsers::html::parse_html, walker::walk_document};

    fn walk(source: &str) -> Vec<OccurrenceRecord> {
        walk_document(&parse_html(source.to_string(), "test.html"))
    }

    fn ids_and_files(snapshot: &IndexSnapshot, id: &str) -> Vec<(String, usize)> {
        snapshot.by_id[id]
            .iter()
            .map(|entry| (entry.file.clone(), entry.record.occurrence))
            .collect()
    }

    #[test]
    fn test_insert_orders_by_file_then_document() {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert_file("b.html", walk(r#"<p i18n="@@a">B0</p><p i18n="@@a">B1</p>"#));
        snapshot.insert_file("a.html", walk(r#"<p i18n="@@a">A0</p>"#));

        assert_eq!(
            ids_and_files(&snapshot, "@@a"),
            vec![
                ("a.html".to_string(), 0),
                ("b.html".to_string(), 0),
                ("b.html".to_string(), 1),
            ]
        );
        assert_eq!(snapshot.record_count(), 3);
    }

    #[test]
    fn test_replace_file_drops_stale_records_and_empty_ids() {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert_file("a.html", walk(r#"<p i18n="@@old">x</p><p i18n="@@shared">y</p>"#));
        snapshot.insert_file("b.html", walk(r#"<p i18n="@@shared">y</p>"#));

        snapshot.replace_file("a.html", walk(r#"<p i18n="@@new">z</p>"#));

        assert!(!snapshot.by_id.contains_key("@@old"));
        assert_eq!(
            ids_and_files(&snapshot, "@@shared"),
            vec![("b.html".to_string(), 0)]
        );
        assert_eq!(ids_and_files(&snapshot, "@@new"), vec![("a.html".to_string(), 0)]);
        assert!(
            snapshot
                .by_id
                .values()
                .flatten()
                .all(|entry| entry.file != "a.html" || entry.record.id == "@@new")
        );
    }

    #[test]
    fn test_remove_unknown_file_is_noop() {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert_file("a.html", walk(r#"<p i18n="@@a">x</p>"#));
        let before = snapshot.clone();

        snapshot.remove_file("missing.html");

        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_flagged_copies_record() {
        let record = walk(r#"<p i18n="@@a">x</p>"#).remove(0);
        let entry = ByIdRecord {
            file: "a.html".to_string(),
            record,
        };

        let flagged = entry
            .clone()
            .flagged(Severity::Warning, Rule::Interpolation, "msg");

        assert!(entry.is_success());
        assert_eq!(flagged.record.finding().unwrap().message, "msg");
        assert_eq!(flagged.record.state.severity(), Some(Severity::Warning));
        assert_eq!(flagged.value(), Some("x"));
    }
}
