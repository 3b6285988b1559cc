//! Issue types for scan results.
//!
//! Flagged records from the annotated index are turned into issues for
//! display. Each issue carries everything the reporter needs (location,
//! source line, message, available fix actions).

use enum_dispatch::enum_dispatch;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{actions::FixAction, core::record::ByIdRecord};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of a finding. Ordered: `Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each kind of finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    /// Marker whose value could not be extracted.
    Extraction,
    DuplicateValue,
    IdPattern,
    HtmlContent,
    Interpolation,
    ValueMismatch,
    ReadError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Extraction => write!(f, "extraction"),
            Rule::DuplicateValue => write!(f, "duplicate-value"),
            Rule::IdPattern => write!(f, "id-pattern"),
            Rule::HtmlContent => write!(f, "html-content"),
            Rule::Interpolation => write!(f, "interpolation"),
            Rule::ValueMismatch => write!(f, "value-mismatch"),
            Rule::ReadError => write!(f, "read-error"),
        }
    }
}

// ============================================================
// Locations
// ============================================================

/// 1-based position in a file, as printed to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub location: SourceLocation,
    pub source_line: String,
}

// ============================================================
// Issue Types
// ============================================================

/// A flagged i18n record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIssue {
    pub context: SourceContext,
    pub id: String,
    /// Position of the record in its identifier's validated list.
    pub index: usize,
    pub occurrence: usize,
    pub value: Option<String>,
    pub severity: Severity,
    pub rule: Rule,
    pub message: String,
    pub fix_actions: Vec<FixAction>,
}

impl EntryIssue {
    /// `None` for records in success state.
    pub fn from_record(entry: &ByIdRecord, index: usize) -> Option<Self> {
        let finding = entry.record.finding()?;
        let start = entry.record.id_span.start;
        Some(Self {
            context: SourceContext {
                location: SourceLocation::new(&entry.file, start.line + 1, start.col + 1),
                source_line: entry.record.source_line.clone(),
            },
            id: entry.record.id.clone(),
            index,
            occurrence: entry.record.occurrence,
            value: entry.record.value.clone(),
            severity: finding.severity,
            rule: finding.rule,
            message: finding.message.clone(),
            fix_actions: entry
                .record
                .fixer
                .as_ref()
                .map(|fixer| fixer.actions())
                .unwrap_or_default(),
        })
    }
}

/// Template that could not be read during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadErrorIssue {
    pub file_path: String,
    pub error: String,
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    Entry(EntryIssue),
    ReadError(ReadErrorIssue),
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Has a source line for context display.
    Source(&'a SourceContext),
    /// File-level only.
    File { path: &'a str },
}

#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }

    /// Optional hint for the "= fix:" line.
    fn hint(&self) -> Option<String> {
        None
    }
}

impl Report for EntryIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        format!("\"{}\" {}", self.id, self.message)
    }

    fn report_severity(&self) -> Severity {
        self.severity
    }

    fn report_rule(&self) -> Rule {
        self.rule
    }

    fn details(&self) -> Option<String> {
        self.value.as_ref().map(|value| format!("value: {}", value))
    }

    fn hint(&self) -> Option<String> {
        if self.fix_actions.is_empty() {
            return None;
        }
        let actions: Vec<&str> = self.fix_actions.iter().map(|a| a.id.as_str()).collect();
        Some(format!(
            "ngi18n fix --id '{}' --index {} --action <{}>",
            self.id,
            self.index,
            actions.join("|")
        ))
    }
}

impl Report for ReadErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn report_rule(&self) -> Rule {
        Rule::ReadError
    }
}
