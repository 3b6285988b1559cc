use crate::{
    actions::{ActionStats, FixAction, Operation},
    cli::exit_status::ExitStatus,
    core::{parsers::html::Span, query::SpanTarget},
    issues::{Issue, Report, Severity},
};

#[derive(Debug)]
pub enum CommandSummary {
    Check(CheckSummary),
    List(ListSummary),
    Locate(LocateSummary),
    Fix(FixSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct CheckSummary {
    pub files_checked: usize,
}

/// One usage of an identifier, 1-based for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    /// Distinct values in first-seen order.
    pub values: Vec<String>,
    pub usages: Vec<Usage>,
}

#[derive(Debug)]
pub struct ListSummary {
    pub entries: Vec<ListEntry>,
}

#[derive(Debug)]
pub struct LocateSummary {
    pub file: String,
    pub id: String,
    pub occurrence: usize,
    pub target: SpanTarget,
    pub span: Option<Span>,
}

#[derive(Debug)]
pub enum FixSummary {
    /// No entry selected: every record that has fix actions.
    Listed { fixable: usize },
    /// Dry run of one action.
    Preview {
        action: FixAction,
        operations: Vec<Operation>,
    },
    Applied {
        action: FixAction,
        stats: ActionStats,
        /// Problems left after re-indexing the modified files.
        remaining: usize,
    },
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: String,
    pub created: bool,
}

/// Result of running ngi18n commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// Issues to print before the summary.
    pub issues: Vec<Issue>,
    /// Number of templates that could not be read.
    pub read_error_count: usize,
}

impl CommandResult {
    pub fn new(summary: CommandSummary) -> Self {
        Self {
            summary,
            error_count: 0,
            warning_count: 0,
            issues: Vec::new(),
            read_error_count: 0,
        }
    }

    /// Result carrying issues; severities are counted from `issues`.
    pub fn with_issues(summary: CommandSummary, issues: Vec<Issue>, read_error_count: usize) -> Self {
        let error_count = issues
            .iter()
            .filter(|issue| issue.report_severity() == Severity::Error)
            .count();
        Self {
            summary,
            error_count,
            warning_count: issues.len() - error_count,
            issues,
            read_error_count,
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        let failed = match &self.summary {
            CommandSummary::Check(_) => self.error_count + self.warning_count > 0,
            CommandSummary::List(_) => false,
            CommandSummary::Locate(summary) => summary.span.is_none(),
            CommandSummary::Fix(FixSummary::Listed { fixable }) => *fixable > 0,
            CommandSummary::Fix(FixSummary::Preview { operations, .. }) => !operations.is_empty(),
            CommandSummary::Fix(FixSummary::Applied { .. }) => false,
            CommandSummary::Init(summary) => !summary.created,
        };
        ExitStatus::failure_if(failed)
    }
}
