use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{actions::FixAction, issues::Severity};

// ============================================================
// Parameters
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanOverviewParams {
    /// Absolute path of the Angular project root
    pub project_root_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesParams {
    /// Absolute path of the Angular project root
    pub project_root_path: String,
    /// Only return records with this severity
    pub severity: Option<Severity>,
    /// Only return identifiers starting with this prefix
    pub id_prefix: Option<String>,
    /// Number of items to skip (default 0)
    pub offset: Option<u32>,
    /// Maximum items to return (default 20, max 100)
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocateTarget {
    /// The identifier inside the `i18n` attribute
    #[default]
    Id,
    /// The translated element content or attribute value
    Content,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocateParams {
    /// Absolute path of the Angular project root
    pub project_root_path: String,
    /// Template path, absolute or relative to the project root
    pub file_path: String,
    /// Translation identifier, e.g. "@@greeting"
    pub id: String,
    /// Zero-based occurrence of the identifier within the file (default 0)
    pub occurrence: Option<usize>,
    /// What to locate (default "id")
    pub target: Option<LocateTarget>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyFixParams {
    /// Absolute path of the Angular project root
    pub project_root_path: String,
    /// Identifier of the flagged record
    pub id: String,
    /// Position of the record among the identifier's records, as returned by list_entries
    pub index: usize,
    /// One of the record's fix action ids
    pub action: String,
}

// ============================================================
// Results
// ============================================================

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleCount {
    pub rule: String,
    pub count: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanOverviewResult {
    /// True if config was loaded from a file, false if using defaults
    pub config_from_file: bool,
    pub files_scanned: usize,
    pub read_error_count: usize,
    pub identifier_count: usize,
    pub record_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub by_rule: Vec<RuleCount>,
}

/// A single flagged record
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryItem {
    pub id: String,
    pub index: usize,
    pub occurrence: usize,
    pub file_path: String,
    pub line: usize,
    pub col: usize,
    pub value: Option<String>,
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub fix_actions: Vec<FixAction>,
}

/// Pagination information
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesResult {
    pub total_count: usize,
    pub items: Vec<EntryItem>,
    pub pagination: Pagination,
}

/// 1-based line and column plus byte offset
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub line: usize,
    pub col: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocateResult {
    pub found: bool,
    pub start: Option<PositionDto>,
    pub end: Option<PositionDto>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyFixResult {
    pub action: FixAction,
    pub changes_applied: usize,
    pub files_modified: Vec<String>,
    /// Problems left after re-indexing the modified files
    pub remaining_problems: usize,
}
