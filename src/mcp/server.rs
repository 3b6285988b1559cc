use std::{collections::BTreeMap, path::Path};

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use crate::{
    actions::apply_fix,
    core::{
        AnnotatedIndex, ProjectContext, ScanReport, ValidationSummary,
        parsers::html::Position,
        query::{SpanTarget, locate_in_file},
    },
    issues::EntryIssue,
};

use super::types::{
    ApplyFixParams, ApplyFixResult, EntryItem, ListEntriesParams, ListEntriesResult,
    LocateParams, LocateResult, LocateTarget, Pagination, PositionDto, RuleCount,
    ScanOverviewParams, ScanOverviewResult,
};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Clone)]
pub struct Ngi18nMcpServer {
    tool_router: ToolRouter<Self>,
}

impl Default for Ngi18nMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

fn load_project(project_root_path: &str) -> Result<(ProjectContext, ScanReport), McpError> {
    let ctx = ProjectContext::load(Path::new(project_root_path))
        .map_err(|e| McpError::internal_error(format!("Failed to initialize: {:#}", e), None))?;
    let report = ctx.scan();
    Ok((ctx, report))
}

fn to_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}

fn entry_items(ctx: &ProjectContext, annotated: &AnnotatedIndex) -> Vec<EntryItem> {
    let mut items: Vec<EntryItem> = annotated
        .values()
        .flat_map(|records| {
            records
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| EntryIssue::from_record(entry, index))
        })
        .map(|issue| EntryItem {
            file_path: ctx.display_path(&issue.context.location.file_path),
            line: issue.context.location.line,
            col: issue.context.location.col,
            id: issue.id,
            index: issue.index,
            occurrence: issue.occurrence,
            value: issue.value,
            severity: issue.severity,
            rule: issue.rule.to_string(),
            message: issue.message,
            fix_actions: issue.fix_actions,
        })
        .collect();
    items.sort_by(|a, b| (&a.file_path, a.line, a.col).cmp(&(&b.file_path, b.line, b.col)));
    items
}

fn position_dto(position: Position) -> PositionDto {
    PositionDto {
        line: position.line + 1,
        col: position.col + 1,
        offset: position.offset,
    }
}

#[tool_router]
impl Ngi18nMcpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Get overview statistics of the project's i18n records
    #[tool(
        description = "Scan all Angular templates and return record counts and problem statistics by rule. Use this first to understand the overall state."
    )]
    async fn scan_overview(
        &self,
        params: Parameters<ScanOverviewParams>,
    ) -> Result<CallToolResult, McpError> {
        let (ctx, report) = load_project(&params.0.project_root_path)?;
        let snapshot = ctx.aggregator.snapshot();
        let annotated = ctx.validate();
        let summary = ValidationSummary::from_index(&annotated);

        let mut by_rule: BTreeMap<String, usize> = BTreeMap::new();
        for finding in annotated
            .values()
            .flatten()
            .filter_map(|entry| entry.record.finding())
        {
            *by_rule.entry(finding.rule.to_string()).or_default() += 1;
        }

        let overview = ScanOverviewResult {
            config_from_file: ctx.config_path.is_some(),
            files_scanned: report.files_scanned,
            read_error_count: report.failures.len(),
            identifier_count: snapshot.by_id.len(),
            record_count: snapshot.record_count(),
            error_count: summary.errors,
            warning_count: summary.warnings,
            by_rule: by_rule
                .into_iter()
                .map(|(rule, count)| RuleCount { rule, count })
                .collect(),
        };

        to_result(&overview)
    }

    /// List flagged records with their fix actions
    #[tool(
        description = "List flagged i18n records (paginated), optionally filtered by severity or identifier prefix. Each item carries the id, index and fix actions needed by apply_fix."
    )]
    async fn list_entries(
        &self,
        params: Parameters<ListEntriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let limit = params
            .limit
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let offset = params.offset.map(|v| v as usize).unwrap_or(0);

        let (ctx, _) = load_project(&params.project_root_path)?;
        let annotated = ctx.validate();
        let all_items: Vec<EntryItem> = entry_items(&ctx, &annotated)
            .into_iter()
            .filter(|item| params.severity.is_none_or(|severity| item.severity == severity))
            .filter(|item| {
                params
                    .id_prefix
                    .as_deref()
                    .is_none_or(|prefix| item.id.starts_with(prefix))
            })
            .collect();

        let total_count = all_items.len();
        let items: Vec<EntryItem> = all_items.into_iter().skip(offset).take(limit).collect();
        let has_more = offset + items.len() < total_count;

        to_result(&ListEntriesResult {
            total_count,
            items,
            pagination: Pagination {
                offset,
                limit,
                has_more,
            },
        })
    }

    /// Locate an identifier occurrence in a template
    #[tool(
        description = "Return the source range of the n-th occurrence of an identifier in a template, either the identifier itself or its translated content."
    )]
    async fn locate(&self, params: Parameters<LocateParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let root = Path::new(&params.project_root_path);
        let file = Path::new(&params.file_path);
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            root.join(file)
        };
        let target = match params.target.unwrap_or_default() {
            LocateTarget::Id => SpanTarget::Id,
            LocateTarget::Content => SpanTarget::Content,
        };

        let span = locate_in_file(&path, &params.id, params.occurrence.unwrap_or(0), target)
            .map_err(|e| McpError::internal_error(format!("Locate failed: {:#}", e), None))?;

        to_result(&LocateResult {
            found: span.is_some(),
            start: span.map(|span| position_dto(span.start)),
            end: span.map(|span| position_dto(span.end)),
        })
    }

    /// Apply a fix action to a flagged record
    #[tool(
        description = "Apply one fix action to a flagged record, identified by id and index from list_entries. Rewrites the affected templates and returns the remaining problem count."
    )]
    async fn apply_fix(
        &self,
        params: Parameters<ApplyFixParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let (ctx, _) = load_project(&params.project_root_path)?;
        let annotated = ctx.validate();

        let entry = ProjectContext::entry(&annotated, &params.id, params.index).ok_or_else(|| {
            McpError::invalid_params(
                format!("No record '{}' at index {}", params.id, params.index),
                None,
            )
        })?;
        let action = entry
            .record
            .fixer
            .as_ref()
            .and_then(|fixer| {
                fixer
                    .actions()
                    .into_iter()
                    .find(|action| action.id == params.action)
            })
            .ok_or_else(|| {
                McpError::invalid_params(
                    format!(
                        "Action '{}' is not available for '{}' at index {}",
                        params.action, params.id, params.index
                    ),
                    None,
                )
            })?;

        let stats = apply_fix(entry, &params.action)
            .map_err(|e| McpError::internal_error(format!("Fix failed: {:#}", e), None))?;
        for file in &stats.files_modified {
            ctx.aggregator.on_file_changed(file).map_err(|e| {
                McpError::internal_error(format!("Re-index failed: {:#}", e), None)
            })?;
        }
        let remaining_problems = ValidationSummary::from_index(&ctx.validate()).total();

        to_result(&ApplyFixResult {
            action,
            changes_applied: stats.changes_applied,
            files_modified: stats
                .files_modified
                .iter()
                .map(|file| ctx.display_path(file))
                .collect(),
            remaining_problems,
        })
    }
}

#[tool_handler]
impl ServerHandler for Ngi18nMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "ngi18n MCP helps AI agents review and fix i18n markup in Angular templates.\n\n\
                 Available tools:\n\
                 1. scan_overview - Get record counts and problem statistics by rule\n\
                 2. list_entries - Get flagged records with their fix actions (paginated)\n\
                 3. locate - Get the source range of an identifier occurrence\n\
                 4. apply_fix - Apply one fix action to a flagged record\n\n\
                 Recommended Workflow:\n\
                 1. Use scan_overview to understand the overall state\n\
                 2. Use list_entries to get records and their fix actions\n\
                 3. Apply fixes one at a time; indices can shift after each fix, so list again before the next one"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Entry point for MCP server
pub fn run_server() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let service = Ngi18nMcpServer::new();
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
            Ok(())
        })
}
