use anyhow::Result;

use super::{CommandResult, CommandSummary, ListEntry, ListSummary, Usage};
use crate::{
    cli::args::ListCommand,
    core::{ByIdRecord, ProjectContext},
};

pub fn list(cmd: ListCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::load(&cmd.common.root)?;
    let report = ctx.scan();
    let snapshot = ctx.aggregator.snapshot();

    let entries = snapshot
        .by_id
        .iter()
        .filter(|(id, _)| cmd.prefix.as_deref().is_none_or(|prefix| id.starts_with(prefix)))
        .map(|(id, records)| ListEntry {
            id: id.clone(),
            values: distinct_values(records),
            usages: records
                .iter()
                .map(|entry| {
                    let start = entry.record.id_span.start;
                    Usage {
                        file: ctx.display_path(&entry.file),
                        line: start.line + 1,
                        col: start.col + 1,
                    }
                })
                .collect(),
        })
        .collect();

    let mut result = CommandResult::new(CommandSummary::List(ListSummary { entries }));
    result.read_error_count = report.failures.len();
    Ok(result)
}

fn distinct_values(records: &[ByIdRecord]) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in records.iter().filter_map(ByIdRecord::value) {
        if !values.iter().any(|known| known == value) {
            values.push(value.to_string());
        }
    }
    values
}
