use anyhow::Result;

use super::{CheckSummary, CommandResult, CommandSummary};
use crate::{cli::args::CheckCommand, core::ProjectContext};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::load(&cmd.common.root)?;
    let report = ctx.scan();
    if cmd.common.verbose {
        for failure in &report.failures {
            eprintln!("Failed to read {}: {}", ctx.display_path(&failure.file), failure.error);
        }
    }

    let annotated = ctx.validate();
    let issues = ctx.issues(&annotated, &report.failures);

    Ok(CommandResult::with_issues(
        CommandSummary::Check(CheckSummary {
            files_checked: report.files_scanned,
        }),
        issues,
        report.failures.len(),
    ))
}
