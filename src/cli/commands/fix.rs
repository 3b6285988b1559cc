use anyhow::{Context, Result, bail};

use super::{CommandResult, CommandSummary, FixSummary};
use crate::{
    actions::{FixAction, apply_fix},
    cli::args::FixCommand,
    core::{ProjectContext, ValidationSummary},
    issues::Issue,
};

pub fn fix(cmd: FixCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::load(&cmd.common.root)?;
    let report = ctx.scan();
    let annotated = ctx.validate();

    let (Some(id), Some(index), Some(action_id)) = (&cmd.id, cmd.index, &cmd.action) else {
        let fixable: Vec<Issue> = ctx
            .issues(&annotated, &[])
            .into_iter()
            .filter(|issue| matches!(issue, Issue::Entry(entry) if !entry.fix_actions.is_empty()))
            .collect();
        return Ok(CommandResult::with_issues(
            CommandSummary::Fix(FixSummary::Listed {
                fixable: fixable.len(),
            }),
            fixable,
            report.failures.len(),
        ));
    };

    let entry = ProjectContext::entry(&annotated, id, index)
        .with_context(|| format!("No record '{}' at index {}", id, index))?;
    let Some(fixer) = &entry.record.fixer else {
        bail!("No fix available for '{}' at index {}", id, index);
    };
    let action = fixer
        .actions()
        .into_iter()
        .find(|action| &action.id == action_id)
        .unwrap_or_else(|| FixAction::new(action_id, action_id));

    if !cmd.apply {
        let operations = fixer
            .plan(action_id)?
            .into_iter()
            .map(|mut op| {
                op.file_path = ctx.display_path(&op.file_path);
                op
            })
            .collect();
        return Ok(CommandResult::new(CommandSummary::Fix(FixSummary::Preview {
            action,
            operations,
        })));
    }

    let stats = apply_fix(entry, action_id)?;
    for file in &stats.files_modified {
        ctx.aggregator.on_file_changed(file)?;
    }
    let remaining = ValidationSummary::from_index(&ctx.validate()).total();

    Ok(CommandResult::new(CommandSummary::Fix(FixSummary::Applied {
        action,
        stats,
        remaining,
    })))
}
