use anyhow::Result;

use super::{CommandResult, CommandSummary, LocateSummary};
use crate::{
    cli::args::LocateCommand,
    core::query::{SpanTarget, locate_in_file},
};

pub fn locate(cmd: LocateCommand) -> Result<CommandResult> {
    let path = if cmd.file.is_absolute() {
        cmd.file.clone()
    } else {
        cmd.common.root.join(&cmd.file)
    };
    let target = if cmd.content {
        SpanTarget::Content
    } else {
        SpanTarget::Id
    };

    let span = locate_in_file(&path, &cmd.id, cmd.occurrence, target)?;

    Ok(CommandResult::new(CommandSummary::Locate(LocateSummary {
        file: cmd.file.display().to_string(),
        id: cmd.id,
        occurrence: cmd.occurrence,
        target,
        span,
    })))
}
