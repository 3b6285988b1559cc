use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, InitSummary};
use crate::{
    cli::args::InitCommand,
    config::{CONFIG_FILE_NAME, default_config_json},
};

pub fn init(cmd: InitCommand) -> Result<CommandResult> {
    let config_path = cmd.common.root.join(CONFIG_FILE_NAME);
    let path = if cmd.common.root == Path::new(".") {
        CONFIG_FILE_NAME.to_string()
    } else {
        config_path.display().to_string()
    };

    if config_path.exists() {
        return Ok(CommandResult::new(CommandSummary::Init(InitSummary {
            path,
            created: false,
        })));
    }

    fs::write(&config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", path))?;
    Ok(CommandResult::new(CommandSummary::Init(InitSummary {
        path,
        created: true,
    })))
}
