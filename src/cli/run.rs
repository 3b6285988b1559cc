//! Dispatches a parsed command to its handler.
//!
//! Long-running commands (`watch`, `serve`) do not produce a
//! [`CommandResult`] and are handled before this point.

use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::CommandResult,
    commands::{check::check, fix::fix, init::init, list::list, locate::locate},
};

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::List(cmd)) => list(cmd),
        Some(Command::Locate(cmd)) => locate(cmd),
        Some(Command::Fix(cmd)) => fix(cmd),
        Some(Command::Init(cmd)) => init(cmd),
        Some(Command::Watch(_)) | Some(Command::Serve) => {
            bail!("Long-running commands should be handled before run()")
        }
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
