use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, CommandSummary, extract::extract, init::init},
};

/// Dispatch a parsed command to its handler.
///
/// # Returns
/// - `Ok(CommandResult)` with what the command produced and how many files failed
/// - `Err` for configuration and invocation errors (bad config, missing paths)
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Languages) => Ok(CommandResult {
            summary: CommandSummary::Languages,
            failure_count: 0,
        }),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
