//! `propval check` - static validation of an event script.

use tracing::instrument;

use crate::{
    cli::CheckArgs,
    error::{CliError, CliResult},
    output::OutputManager,
    script::Script,
};

#[instrument(skip_all, fields(script = %args.script.display()))]
pub fn execute(args: CheckArgs, output: OutputManager) -> CliResult<()> {
    let script = Script::load(&args.script)?;
    let issues = script.check();

    if issues.is_empty() {
        output.success(&format!(
            "{} is valid ({} steps, {} expectations)",
            args.script.display(),
            script.steps.len(),
            script.expectation_count()
        ))?;
        return Ok(());
    }

    for issue in &issues {
        output.error(&issue.to_string())?;
    }
    Err(CliError::ScriptRejected {
        path: args.script,
        issues: issues.len(),
    })
}
