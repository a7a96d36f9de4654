//! `propval replay` - run an event script and report what each field shows.

use propval_core::application::FieldSnapshot;
use tracing::{info, instrument};

use crate::{
    cli::{ReplayArgs, ReplayFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    replay::{Replay, StepRecord, Transcript},
    script::{Script, Step},
};

#[instrument(skip_all, fields(script = %args.script.display()))]
pub fn execute(args: ReplayArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let format = match args.format {
        Some(format) => format,
        None => config.replay_format().map_err(|e| CliError::ConfigError {
            message: e.to_string(),
            source: None,
        })?,
    };
    let fallback = args
        .fallback_message
        .unwrap_or(config.presenter.fallback_message);
    if fallback.trim().is_empty() {
        return Err(CliError::InvalidInput {
            message: "--fallback-message must not be blank".into(),
            source: None,
        });
    }

    let script = Script::load(&args.script)?;
    if format == ReplayFormat::Human {
        for issue in script.check() {
            output.warning(&issue.to_string())?;
        }
    }

    info!(steps = script.steps.len(), %format, "replaying script");
    let transcript = Replay::new(&fallback, !args.unevaluated).run(&script)?;

    match format {
        ReplayFormat::Json => output.json(&transcript)?,
        ReplayFormat::Human => render_human(&output, &script, &transcript)?,
    }

    if transcript.failures > 0 {
        return Err(CliError::ExpectationsFailed {
            failed: transcript.failures,
            total: transcript.expectations,
        });
    }
    Ok(())
}

fn render_human(
    output: &OutputManager,
    script: &Script,
    transcript: &Transcript,
) -> std::io::Result<()> {
    let title = transcript.name.as_deref().unwrap_or("Replay");
    output.header(&format!("{title} (session {})", transcript.session))?;

    for (record, step) in transcript.steps.iter().zip(&script.steps) {
        let line = step_line(record);
        match step {
            Step::Expect(_) if record.passed() => output.success(&line)?,
            Step::Expect(_) => {
                output.error(&line)?;
                for m in &record.mismatches {
                    output.detail(&format!(
                        "        {}: expected {:?}, got {:?}",
                        m.what, m.expected, m.actual
                    ))?;
                }
            }
            _ => output.print(&line)?,
        }
        if let Some(field) = &record.field {
            output.detail(&format!("        {}", field_state(field)))?;
        }
    }

    output.print("")?;
    output.header("Fields:")?;
    if transcript.fields.is_empty() {
        output.print("  (none mounted)")?;
    }
    for field in &transcript.fields {
        let name = field
            .property
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_default();
        output.print(&format!("  {name:<20} {}", field_state(field)))?;
    }

    output.print("")?;
    output.print(&format!(
        "Submittable: {}",
        if transcript.submittable { "yes" } else { "no" }
    ))?;
    if transcript.failures == 0 {
        output.success(&format!(
            "{} expectation(s) passed",
            transcript.expectations
        ))?;
    }
    Ok(())
}

fn step_line(record: &StepRecord) -> String {
    let target = record
        .property
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default();
    format!("{:>4}  {:<20} {target}", record.index, record.op)
}

fn field_state(field: &FieldSnapshot) -> String {
    let message = if field.message.is_empty() {
        "(no message)".to_owned()
    } else {
        format!("{:?}", field.message)
    };
    format!(
        "{message}  valid={} gate={} client_invalid={} server_error={}",
        field.valid, field.show_validation, field.client_invalid, field.has_server_error
    )
}
