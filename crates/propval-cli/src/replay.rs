//! Replays a [`Script`] against an edit session wired to in-memory adapters.

use std::sync::Arc;

use propval_adapters::{InMemoryRegistry, MemoryForm, ModelStateError};
use propval_core::{
    application::{ApplicationError, EditSession, FieldSnapshot},
    domain::PropertyIdentity,
    error::{PropvalError, PropvalResult},
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{CliError, CliResult, IntoCli},
    script::{Expectation, Script, Step},
};

/// One assertion that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub what: &'static str,
    pub expected: String,
    pub actual: String,
}

/// Outcome of one step. `index` is 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyIdentity>,
    /// The targeted field right after the step, while it is mounted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<Mismatch>,
}

impl StepRecord {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub session: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<StepRecord>,
    /// Every field still mounted at the end, in mount order.
    pub fields: Vec<FieldSnapshot>,
    pub submittable: bool,
    pub expectations: usize,
    pub failures: usize,
}

/// An edit session plus the adapters it runs on.
pub struct Replay {
    registry: InMemoryRegistry,
    form: MemoryForm,
    session: EditSession,
}

impl Replay {
    pub fn new(fallback_message: &str, evaluated: bool) -> Self {
        let registry = InMemoryRegistry::new();
        let form = if evaluated {
            MemoryForm::new()
        } else {
            MemoryForm::unevaluated()
        };
        let session = EditSession::new(Arc::new(registry.clone()), Arc::new(form.clone()))
            .with_fallback_message(fallback_message);
        Self {
            registry,
            form,
            session,
        }
    }

    /// Apply every step in order.
    ///
    /// A step the session rejects aborts the replay; failed expectations
    /// are collected and counted in the transcript.
    #[instrument(skip_all, fields(session = %self.session.id(), steps = script.steps.len()))]
    pub fn run(mut self, script: &Script) -> CliResult<Transcript> {
        let mut records = Vec::with_capacity(script.steps.len());

        for (i, step) in script.steps.iter().enumerate() {
            let index = i + 1;
            let op = step.op();
            debug!(index, op, property = ?step.property(), "applying step");

            let mismatches = self.apply(index, step)?;
            if !mismatches.is_empty() {
                warn!(index, failed = mismatches.len(), "expectation failed");
            }

            let property = step.property().cloned();
            let field = property
                .as_ref()
                .and_then(|p| self.session.presenter(p))
                .map(|presenter| presenter.snapshot());
            records.push(StepRecord {
                index,
                op,
                property,
                field,
                mismatches,
            });
        }

        let failures = records.iter().filter(|r| !r.passed()).count();
        let transcript = Transcript {
            session: self.session.id(),
            name: script.name.clone(),
            steps: records,
            fields: self.session.snapshots(),
            submittable: self.session.is_submittable(),
            expectations: script.expectation_count(),
            failures,
        };
        self.session
            .unmount_all()
            .with_cli_context(|| "releasing subscriptions")?;

        info!(
            expectations = transcript.expectations,
            failures, "replay finished"
        );
        Ok(transcript)
    }

    fn apply(&mut self, index: usize, step: &Step) -> CliResult<Vec<Mismatch>> {
        let op = step.op();
        let failed = |source: PropvalError| CliError::StepFailed { index, op, source };

        match step {
            Step::Mount { property } => {
                self.session.mount(property.clone()).map_err(failed)?;
            }
            Step::Unmount { property } => self.session.unmount(property).map_err(failed)?,
            Step::ServerError {
                property,
                field,
                message,
            } => self
                .registry
                .add_property_error(property, field, message.clone())
                .map_err(failed)?,
            Step::RemoveServerError { property, field } => {
                self.registry
                    .remove_property_error(property, field)
                    .map_err(failed)?;
            }
            Step::ClearServer { property } => {
                self.registry.clear_property(property).map_err(failed)?;
            }
            Step::ResetServer => self.registry.reset().map_err(failed)?,
            Step::ModelState { payload } => {
                self.registry
                    .load_model_state(payload)
                    .map_err(|e| match e {
                        ModelStateError::Registry(source) => failed(source),
                        other => CliError::StepRejected {
                            index,
                            op,
                            message: other.to_string(),
                        },
                    })?;
            }
            Step::Client {
                property,
                control,
                validator,
                valid,
            } => self
                .client(property, control, validator, *valid)
                .map_err(failed)?,
            Step::Edit { property, value } => {
                self.session.value_changed(property, value).map_err(failed)?
            }
            Step::Saving => self.session.saving().map_err(failed)?,
            Step::Saved => self.session.saved().map_err(failed)?,
            Step::Expect(expectation) => return self.expect(expectation).map_err(failed),
        }
        Ok(Vec::new())
    }

    fn client(
        &self,
        property: &PropertyIdentity,
        control: &str,
        validator: &str,
        valid: bool,
    ) -> PropvalResult<()> {
        self.form
            .set_control_validity(property, control, validator, valid)?;
        self.session.client_validity_changed()
    }

    fn expect(&self, expectation: &Expectation) -> PropvalResult<Vec<Mismatch>> {
        let mut mismatches = Vec::new();
        let mut check = |what: &'static str, expected: Option<String>, actual: String| {
            if let Some(expected) = expected {
                if expected != actual {
                    mismatches.push(Mismatch {
                        what,
                        expected,
                        actual,
                    });
                }
            }
        };

        if let Some(property) = &expectation.property {
            let snapshot = self
                .session
                .presenter(property)
                .ok_or_else(|| ApplicationError::UnknownProperty {
                    property: property.to_string(),
                })?
                .snapshot();

            check("message", expectation.message.clone(), snapshot.message);
            check(
                "showing_error",
                expectation.showing_error.map(|b| b.to_string()),
                snapshot.showing_error.to_string(),
            );
            check(
                "valid",
                expectation.valid.map(|b| b.to_string()),
                snapshot.valid.to_string(),
            );
            check(
                "show_validation",
                expectation.show_validation.map(|b| b.to_string()),
                snapshot.show_validation.to_string(),
            );
        }
        check(
            "submittable",
            expectation.submittable.map(|b| b.to_string()),
            self.session.is_submittable().to_string(),
        );
        Ok(mismatches)
    }
}
