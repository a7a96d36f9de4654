//! Event scripts: a JSON list of editor and server events plus expectations.
//!
//! ```json
//! {
//!   "name": "resubmit after edit",
//!   "steps": [
//!     { "op": "mount", "property": "title" },
//!     { "op": "server_error", "property": "title", "message": "Name is required" },
//!     { "op": "expect", "property": "title", "message": "Name is required" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use propval_core::domain::PropertyIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{CliError, CliResult, IntoCli};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<Step>,
}

fn default_control() -> String {
    "value".into()
}

fn default_validator() -> String {
    "required".into()
}

/// One script step, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Mount {
        property: PropertyIdentity,
    },
    Unmount {
        property: PropertyIdentity,
    },
    /// The server reported an error for a property (or one of its fields).
    ServerError {
        property: PropertyIdentity,
        #[serde(default)]
        field: String,
        message: String,
    },
    RemoveServerError {
        property: PropertyIdentity,
        #[serde(default)]
        field: String,
    },
    ClearServer {
        property: PropertyIdentity,
    },
    /// Forget every server error without notifying fields.
    ResetServer,
    /// A raw `ModelState` object from a save response.
    ModelState {
        payload: serde_json::Value,
    },
    /// A client-side validator on one control changed outcome.
    Client {
        property: PropertyIdentity,
        #[serde(default = "default_control")]
        control: String,
        #[serde(default = "default_validator")]
        validator: String,
        valid: bool,
    },
    /// The user typed a new value.
    Edit {
        property: PropertyIdentity,
        value: serde_json::Value,
    },
    Saving,
    Saved,
    Expect(Expectation),
}

/// Assertions checked against the session at this point of the replay.
///
/// Field assertions need `property`; `submittable` is session-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showing_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_validation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submittable: Option<bool>,
}

impl Expectation {
    fn has_field_assertions(&self) -> bool {
        self.message.is_some()
            || self.showing_error.is_some()
            || self.valid.is_some()
            || self.show_validation.is_some()
    }

    fn is_empty(&self) -> bool {
        !self.has_field_assertions() && self.submittable.is_none()
    }
}

impl Step {
    /// The `op` tag, for logs and transcripts.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Mount { .. } => "mount",
            Self::Unmount { .. } => "unmount",
            Self::ServerError { .. } => "server_error",
            Self::RemoveServerError { .. } => "remove_server_error",
            Self::ClearServer { .. } => "clear_server",
            Self::ResetServer => "reset_server",
            Self::ModelState { .. } => "model_state",
            Self::Client { .. } => "client",
            Self::Edit { .. } => "edit",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Expect(_) => "expect",
        }
    }

    /// Property this step targets, if any.
    pub fn property(&self) -> Option<&PropertyIdentity> {
        match self {
            Self::Mount { property }
            | Self::Unmount { property }
            | Self::ServerError { property, .. }
            | Self::RemoveServerError { property, .. }
            | Self::ClearServer { property }
            | Self::Client { property, .. }
            | Self::Edit { property, .. } => Some(property),
            Self::Expect(expectation) => expectation.property.as_ref(),
            Self::ResetServer | Self::ModelState { .. } | Self::Saving | Self::Saved => None,
        }
    }
}

/// A problem found by [`Script::check`]. `step` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptIssue {
    pub step: usize,
    pub message: String,
}

impl fmt::Display for ScriptIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: {}", self.step, self.message)
    }
}

impl Script {
    /// Read and parse a script file.
    #[instrument]
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::ScriptNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read {}", path.display()))?;
        let script = Self::parse(&contents).map_err(|e| CliError::InvalidScript {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        debug!(steps = script.steps.len(), "script loaded");
        Ok(script)
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Problems that would make a replay fail or assert nothing.
    ///
    /// Mount state is tracked step by step, so a step aimed at a property
    /// that is not mounted at that point is reported.
    pub fn check(&self) -> Vec<ScriptIssue> {
        let mut issues = Vec::new();
        if self.steps.is_empty() {
            issues.push(ScriptIssue {
                step: 0,
                message: "script has no steps".into(),
            });
        }

        let mut mounted: HashSet<&PropertyIdentity> = HashSet::new();
        for (i, step) in self.steps.iter().enumerate() {
            let mut report = |message: String| {
                issues.push(ScriptIssue {
                    step: i + 1,
                    message,
                })
            };

            match step {
                Step::Mount { property } => {
                    if !mounted.insert(property) {
                        report(format!("'{property}' is already mounted"));
                    }
                }
                Step::Unmount { property } => {
                    if !mounted.remove(property) {
                        report(format!("'{property}' is not mounted"));
                    }
                }
                Step::Edit { property, .. } if !mounted.contains(property) => {
                    report(format!("edit targets '{property}', which is not mounted"));
                }
                Step::ModelState { payload } if !payload.is_object() => {
                    report("model_state payload must be a JSON object".into());
                }
                Step::Expect(expectation) => {
                    if expectation.is_empty() {
                        report("expect asserts nothing".into());
                    }
                    match &expectation.property {
                        Some(property) if !mounted.contains(property) => {
                            report(format!("expect targets '{property}', which is not mounted"));
                        }
                        None if expectation.has_field_assertions() => {
                            report("field assertions need a property".into());
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        issues
    }

    /// Number of `expect` steps.
    pub fn expectation_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Expect(_)))
            .count()
    }
}
