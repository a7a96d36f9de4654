//! Error handling for the Propval CLI.
//!
//! Structured errors with suggestions, error chaining and exit-code mapping.

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use propval_core::error::PropvalError;

pub use propval_core::error::ErrorCategory as CoreCategory;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// The script file is not a well-formed script.
    #[error("Invalid script {path}: {message}")]
    InvalidScript {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Static checks found problems in the script.
    #[error("Script {path} has {issues} problem(s)")]
    ScriptRejected { path: PathBuf, issues: usize },

    /// A step could not be applied to the session.
    #[error("Step {index} ({op}) failed: {source}")]
    StepFailed {
        index: usize,
        op: &'static str,
        #[source]
        source: PropvalError,
    },

    /// A step carried data the adapters refused.
    #[error("Step {index} ({op}) rejected: {message}")]
    StepRejected {
        index: usize,
        op: &'static str,
        message: String,
    },

    /// Replay finished but some expectations did not hold.
    #[error("{failed} of {total} expectation(s) failed")]
    ExpectationsFailed { failed: usize, total: usize },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `propval-core` outside of a script step.
    #[error("Validation session error: {0}")]
    Core(#[from] PropvalError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// User-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::ScriptNotFound { path } => vec![
                format!("No file at '{}'", path.display()),
                "Paths are resolved relative to the current directory".into(),
            ],

            Self::InvalidScript { .. } => vec![
                "A script is a JSON object: { \"steps\": [ { \"op\": \"mount\", ... } ] }".into(),
                "Known ops: mount, unmount, server_error, remove_server_error, clear_server,"
                    .into(),
                "  reset_server, model_state, client, edit, saving, saved, expect".into(),
            ],

            Self::ScriptRejected { path, .. } => vec![
                "Fix the problems listed above".into(),
                format!("Re-run: propval check {}", path.display()),
            ],

            Self::StepFailed { source, .. } => {
                let mut suggestions = source.suggestions();
                suggestions.push("Run 'propval check' on the script to catch this early".into());
                suggestions
            }

            Self::StepRejected { .. } => vec![
                "ModelState payloads map keys to arrays of message strings".into(),
                "Property keys look like \"_Properties.<alias>\" or \"_Properties.<alias>.<field>\""
                    .into(),
            ],

            Self::ExpectationsFailed { .. } => vec![
                "Compare the expected and actual values listed above".into(),
                "Use --format json to see every field snapshot".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                "Inspect the active file with 'propval config path'".into(),
                "Environment overrides use the PROPVAL__SECTION__KEY form".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],
        }
    }

    /// Error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ScriptNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidScript { .. } => ErrorCategory::UserError,
            Self::ScriptRejected { .. } => ErrorCategory::UserError,
            Self::StepFailed { source, .. } => core_category(source),
            Self::StepRejected { .. } => ErrorCategory::UserError,
            Self::ExpectationsFailed { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => core_category(core),
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`].
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

fn core_category(err: &PropvalError) -> ErrorCategory {
    match err.category() {
        CoreCategory::Validation | CoreCategory::Misuse => ErrorCategory::UserError,
        CoreCategory::NotFound => ErrorCategory::NotFound,
        CoreCategory::Configuration => ErrorCategory::Configuration,
        CoreCategory::Internal => ErrorCategory::Internal,
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Convert foreign errors into [`CliError`] with a context message.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, PropvalError> {
    /// Core errors already carry their context; the message is dropped.
    fn with_cli_context<F, S>(self, _f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(CliError::Core)
    }
}
