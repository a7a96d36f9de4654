use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through registry notices)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid property identity '{value}': {reason}")]
    InvalidPropertyIdentity { value: String, reason: String },

    #[error("Invalid field name '{value}': {reason}")]
    InvalidFieldName { value: String, reason: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPropertyIdentity { value, reason } => vec![
                format!("'{}' cannot identify a property: {}", value, reason),
                "Use the property alias as it appears on the content type".into(),
                "Examples: title, bodyText, metaDescription".into(),
            ],
            Self::InvalidFieldName { value, .. } => vec![
                format!("Field name '{}' was rejected", value),
                "Leave the field name empty to address the whole property".into(),
            ],
            Self::MissingRequiredField { field } => {
                vec![format!("Provide a value for '{}'", field)]
            }
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPropertyIdentity { .. }
            | Self::InvalidFieldName { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
