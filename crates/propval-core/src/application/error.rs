//! Application layer errors.
//!
//! These errors represent lifecycle misuse and infrastructure failures, not
//! validation outcomes. Validation outcomes are state, never errors.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while orchestrating presenters and sessions.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A presenter was mounted twice without an unmount in between.
    #[error("Presenter for '{property}' is already mounted")]
    AlreadyMounted { property: String },

    /// An event reached a presenter that is not mounted.
    #[error("Presenter is not mounted")]
    NotMounted,

    /// The session has no mounted field for this property.
    #[error("No mounted field for property '{property}'")]
    UnknownProperty { property: String },

    /// The session already has a mounted field for this property.
    #[error("Property '{property}' is already mounted in this session")]
    DuplicateProperty { property: String },

    /// Presenter state lock was poisoned.
    #[error("Presenter state is unavailable")]
    StateLockError,

    /// Registry lock was poisoned.
    #[error("Server validation registry is unavailable")]
    RegistryLockError,

    /// Form aggregate lock was poisoned.
    #[error("Form validity aggregate is unavailable")]
    FormLockError,

    /// The registry refused a subscription.
    #[error("Subscription to '{key}' failed: {reason}")]
    SubscriptionFailed { key: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::AlreadyMounted { property } => vec![
                format!("'{}' already has a live subscription", property),
                "Unmount the field before mounting it again".into(),
            ],
            Self::NotMounted => vec![
                "Mount the field before sending it lifecycle events".into(),
            ],
            Self::UnknownProperty { property } => vec![
                format!("'{}' was never mounted or was already unmounted", property),
                "Check the order of mount and unmount steps".into(),
            ],
            Self::DuplicateProperty { property } => vec![
                format!("'{}' is mounted twice in the same session", property),
                "Each property may be mounted once per edit session".into(),
            ],
            Self::StateLockError | Self::RegistryLockError | Self::FormLockError => vec![
                "A previous callback panicked while holding a lock".into(),
                "Recreate the edit session".into(),
            ],
            Self::SubscriptionFailed { .. } => vec!["Check the registry configuration".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyMounted { .. } | Self::NotMounted | Self::DuplicateProperty { .. } => {
                ErrorCategory::Misuse
            }
            Self::UnknownProperty { .. } => ErrorCategory::NotFound,
            Self::StateLockError | Self::RegistryLockError | Self::FormLockError => {
                ErrorCategory::Internal
            }
            Self::SubscriptionFailed { .. } => ErrorCategory::Internal,
        }
    }
}
