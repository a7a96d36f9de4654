// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Propval.
//!
//! Pure state reconciliation for one editable content property. Registry
//! access, form aggregation and subscriptions are reached through ports
//! defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: transitions are synchronous reactions to discrete events
//! - **No I/O**: stored server errors are handed in by the caller
//! - **Few external crates**: serde derives, thiserror and trace events only
//! - **Value objects**: identities and errors are immutable once built
//!
pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::field_state::{
    ClientValidity, DEFAULT_FALLBACK_MESSAGE, FieldEvent, FieldValidationState, VALIDATOR_SLOT,
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{
    PropertyIdentity, SubscriptionHandle, SubscriptionKey, ValidationError, ValidationNotice,
};
