//! Driven (output) ports - implemented by infrastructure.
//!
//! The `propval-adapters` crate provides in-memory implementations.

use std::sync::Arc;

use crate::domain::{
    PropertyIdentity, SubscriptionHandle, SubscriptionKey, ValidationError, ValidationNotice,
};
use crate::error::PropvalResult;

/// Callback invoked by the registry whenever the error set for a key changes.
pub type ValidationCallback = Arc<dyn Fn(&ValidationNotice) + Send + Sync>;

/// Port for the process-wide store of server validation errors.
///
/// Implemented by:
/// - `propval_adapters::InMemoryRegistry`
///
/// ## Contract
///
/// - `unsubscribe` and `remove` are idempotent
/// - a removed handle never receives another notice
/// - a notice for a key with no subscribers is dropped silently
pub trait ServerValidationRegistry: Send + Sync {
    /// Register a callback for a key.
    fn subscribe(
        &self,
        key: SubscriptionKey,
        callback: ValidationCallback,
    ) -> PropvalResult<SubscriptionHandle>;

    /// Remove every subscription registered at `key`.
    fn unsubscribe(&self, key: &SubscriptionKey) -> PropvalResult<()>;

    /// Remove one subscription.
    fn remove(&self, handle: SubscriptionHandle) -> PropvalResult<()>;

    /// First stored error at exactly `(property, field_name)`.
    fn property_error(&self, property: &PropertyIdentity, field_name: &str)
    -> Option<ValidationError>;

    /// Whether any server error is currently stored.
    fn has_errors(&self) -> bool;
}

/// Port for the rendering layer's form validity aggregate.
///
/// Implemented by:
/// - `propval_adapters::MemoryForm`
#[cfg_attr(test, mockall::automock)]
pub trait FormValidity: Send + Sync {
    /// Aggregate validity; `None` until the form has been evaluated.
    fn validity(&self) -> Option<bool>;

    /// Whether the named validator is failing on any property.
    fn is_validator_failing(&self, validator: &str) -> bool;

    /// Whether any client-side control in the property's group is invalid.
    fn group_has_invalid(&self, property: &PropertyIdentity) -> bool;

    /// Set a named custom validity slot for one property.
    fn set_validity(
        &self,
        validator: &str,
        property: &PropertyIdentity,
        valid: bool,
    ) -> PropvalResult<()>;
}
