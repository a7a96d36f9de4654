//! Application layer for Propval.
//!
//! This layer contains:
//! - **Services**: lifecycle orchestration (ValidationMessagePresenter, EditSession)
//! - **Ports**: interface definitions (traits) for the registry and the form
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! validation rules itself. All precedence rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{EditSession, FieldSnapshot, ValidationMessagePresenter};

pub use ports::{FormValidity, ServerValidationRegistry, ValidationCallback};

pub use error::ApplicationError;
