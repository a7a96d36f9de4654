//! Application services - orchestrate the field lifecycle.
//!
//! A presenter binds one mounted field to the registry and the form; a
//! session owns the presenters of one content item and broadcasts save
//! lifecycle events to all of them.

pub mod edit_session;
pub mod presenter;

#[cfg(test)]
pub(crate) mod testing;

pub use edit_session::EditSession;
pub use presenter::{FieldSnapshot, ValidationMessagePresenter};
