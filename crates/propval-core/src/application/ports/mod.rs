//! Application ports (traits) for external collaborators.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the presenters, implemented by infrastructure
//!   - `ServerValidationRegistry`: server-reported errors and subscriptions
//!   - `FormValidity`: the rendering layer's form validity aggregate
//!
//! - **Driving (Input) Ports**: the presenter and session methods themselves,
//!   called by the rendering layer

pub mod output;

#[cfg(test)]
pub use output::MockFormValidity;
pub use output::{FormValidity, ServerValidationRegistry, ValidationCallback};
