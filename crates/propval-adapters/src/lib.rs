//! Infrastructure adapters for Propval.
//!
//! This crate implements the ports defined in `propval-core::application::ports`.

pub mod form;
pub mod registry;

// Re-export commonly used adapters
pub use form::MemoryForm;
pub use registry::{InMemoryRegistry, ModelStateError};
