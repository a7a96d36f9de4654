//! Propval Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for coordinating
//! property-level validation messages in a content editor, following
//! hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     rendering layer / propval-cli       │
//! │   (mounts fields, reports save events)  │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ValidationMessagePresenter, EditSession)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (ServerValidationRegistry, FormValidity)│
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    propval-adapters (Infrastructure)    │
//! │      (InMemoryRegistry, MemoryForm)     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (FieldValidationState, PropertyIdentity)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use propval_core::{application::EditSession, domain::PropertyIdentity};
//!
//! // registry: Arc<dyn ServerValidationRegistry>, form: Arc<dyn FormValidity>
//! let mut session = EditSession::new(registry, form);
//! let title = PropertyIdentity::new("title").unwrap();
//! session.mount(title.clone()).unwrap();
//!
//! session.saving().unwrap();
//! println!("{}", session.presenter(&title).unwrap().current_message());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        EditSession, FieldSnapshot, ValidationMessagePresenter,
        ports::{FormValidity, ServerValidationRegistry, ValidationCallback},
    };
    pub use crate::domain::{
        ClientValidity, DEFAULT_FALLBACK_MESSAGE, FieldEvent, FieldValidationState,
        PropertyIdentity, SubscriptionHandle, SubscriptionKey, VALIDATOR_SLOT, ValidationError,
        ValidationNotice,
    };
    pub use crate::error::{PropvalError, PropvalResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
