//! Ingestion of server `ModelState` payloads.
//!
//! ```json
//! {
//!   "_Properties.title": ["Name is required"],
//!   "_Properties.price.amount": ["Must be positive"],
//!   "Name": ["Name cannot be empty"]
//! }
//! ```

use propval_core::{
    domain::{DomainError, PropertyIdentity, ValidationError},
    error::PropvalError,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use super::InMemoryRegistry;

const PROPERTIES_PREFIX: &str = "_Properties.";

#[derive(Debug, Error)]
pub enum ModelStateError {
    #[error("ModelState payload must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("ModelState entry '{key}' must be an array of strings")]
    InvalidMessages { key: String },

    #[error("ModelState key '{key}' does not name a property: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: DomainError,
    },

    #[error(transparent)]
    Registry(#[from] PropvalError),
}

/// Property and field named by a ModelState key.
fn split_key(key: &str) -> Result<(PropertyIdentity, String), ModelStateError> {
    let (alias, field) = match key.strip_prefix(PROPERTIES_PREFIX) {
        Some(rest) => rest.split_once('.').unwrap_or((rest, "")),
        None => (key, ""),
    };
    let property = PropertyIdentity::new(alias).map_err(|source| ModelStateError::InvalidKey {
        key: key.to_owned(),
        source,
    })?;
    Ok((property, field.to_owned()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a payload into registry entries, ordered by key.
pub fn parse_model_state(
    payload: &Value,
) -> Result<Vec<(PropertyIdentity, ValidationError)>, ModelStateError> {
    let map = payload.as_object().ok_or(ModelStateError::NotAnObject {
        found: json_kind(payload),
    })?;

    let mut entries = Vec::new();
    for (key, messages) in map {
        let (property, field) = split_key(key)?;
        let messages = messages
            .as_array()
            .ok_or_else(|| ModelStateError::InvalidMessages { key: key.clone() })?;
        for message in messages {
            let message = message
                .as_str()
                .ok_or_else(|| ModelStateError::InvalidMessages { key: key.clone() })?;
            entries.push((property.clone(), ValidationError::new(field.clone(), message)));
        }
    }
    Ok(entries)
}

impl InMemoryRegistry {
    /// Store every error of a server `ModelState` payload.
    ///
    /// The payload is validated as a whole first; a malformed payload
    /// stores nothing. Returns the number of messages read.
    #[instrument(skip_all)]
    pub fn load_model_state(&self, payload: &Value) -> Result<usize, ModelStateError> {
        let entries = parse_model_state(payload)?;
        for (property, error) in &entries {
            self.add_property_error(property, &error.field_name, error.message.clone())?;
        }
        debug!(messages = entries.len(), "model state loaded");
        Ok(entries.len())
    }
}
