//! Value objects shared by the domain and the ports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

// ---------------------------------------------------------------------------
// PropertyIdentity
// ---------------------------------------------------------------------------

/// Stable key for one editable content property.
///
/// The identity is the join key between client state and server error state,
/// so it must be non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyIdentity(String);

impl PropertyIdentity {
    pub fn new(alias: impl Into<String>) -> Result<Self, DomainError> {
        let alias = alias.into();
        if alias.is_empty() {
            return Err(DomainError::InvalidPropertyIdentity {
                value: alias,
                reason: "identity must not be empty".into(),
            });
        }
        if alias.trim() != alias {
            return Err(DomainError::InvalidPropertyIdentity {
                value: alias,
                reason: "identity must not start or end with whitespace".into(),
            });
        }
        Ok(Self(alias))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PropertyIdentity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PropertyIdentity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PropertyIdentity> for String {
    fn from(id: PropertyIdentity) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// One server-reported validation failure.
///
/// An empty `field_name` means the error applies to the whole property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub field_name: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }

    /// Error addressed to the whole property rather than one of its fields.
    pub fn property_wide(message: impl Into<String>) -> Self {
        Self::new("", message)
    }

    pub fn is_property_wide(&self) -> bool {
        self.field_name.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_property_wide() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field_name, self.message)
        }
    }
}

// ---------------------------------------------------------------------------
// SubscriptionKey
// ---------------------------------------------------------------------------

/// Composite registry key: a property plus an optional field inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub property: PropertyIdentity,
    #[serde(default)]
    pub field_name: String,
}

impl SubscriptionKey {
    /// The property-level bucket (empty field name).
    pub fn property_level(property: PropertyIdentity) -> Self {
        Self {
            property,
            field_name: String::new(),
        }
    }

    /// A key addressing one named field of a property.
    ///
    /// Whitespace-only names are rejected because they would read as the
    /// property-level bucket while comparing unequal to it.
    pub fn field(
        property: PropertyIdentity,
        field_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let field_name = field_name.into();
        if !field_name.is_empty() && field_name.trim().is_empty() {
            return Err(DomainError::InvalidFieldName {
                value: field_name,
                reason: "field name must not be blank".into(),
            });
        }
        Ok(Self {
            property,
            field_name,
        })
    }

    pub fn is_property_level(&self) -> bool {
        self.field_name.is_empty()
    }

    /// Whether an error stored at `(property, field_name)` concerns this key.
    ///
    /// A property-level key sees every error of its property. A field key
    /// sees its own field plus property-wide errors.
    pub fn matches(&self, property: &PropertyIdentity, field_name: &str) -> bool {
        if &self.property != property {
            return false;
        }
        self.is_property_level() || field_name.is_empty() || self.field_name == field_name
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_property_level() {
            write!(f, "{}", self.property)
        } else {
            write!(f, "{}.{}", self.property, self.field_name)
        }
    }
}

// ---------------------------------------------------------------------------
// SubscriptionHandle
// ---------------------------------------------------------------------------

/// Opaque id for one registry subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ValidationNotice
// ---------------------------------------------------------------------------

/// Payload delivered to a registry subscriber when its error set changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationNotice {
    pub is_valid: bool,
    /// Errors matching the subscribed key, in insertion order.
    pub property_errors: Vec<ValidationError>,
    /// Every error the registry currently holds.
    pub all_errors: Vec<ValidationError>,
}

impl ValidationNotice {
    /// Build a notice whose verdict follows from the matching errors.
    pub fn from_errors(property_errors: Vec<ValidationError>, all_errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: property_errors.is_empty(),
            property_errors,
            all_errors,
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PropertyIdentity {
        PropertyIdentity::new(s).unwrap()
    }

    #[test]
    fn property_identity_rejects_empty_and_padded() {
        assert!(PropertyIdentity::new("").is_err());
        assert!(PropertyIdentity::new(" title").is_err());
        assert_eq!(id("title").as_str(), "title");
    }

    #[test]
    fn property_identity_deserializes_through_validation() {
        let ok: PropertyIdentity = serde_json::from_str("\"bodyText\"").unwrap();
        assert_eq!(ok, id("bodyText"));
        assert!(serde_json::from_str::<PropertyIdentity>("\"\"").is_err());
    }

    #[test]
    fn property_level_key_matches_every_field_of_its_property() {
        let key = SubscriptionKey::property_level(id("title"));
        assert!(key.matches(&id("title"), ""));
        assert!(key.matches(&id("title"), "value"));
        assert!(!key.matches(&id("body"), ""));
    }

    #[test]
    fn field_key_matches_own_field_and_property_wide_errors() {
        let key = SubscriptionKey::field(id("price"), "amount").unwrap();
        assert!(key.matches(&id("price"), "amount"));
        assert!(key.matches(&id("price"), ""));
        assert!(!key.matches(&id("price"), "currency"));
    }

    #[test]
    fn blank_field_name_is_rejected() {
        assert!(matches!(
            SubscriptionKey::field(id("price"), "  "),
            Err(DomainError::InvalidFieldName { .. })
        ));
    }

    #[test]
    fn notice_verdict_follows_errors() {
        let notice = ValidationNotice::from_errors(
            vec![ValidationError::property_wide("Required")],
            vec![ValidationError::property_wide("Required")],
        );
        assert!(!notice.is_valid);
        assert!(ValidationNotice::valid().is_valid);
    }

    #[test]
    fn key_display() {
        assert_eq!(SubscriptionKey::property_level(id("title")).to_string(), "title");
        assert_eq!(
            SubscriptionKey::field(id("price"), "amount").unwrap().to_string(),
            "price.amount"
        );
    }
}
