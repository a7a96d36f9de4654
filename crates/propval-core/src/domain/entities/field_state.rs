//! Per-field validation state machine.
//!
//! A [`FieldValidationState`] reconciles three independent sources of error
//! state for one mounted property:
//!
//! 1. client-side validity reported by the rendering layer,
//! 2. server-side errors pushed by the registry,
//! 3. the "show validation" gate opened by a save attempt.

use std::fmt;

use tracing::trace;

use crate::domain::ValidationError;

/// Name of the custom validator slot this state drives in the form aggregate.
pub const VALIDATOR_SLOT: &str = "valPropertyMsg";

/// Shown when a field is invalid but no server message is available.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Property has errors";

/// What the rendering layer reports when client-side validity changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientValidity {
    /// Aggregate form validity; `None` until the form has been evaluated.
    pub form_valid: Option<bool>,
    /// The custom validator slot is already failing somewhere in the form.
    pub slot_claimed: bool,
    /// Some control inside this property's group is invalid.
    pub group_invalid: bool,
}

impl ClientValidity {
    pub const fn valid() -> Self {
        Self {
            form_valid: Some(true),
            slot_claimed: false,
            group_invalid: false,
        }
    }

    pub const fn group_invalid() -> Self {
        Self {
            form_valid: Some(false),
            slot_claimed: false,
            group_invalid: true,
        }
    }
}

/// Discrete inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent<'a> {
    ClientValidityChanged(ClientValidity),
    RegistryErrorPushed {
        is_valid: bool,
        errors: &'a [ValidationError],
    },
    SaveStarted,
    SaveCompleted,
    LocalValueEdited {
        form_invalid: bool,
    },
}

impl FieldEvent<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientValidityChanged(_) => "client_validity_changed",
            Self::RegistryErrorPushed { .. } => "registry_error_pushed",
            Self::SaveStarted => "save_started",
            Self::SaveCompleted => "save_completed",
            Self::LocalValueEdited { .. } => "local_value_edited",
        }
    }

    /// Whether applying the event assigns the custom validity flag.
    ///
    /// The form slot must be written after every such event, even when the
    /// flag keeps its value.
    pub fn sets_custom_validity(&self) -> bool {
        match self {
            Self::RegistryErrorPushed { .. } | Self::SaveCompleted => true,
            Self::LocalValueEdited { form_invalid } => *form_invalid,
            Self::ClientValidityChanged(_) | Self::SaveStarted => false,
        }
    }
}

impl fmt::Display for FieldEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Validation state of one mounted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationState {
    client_invalid: bool,
    has_server_error: bool,
    show_validation: bool,
    displayed_message: String,
    custom_valid: bool,
    fallback_message: String,
}

impl Default for FieldValidationState {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldValidationState {
    /// Fresh state: valid, gate closed, nothing displayed.
    pub fn new() -> Self {
        Self {
            client_invalid: false,
            has_server_error: false,
            show_validation: false,
            displayed_message: String::new(),
            custom_valid: true,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
        }
    }

    /// Open the gate from the start, e.g. when the registry still holds
    /// errors from a previous submission.
    pub fn with_show_validation(mut self, show: bool) -> Self {
        self.show_validation = show;
        self
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    // ── Projections ───────────────────────────────────────────────────────

    pub fn client_invalid(&self) -> bool {
        self.client_invalid
    }

    pub fn has_server_error(&self) -> bool {
        self.has_server_error
    }

    pub fn show_validation(&self) -> bool {
        self.show_validation
    }

    pub fn displayed_message(&self) -> &str {
        &self.displayed_message
    }

    /// Value of the custom validator slot in the form aggregate.
    pub fn custom_valid(&self) -> bool {
        self.custom_valid
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    pub fn is_flagged_invalid(&self) -> bool {
        self.client_invalid || self.has_server_error
    }

    pub fn is_showing_error(&self) -> bool {
        !self.displayed_message.is_empty()
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Apply one event.
    ///
    /// `stored_error` is consulted lazily, only when a transition needs the
    /// property-level server error to fill an empty message.
    pub fn apply<F>(&mut self, event: FieldEvent<'_>, stored_error: F)
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        match event {
            FieldEvent::ClientValidityChanged(validity) => {
                self.client_validity_changed(validity, stored_error)
            }
            FieldEvent::RegistryErrorPushed { is_valid, errors } => {
                self.registry_error_pushed(is_valid, errors)
            }
            FieldEvent::SaveStarted => self.save_started(stored_error),
            FieldEvent::SaveCompleted => self.save_completed(),
            FieldEvent::LocalValueEdited { form_invalid } => self.local_value_edited(form_invalid),
        }
        trace!(
            event = %event,
            message = %self.displayed_message,
            show_validation = self.show_validation,
            custom_valid = self.custom_valid,
            "field transition"
        );
    }

    pub fn client_validity_changed<F>(&mut self, validity: ClientValidity, stored_error: F)
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        match validity.form_valid {
            None => {}
            Some(false) if validity.slot_claimed => {
                // Message already owned by the last registry push.
            }
            Some(false) if validity.group_invalid => {
                self.client_invalid = true;
                if self.show_validation && self.displayed_message.is_empty() {
                    self.fill_from_store(stored_error);
                }
            }
            Some(_) => self.clear_flags(),
        }
    }

    /// Server verdict for the subscribed key. The first error wins.
    pub fn registry_error_pushed(&mut self, is_valid: bool, errors: &[ValidationError]) {
        self.has_server_error = !is_valid;
        if self.has_server_error {
            self.displayed_message = match errors.first() {
                Some(first) if !first.message.is_empty() => first.message.clone(),
                _ => self.fallback_message.clone(),
            };
            self.custom_valid = false;
        } else {
            self.clear_flags();
            self.custom_valid = true;
        }
    }

    pub fn save_started<F>(&mut self, stored_error: F)
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        self.show_validation = true;
        if !self.is_flagged_invalid() {
            self.displayed_message.clear();
        } else if self.displayed_message.is_empty() {
            self.fill_from_store(stored_error);
        }
    }

    /// Optimistic reset; a later registry push restores any real error.
    pub fn save_completed(&mut self) {
        self.show_validation = false;
        self.displayed_message.clear();
        self.custom_valid = true;
    }

    /// Re-arm the field so a stale server rejection does not block
    /// resubmission. Client-side validators keep running independently.
    pub fn local_value_edited(&mut self, form_invalid: bool) {
        if form_invalid {
            self.displayed_message.clear();
            self.custom_valid = true;
        }
    }

    fn clear_flags(&mut self) {
        self.client_invalid = false;
        self.has_server_error = false;
        self.displayed_message.clear();
    }

    fn fill_from_store<F>(&mut self, stored_error: F)
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        self.displayed_message = stored_error()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.fallback_message.clone());
    }
}
