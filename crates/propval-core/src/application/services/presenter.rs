//! Validation Message Presenter - one mounted field.
//!
//! Bridges a [`FieldValidationState`] to the rendering layer:
//! 1. Subscribes to the registry at the property-level key on mount
//! 2. Feeds registry notices, save events, value edits and client validity
//!    changes into the state machine
//! 3. Mirrors the custom validity flag into the form aggregate
//! 4. Removes its subscription and releases its form slot on unmount
//!
//! Only an explicit [`unmount`](ValidationMessagePresenter::unmount) removes
//! the subscription. Dropping a mounted presenter releases the slot and logs
//! the leak; the registry keeps a callback that no longer delivers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, trace, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{FormValidity, ServerValidationRegistry, ValidationCallback},
    },
    domain::{
        ClientValidity, DEFAULT_FALLBACK_MESSAGE, FieldEvent, FieldValidationState,
        PropertyIdentity, SubscriptionHandle, SubscriptionKey, VALIDATOR_SLOT, ValidationNotice,
    },
    error::{PropvalError, PropvalResult},
};

/// Read-only projection of a field for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub property: Option<PropertyIdentity>,
    pub message: String,
    pub showing_error: bool,
    pub show_validation: bool,
    /// Custom validity flag contributed to the form aggregate.
    pub valid: bool,
    pub client_invalid: bool,
    pub has_server_error: bool,
}

struct Mount {
    key: SubscriptionKey,
    handle: SubscriptionHandle,
    generation: u64,
}

struct PresenterInner {
    state: FieldValidationState,
    mount: Option<Mount>,
    generation: u64,
}

impl PresenterInner {
    /// Property of the live mount, if `generation` still names it.
    fn live_property(&self, generation: u64) -> Option<PropertyIdentity> {
        self.mount
            .as_ref()
            .filter(|m| m.generation == generation)
            .map(|m| m.key.property.clone())
    }
}

/// Presenter for the validation message of one editable property.
pub struct ValidationMessagePresenter {
    registry: Arc<dyn ServerValidationRegistry>,
    form: Arc<dyn FormValidity>,
    fallback_message: String,
    inner: Arc<Mutex<PresenterInner>>,
}

impl ValidationMessagePresenter {
    /// Create an unmounted presenter over the given ports.
    pub fn new(registry: Arc<dyn ServerValidationRegistry>, form: Arc<dyn FormValidity>) -> Self {
        Self {
            registry,
            form,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            inner: Arc::new(Mutex::new(PresenterInner {
                state: FieldValidationState::new(),
                mount: None,
                generation: 0,
            })),
        }
    }

    /// Text shown when the field is invalid and no server message exists.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Subscribe to the property-level registry key and start fresh.
    ///
    /// Mounting an already-mounted presenter is a caller error.
    #[instrument(skip(self), fields(property = %property))]
    pub fn mount(&self, property: PropertyIdentity) -> PropvalResult<()> {
        let generation = {
            let mut inner = self.lock()?;
            if let Some(mounted) = &inner.mount {
                error!(existing = %mounted.key, "presenter mounted twice");
                return Err(ApplicationError::AlreadyMounted {
                    property: mounted.key.property.to_string(),
                }
                .into());
            }
            inner.generation += 1;
            inner.generation
        };

        // Errors left over from an earlier submission are shown immediately.
        let show_validation = self.registry.has_errors();
        let key = SubscriptionKey::property_level(property);
        let handle = self
            .registry
            .subscribe(key.clone(), self.callback(generation))?;

        let mut inner = self.lock()?;
        if inner.mount.is_some() {
            drop(inner);
            self.registry.remove(handle)?;
            return Err(ApplicationError::AlreadyMounted {
                property: key.property.to_string(),
            }
            .into());
        }
        inner.state = FieldValidationState::new()
            .with_show_validation(show_validation)
            .with_fallback_message(self.fallback_message.clone());
        inner.mount = Some(Mount {
            key,
            handle,
            generation,
        });

        debug!(%handle, show_validation, "field mounted");
        Ok(())
    }

    /// Remove the registry subscription and mark the field's slot valid.
    /// Later notices are dropped.
    #[instrument(skip(self))]
    pub fn unmount(&self) -> PropvalResult<()> {
        let mount = self
            .lock()?
            .mount
            .take()
            .ok_or(ApplicationError::NotMounted)?;
        self.registry.remove(mount.handle)?;
        write_slot(self.form.as_ref(), &mount.key.property, true)?;
        debug!(key = %mount.key, handle = %mount.handle, "field unmounted");
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.read().mount.is_some()
    }

    pub fn property(&self) -> Option<PropertyIdentity> {
        self.read().mount.as_ref().map(|m| m.key.property.clone())
    }

    // -------------------------------------------------------------------------
    // Events from the rendering layer
    // -------------------------------------------------------------------------

    pub fn on_save_started(&self) -> PropvalResult<()> {
        self.transition(FieldEvent::SaveStarted)
    }

    pub fn on_save_completed(&self) -> PropvalResult<()> {
        self.transition(FieldEvent::SaveCompleted)
    }

    /// The bound value changed through user input.
    pub fn on_value_changed(&self, value: &serde_json::Value) -> PropvalResult<()> {
        trace!(%value, "value changed");
        let form_invalid = self.form.validity() == Some(false);
        self.transition(FieldEvent::LocalValueEdited { form_invalid })
    }

    /// Re-read client validity from the form aggregate and apply it.
    pub fn on_client_validity_changed(&self) -> PropvalResult<()> {
        let property = self.property().ok_or(ApplicationError::NotMounted)?;
        let validity = ClientValidity {
            form_valid: self.form.validity(),
            slot_claimed: self.form.is_validator_failing(VALIDATOR_SLOT),
            group_invalid: self.form.group_has_invalid(&property),
        };
        self.on_client_validity(validity)
    }

    /// Apply a client validity snapshot computed by the caller.
    pub fn on_client_validity(&self, validity: ClientValidity) -> PropvalResult<()> {
        self.transition(FieldEvent::ClientValidityChanged(validity))
    }

    // -------------------------------------------------------------------------
    // Projections for the rendering layer
    // -------------------------------------------------------------------------

    /// Message to display; empty when no error is shown.
    pub fn current_message(&self) -> String {
        self.read().state.displayed_message().to_owned()
    }

    pub fn is_showing_error(&self) -> bool {
        self.read().state.is_showing_error()
    }

    /// Custom validity flag this field contributes to the form.
    pub fn is_valid(&self) -> bool {
        self.read().state.custom_valid()
    }

    pub fn state(&self) -> FieldValidationState {
        self.read().state.clone()
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        let inner = self.read();
        let state = &inner.state;
        FieldSnapshot {
            property: inner.mount.as_ref().map(|m| m.key.property.clone()),
            message: state.displayed_message().to_owned(),
            showing_error: state.is_showing_error(),
            show_validation: state.show_validation(),
            valid: state.custom_valid(),
            client_invalid: state.client_invalid(),
            has_server_error: state.has_server_error(),
        }
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn lock(&self) -> PropvalResult<MutexGuard<'_, PresenterInner>> {
        self.inner
            .lock()
            .map_err(|_| PropvalError::from(ApplicationError::StateLockError))
    }

    /// Readers tolerate poisoning; the state is plain data.
    fn read(&self) -> MutexGuard<'_, PresenterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: FieldEvent<'_>) -> PropvalResult<()> {
        let mut inner = self.lock()?;
        let property = inner
            .mount
            .as_ref()
            .map(|m| m.key.property.clone())
            .ok_or(ApplicationError::NotMounted)?;
        inner
            .state
            .apply(event, || self.registry.property_error(&property, ""));
        if event.sets_custom_validity() {
            write_slot(self.form.as_ref(), &property, inner.state.custom_valid())?;
        }
        Ok(())
    }

    /// Registry callback bound to one mount generation.
    ///
    /// Holds the state weakly: a dropped presenter or a stale generation
    /// turns delivery into a no-op.
    fn callback(&self, generation: u64) -> ValidationCallback {
        let weak = Arc::downgrade(&self.inner);
        let form = Arc::clone(&self.form);
        Arc::new(move |notice: &ValidationNotice| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Ok(mut inner) = shared.lock() else {
                warn!("presenter state poisoned, notice dropped");
                return;
            };
            let Some(property) = inner.live_property(generation) else {
                trace!(generation, "notice for a disposed subscription dropped");
                return;
            };

            inner.state.apply(
                FieldEvent::RegistryErrorPushed {
                    is_valid: notice.is_valid,
                    errors: &notice.property_errors,
                },
                || None,
            );
            if let Err(e) = write_slot(form.as_ref(), &property, inner.state.custom_valid()) {
                warn!(error = %e, property = %property, "custom validity not updated");
            }
        })
    }
}

impl Drop for ValidationMessagePresenter {
    fn drop(&mut self) {
        let mount = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mount
            .take();
        if let Some(mount) = mount {
            warn!(
                key = %mount.key,
                handle = %mount.handle,
                "presenter dropped while mounted, subscription left in place"
            );
            if let Err(e) = write_slot(self.form.as_ref(), &mount.key.property, true) {
                warn!(error = %e, key = %mount.key, "custom validity not released on drop");
            }
        }
    }
}

fn write_slot(
    form: &dyn FormValidity,
    property: &PropertyIdentity,
    valid: bool,
) -> PropvalResult<()> {
    form.set_validity(VALIDATOR_SLOT, property, valid)
}
