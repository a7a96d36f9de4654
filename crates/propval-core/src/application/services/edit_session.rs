//! Edit Session - every mounted field of one content item.
//!
//! Save lifecycle events are broadcast: when the editor starts or finishes
//! a save, every mounted presenter hears about it, in mount order.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError, FieldSnapshot, ValidationMessagePresenter,
        ports::{FormValidity, ServerValidationRegistry},
    },
    domain::{DEFAULT_FALLBACK_MESSAGE, PropertyIdentity},
    error::PropvalResult,
};

/// The fields of one content item being edited.
pub struct EditSession {
    id: Uuid,
    registry: Arc<dyn ServerValidationRegistry>,
    form: Arc<dyn FormValidity>,
    fallback_message: String,
    fields: Vec<(PropertyIdentity, ValidationMessagePresenter)>,
}

impl EditSession {
    pub fn new(registry: Arc<dyn ServerValidationRegistry>, form: Arc<dyn FormValidity>) -> Self {
        Self {
            id: Uuid::new_v4(),
            registry,
            form,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            fields: Vec::new(),
        }
    }

    /// Fallback text for presenters mounted from now on.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // -------------------------------------------------------------------------
    // Mounting
    // -------------------------------------------------------------------------

    #[instrument(skip(self), fields(session = %self.id, property = %property))]
    pub fn mount(&mut self, property: PropertyIdentity) -> PropvalResult<&ValidationMessagePresenter> {
        if self.presenter(&property).is_some() {
            return Err(ApplicationError::DuplicateProperty {
                property: property.to_string(),
            }
            .into());
        }

        let presenter = ValidationMessagePresenter::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.form),
        )
        .with_fallback_message(self.fallback_message.clone());
        presenter.mount(property.clone())?;

        self.fields.push((property, presenter));
        debug!(fields = self.fields.len(), "field added to session");
        Ok(&self.fields[self.fields.len() - 1].1)
    }

    #[instrument(skip(self), fields(session = %self.id, property = %property))]
    pub fn unmount(&mut self, property: &PropertyIdentity) -> PropvalResult<()> {
        let index = self
            .fields
            .iter()
            .position(|(p, _)| p == property)
            .ok_or_else(|| ApplicationError::UnknownProperty {
                property: property.to_string(),
            })?;
        let (_, presenter) = self.fields.remove(index);
        presenter.unmount()
    }

    /// Unmount every field, in mount order.
    pub fn unmount_all(&mut self) -> PropvalResult<()> {
        for (_, presenter) in self.fields.drain(..) {
            presenter.unmount()?;
        }
        Ok(())
    }

    pub fn presenter(&self, property: &PropertyIdentity) -> Option<&ValidationMessagePresenter> {
        self.fields
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, presenter)| presenter)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyIdentity> {
        self.fields.iter().map(|(p, _)| p)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Broadcast the start of a save to every field.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn saving(&self) -> PropvalResult<()> {
        info!(fields = self.fields.len(), "save started");
        for (_, presenter) in &self.fields {
            presenter.on_save_started()?;
        }
        Ok(())
    }

    /// Broadcast a successful save to every field.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn saved(&self) -> PropvalResult<()> {
        info!(fields = self.fields.len(), "save completed");
        for (_, presenter) in &self.fields {
            presenter.on_save_completed()?;
        }
        Ok(())
    }

    pub fn value_changed(
        &self,
        property: &PropertyIdentity,
        value: &serde_json::Value,
    ) -> PropvalResult<()> {
        self.require(property)?.on_value_changed(value)
    }

    /// Let every field re-read client validity from the form.
    pub fn client_validity_changed(&self) -> PropvalResult<()> {
        for (_, presenter) in &self.fields {
            presenter.on_client_validity_changed()?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Projections
    // -------------------------------------------------------------------------

    /// The form aggregate reports valid. An unevaluated form is not submittable.
    pub fn is_submittable(&self) -> bool {
        self.form.validity() == Some(true)
    }

    pub fn snapshots(&self) -> Vec<FieldSnapshot> {
        self.fields.iter().map(|(_, p)| p.snapshot()).collect()
    }

    fn require(&self, property: &PropertyIdentity) -> PropvalResult<&ValidationMessagePresenter> {
        self.presenter(property).ok_or_else(|| {
            ApplicationError::UnknownProperty {
                property: property.to_string(),
            }
            .into()
        })
    }
}
