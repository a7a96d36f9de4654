//! In-memory server validation registry.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use propval_core::{
    application::{
        ApplicationError,
        ports::{ServerValidationRegistry, ValidationCallback},
    },
    domain::{
        PropertyIdentity, SubscriptionHandle, SubscriptionKey, ValidationError, ValidationNotice,
    },
    error::{PropvalError, PropvalResult},
};
use tracing::{debug, trace};

struct Subscriber {
    handle: SubscriptionHandle,
    callback: ValidationCallback,
}

struct StoredError {
    property: PropertyIdentity,
    error: ValidationError,
}

#[derive(Default)]
struct RegistryInner {
    next_handle: u64,
    subscribers: HashMap<SubscriptionKey, Vec<Subscriber>>,
    handles: HashMap<SubscriptionHandle, SubscriptionKey>,
    errors: Vec<StoredError>,
}

impl RegistryInner {
    fn errors_for(&self, key: &SubscriptionKey) -> Vec<ValidationError> {
        self.errors
            .iter()
            .filter(|e| key.matches(&e.property, &e.error.field_name))
            .map(|e| e.error.clone())
            .collect()
    }

    fn all_errors(&self) -> Vec<ValidationError> {
        self.errors.iter().map(|e| e.error.clone()).collect()
    }

    /// Notices owed to every subscriber concerned by a change at
    /// `(property, field_name)`, in subscription order.
    fn pending_for(
        &self,
        property: &PropertyIdentity,
        field_name: &str,
    ) -> Vec<(ValidationCallback, ValidationNotice)> {
        let all = self.all_errors();
        let mut pending: Vec<(SubscriptionHandle, ValidationCallback, ValidationNotice)> = self
            .subscribers
            .iter()
            .filter(|(key, _)| key.matches(property, field_name))
            .flat_map(|(key, subs)| {
                let notice = ValidationNotice::from_errors(self.errors_for(key), all.clone());
                subs.iter()
                    .map(move |s| (s.handle, Arc::clone(&s.callback), notice.clone()))
            })
            .collect();
        pending.sort_by_key(|(handle, _, _)| *handle);
        pending
            .into_iter()
            .map(|(_, callback, notice)| (callback, notice))
            .collect()
    }
}

/// Thread-safe in-memory registry of server validation errors.
///
/// Callbacks run after the lock is released, so a subscriber may call back
/// into the registry (for example to unsubscribe) while being notified.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an error and notify the concerned subscribers.
    ///
    /// Re-adding an identical error is ignored.
    pub fn add_property_error(
        &self,
        property: &PropertyIdentity,
        field_name: &str,
        message: impl Into<String>,
    ) -> PropvalResult<()> {
        let error = ValidationError::new(field_name, message);
        let pending = {
            let mut inner = self.write()?;
            let exists = inner
                .errors
                .iter()
                .any(|e| &e.property == property && e.error == error);
            if exists {
                trace!(%property, field_name, "duplicate server error ignored");
                return Ok(());
            }
            debug!(%property, field_name, message = %error.message, "server error added");
            inner.errors.push(StoredError {
                property: property.clone(),
                error,
            });
            inner.pending_for(property, field_name)
        };
        deliver(pending);
        Ok(())
    }

    /// Remove every error stored at exactly `(property, field_name)`.
    ///
    /// Returns whether anything was removed; subscribers are only notified
    /// when it was.
    pub fn remove_property_error(
        &self,
        property: &PropertyIdentity,
        field_name: &str,
    ) -> PropvalResult<bool> {
        let pending = {
            let mut inner = self.write()?;
            let before = inner.errors.len();
            inner
                .errors
                .retain(|e| !(&e.property == property && e.error.field_name == field_name));
            if inner.errors.len() == before {
                return Ok(false);
            }
            inner.pending_for(property, field_name)
        };
        deliver(pending);
        Ok(true)
    }

    /// Remove every error of a property, whatever the field.
    pub fn clear_property(&self, property: &PropertyIdentity) -> PropvalResult<bool> {
        let pending = {
            let mut inner = self.write()?;
            let before = inner.errors.len();
            inner.errors.retain(|e| &e.property != property);
            if inner.errors.len() == before {
                return Ok(false);
            }
            // Property-level change: every key of this property is concerned.
            inner.pending_for(property, "")
        };
        deliver(pending);
        Ok(true)
    }

    /// Forget all stored errors without notifying anyone.
    ///
    /// Editors call this right before a resubmission; the server response
    /// repopulates the registry afterwards.
    pub fn reset(&self) -> PropvalResult<()> {
        let mut inner = self.write()?;
        debug!(dropped = inner.errors.len(), "registry reset");
        inner.errors.clear();
        Ok(())
    }

    /// Every stored error with its property, in insertion order.
    pub fn entries(&self) -> Vec<(PropertyIdentity, ValidationError)> {
        self.read()
            .errors
            .iter()
            .map(|e| (e.property.clone(), e.error.clone()))
            .collect()
    }

    /// Number of stored errors.
    pub fn len(&self) -> usize {
        self.read().errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live subscriptions at exactly `key`.
    pub fn subscriber_count(&self, key: &SubscriptionKey) -> usize {
        self.read().subscribers.get(key).map_or(0, Vec::len)
    }

    /// Number of live subscriptions across all keys.
    pub fn total_subscribers(&self) -> usize {
        self.read().handles.len()
    }

    fn write(&self) -> PropvalResult<RwLockWriteGuard<'_, RegistryInner>> {
        self.inner
            .write()
            .map_err(|_| PropvalError::from(ApplicationError::RegistryLockError))
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn deliver(pending: Vec<(ValidationCallback, ValidationNotice)>) {
    trace!(subscribers = pending.len(), "delivering validation notices");
    for (callback, notice) in pending {
        callback(&notice);
    }
}

impl ServerValidationRegistry for InMemoryRegistry {
    fn subscribe(
        &self,
        key: SubscriptionKey,
        callback: ValidationCallback,
    ) -> PropvalResult<SubscriptionHandle> {
        let mut inner = self.write()?;
        inner.next_handle += 1;
        let handle = SubscriptionHandle::new(inner.next_handle);

        inner.handles.insert(handle, key.clone());
        inner
            .subscribers
            .entry(key.clone())
            .or_default()
            .push(Subscriber { handle, callback });

        debug!(%key, %handle, "subscribed");
        Ok(handle)
    }

    fn unsubscribe(&self, key: &SubscriptionKey) -> PropvalResult<()> {
        let mut inner = self.write()?;
        if let Some(subs) = inner.subscribers.remove(key) {
            for sub in &subs {
                inner.handles.remove(&sub.handle);
            }
            debug!(%key, removed = subs.len(), "unsubscribed");
        }
        Ok(())
    }

    fn remove(&self, handle: SubscriptionHandle) -> PropvalResult<()> {
        let mut inner = self.write()?;
        let Some(key) = inner.handles.remove(&handle) else {
            return Ok(());
        };
        if let Some(subs) = inner.subscribers.get_mut(&key) {
            subs.retain(|s| s.handle != handle);
            if subs.is_empty() {
                inner.subscribers.remove(&key);
            }
        }
        debug!(%key, %handle, "subscription removed");
        Ok(())
    }

    fn property_error(
        &self,
        property: &PropertyIdentity,
        field_name: &str,
    ) -> Option<ValidationError> {
        self.read()
            .errors
            .iter()
            .find(|e| &e.property == property && e.error.field_name == field_name)
            .map(|e| e.error.clone())
    }

    fn has_errors(&self) -> bool {
        !self.read().errors.is_empty()
    }
}
