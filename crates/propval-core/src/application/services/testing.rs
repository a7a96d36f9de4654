//! In-memory port adapters for service unit tests.
//!
//! Stateful where a mock would not be: the registry fans notices out to its
//! subscribers and the form remembers slot writes. Interaction checks use the
//! `mockall` mocks instead.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::application::ports::{FormValidity, ServerValidationRegistry, ValidationCallback};
use crate::domain::{
    PropertyIdentity, SubscriptionHandle, SubscriptionKey, ValidationError, ValidationNotice,
};
use crate::error::PropvalResult;

pub(crate) fn id(alias: &str) -> PropertyIdentity {
    PropertyIdentity::new(alias).unwrap()
}

/// Property-wide errors only; every subscriber of a property is notified.
#[derive(Default)]
pub(crate) struct MemoryRegistry {
    next: Mutex<u64>,
    subs: Mutex<Vec<(SubscriptionHandle, SubscriptionKey, ValidationCallback)>>,
    errors: Mutex<Vec<(PropertyIdentity, ValidationError)>>,
}

impl MemoryRegistry {
    pub(crate) fn push(&self, property: &PropertyIdentity, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((property.clone(), ValidationError::property_wide(message)));
        self.notify(property);
    }

    pub(crate) fn clear(&self, property: &PropertyIdentity) {
        self.errors.lock().unwrap().retain(|(p, _)| p != property);
        self.notify(property);
    }

    /// Forget errors without telling anyone.
    pub(crate) fn reset(&self) {
        self.errors.lock().unwrap().clear();
    }

    pub(crate) fn callbacks(&self) -> Vec<ValidationCallback> {
        self.subs
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, cb)| cb.clone())
            .collect()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subs.lock().unwrap().len()
    }

    fn notify(&self, property: &PropertyIdentity) {
        let errors: Vec<ValidationError> = self
            .errors
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == property)
            .map(|(_, e)| e.clone())
            .collect();
        let callbacks: Vec<ValidationCallback> = self
            .subs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, key, _)| &key.property == property)
            .map(|(_, _, cb)| cb.clone())
            .collect();
        let notice = ValidationNotice::from_errors(errors.clone(), errors);
        for callback in callbacks {
            callback(&notice);
        }
    }
}

impl ServerValidationRegistry for MemoryRegistry {
    fn subscribe(
        &self,
        key: SubscriptionKey,
        callback: ValidationCallback,
    ) -> PropvalResult<SubscriptionHandle> {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        let handle = SubscriptionHandle::new(*next);
        self.subs.lock().unwrap().push((handle, key, callback));
        Ok(handle)
    }

    fn unsubscribe(&self, key: &SubscriptionKey) -> PropvalResult<()> {
        self.subs.lock().unwrap().retain(|(_, k, _)| k != key);
        Ok(())
    }

    fn remove(&self, handle: SubscriptionHandle) -> PropvalResult<()> {
        self.subs.lock().unwrap().retain(|(h, _, _)| *h != handle);
        Ok(())
    }

    fn property_error(
        &self,
        property: &PropertyIdentity,
        field_name: &str,
    ) -> Option<ValidationError> {
        self.errors
            .lock()
            .unwrap()
            .iter()
            .find(|(p, e)| p == property && e.field_name == field_name)
            .map(|(_, e)| e.clone())
    }

    fn has_errors(&self) -> bool {
        !self.errors.lock().unwrap().is_empty()
    }
}

/// Form whose aggregate validity is set directly by the test.
#[derive(Default)]
pub(crate) struct StaticForm {
    validity: Mutex<Option<bool>>,
    group_invalid: Mutex<bool>,
    failing: Mutex<HashSet<(String, PropertyIdentity)>>,
}

impl StaticForm {
    pub(crate) fn set_form_valid(&self, valid: Option<bool>) {
        *self.validity.lock().unwrap() = valid;
    }

    pub(crate) fn set_group_invalid(&self, invalid: bool) {
        *self.group_invalid.lock().unwrap() = invalid;
    }

    pub(crate) fn slot_failing(&self, validator: &str, property: &PropertyIdentity) -> bool {
        self.failing
            .lock()
            .unwrap()
            .contains(&(validator.to_owned(), property.clone()))
    }
}

impl FormValidity for StaticForm {
    fn validity(&self) -> Option<bool> {
        *self.validity.lock().unwrap()
    }

    fn is_validator_failing(&self, validator: &str) -> bool {
        self.failing
            .lock()
            .unwrap()
            .iter()
            .any(|(name, _)| name == validator)
    }

    fn group_has_invalid(&self, _property: &PropertyIdentity) -> bool {
        *self.group_invalid.lock().unwrap()
    }

    fn set_validity(
        &self,
        validator: &str,
        property: &PropertyIdentity,
        valid: bool,
    ) -> PropvalResult<()> {
        let mut failing = self.failing.lock().unwrap();
        let entry = (validator.to_owned(), property.clone());
        if valid {
            failing.remove(&entry);
        } else {
            failing.insert(entry);
        }
        Ok(())
    }
}
