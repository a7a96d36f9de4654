//! In-memory form validity aggregate.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use propval_core::{
    application::{ApplicationError, ports::FormValidity},
    domain::PropertyIdentity,
    error::{PropvalError, PropvalResult},
};
use tracing::{debug, trace};

#[derive(Default)]
struct FormState {
    evaluated: bool,
    /// property -> control -> failing validator names
    controls: BTreeMap<PropertyIdentity, BTreeMap<String, BTreeSet<String>>>,
    /// (validator, property) pairs whose custom slot is failing
    slots: BTreeSet<(String, PropertyIdentity)>,
}

impl FormState {
    fn control_failures(&self) -> usize {
        self.controls
            .values()
            .flat_map(BTreeMap::values)
            .filter(|failing| !failing.is_empty())
            .count()
    }
}

/// Form aggregate backed by in-memory maps.
///
/// Client-side controls are grouped per property. The form is valid when no
/// control and no custom slot is failing.
#[derive(Clone)]
pub struct MemoryForm {
    state: Arc<RwLock<FormState>>,
}

impl MemoryForm {
    /// A form that has already been evaluated once.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(FormState {
                evaluated: true,
                ..FormState::default()
            })),
        }
    }

    /// A form whose validity is not yet known.
    pub fn unevaluated() -> Self {
        Self {
            state: Arc::new(RwLock::new(FormState::default())),
        }
    }

    pub fn mark_evaluated(&self) -> PropvalResult<()> {
        self.write(|state| state.evaluated = true)
    }

    /// Record the outcome of one client-side validator on one control.
    ///
    /// Also marks the form evaluated.
    pub fn set_control_validity(
        &self,
        property: &PropertyIdentity,
        control: &str,
        validator: &str,
        valid: bool,
    ) -> PropvalResult<()> {
        self.write(|state| {
            state.evaluated = true;
            let failing = state
                .controls
                .entry(property.clone())
                .or_default()
                .entry(control.to_owned())
                .or_default();
            if valid {
                failing.remove(validator);
            } else {
                failing.insert(validator.to_owned());
            }
            debug!(%property, control, validator, valid, "control validity set");
        })
    }

    /// Failing validators across every control of a property.
    pub fn failing_validators(&self, property: &PropertyIdentity) -> Vec<String> {
        let state = self.read();
        let mut names: BTreeSet<String> = state
            .controls
            .get(property)
            .into_iter()
            .flat_map(BTreeMap::values)
            .flatten()
            .cloned()
            .collect();
        names.extend(
            state
                .slots
                .iter()
                .filter(|(_, p)| p == property)
                .map(|(v, _)| v.clone()),
        );
        names.into_iter().collect()
    }

    fn write(&self, f: impl FnOnce(&mut FormState)) -> PropvalResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| PropvalError::from(ApplicationError::FormLockError))?;
        f(&mut state);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, FormState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FormValidity for MemoryForm {
    fn validity(&self) -> Option<bool> {
        let state = self.read();
        if !state.evaluated {
            return None;
        }
        let valid = state.control_failures() == 0 && state.slots.is_empty();
        trace!(valid, "form validity read");
        Some(valid)
    }

    fn is_validator_failing(&self, validator: &str) -> bool {
        let state = self.read();
        state.slots.iter().any(|(v, _)| v == validator)
            || state
                .controls
                .values()
                .flat_map(BTreeMap::values)
                .any(|failing| failing.contains(validator))
    }

    fn group_has_invalid(&self, property: &PropertyIdentity) -> bool {
        self.read()
            .controls
            .get(property)
            .is_some_and(|controls| controls.values().any(|failing| !failing.is_empty()))
    }

    fn set_validity(
        &self,
        validator: &str,
        property: &PropertyIdentity,
        valid: bool,
    ) -> PropvalResult<()> {
        self.write(|state| {
            let slot = (validator.to_owned(), property.clone());
            if valid {
                state.slots.remove(&slot);
            } else {
                state.slots.insert(slot);
            }
            debug!(%property, validator, valid, "custom validity set");
        })
    }
}
