//! Edit sessions running against the in-memory adapters.

use std::sync::Arc;

use propval_adapters::{InMemoryRegistry, MemoryForm};
use propval_core::prelude::*;
use serde_json::json;

fn id(alias: &str) -> PropertyIdentity {
    PropertyIdentity::new(alias).unwrap()
}

fn session() -> (InMemoryRegistry, MemoryForm, EditSession) {
    let registry = InMemoryRegistry::new();
    let form = MemoryForm::new();
    let session = EditSession::new(Arc::new(registry.clone()), Arc::new(form.clone()));
    (registry, form, session)
}

fn message(session: &EditSession, alias: &str) -> String {
    session.presenter(&id(alias)).unwrap().current_message()
}

#[test]
fn edit_and_resubmit_falls_back_to_generic_message() {
    let (registry, form, mut session) = session();
    session.mount(id("title")).unwrap();

    registry
        .add_property_error(&id("title"), "", "Name is required")
        .unwrap();
    assert_eq!(message(&session, "title"), "Name is required");
    assert!(form.is_validator_failing(VALIDATOR_SLOT));
    assert!(!session.is_submittable());

    session.value_changed(&id("title"), &json!("N")).unwrap();
    assert_eq!(message(&session, "title"), "");
    assert!(!form.is_validator_failing(VALIDATOR_SLOT));

    form.set_control_validity(&id("title"), "value", "minlength", false)
        .unwrap();
    session.client_validity_changed().unwrap();
    registry.reset().unwrap();

    session.saving().unwrap();
    assert_eq!(message(&session, "title"), DEFAULT_FALLBACK_MESSAGE);

    session.saved().unwrap();
    let snapshot = session.presenter(&id("title")).unwrap().snapshot();
    assert_eq!(snapshot.message, "");
    assert!(!snapshot.show_validation);
}

#[test]
fn model_state_reaches_each_mounted_field() {
    let (registry, _form, mut session) = session();
    session.mount(id("title")).unwrap();
    session.mount(id("body")).unwrap();

    registry
        .load_model_state(&json!({
            "_Properties.title": ["Title taken"],
            "_Properties.body": ["Body too short", "Body has bad words"],
        }))
        .unwrap();

    assert_eq!(message(&session, "title"), "Title taken");
    assert_eq!(message(&session, "body"), "Body too short");
    assert!(!session.is_submittable());

    registry.clear_property(&id("title")).unwrap();

    assert_eq!(message(&session, "title"), "");
    assert_eq!(message(&session, "body"), "Body too short");
}

#[test]
fn leftover_errors_open_the_gate_for_late_mounts() {
    let (registry, form, mut session) = session();
    registry
        .add_property_error(&id("other"), "", "Still broken")
        .unwrap();

    session.mount(id("title")).unwrap();
    form.set_control_validity(&id("title"), "value", "required", false)
        .unwrap();
    session.client_validity_changed().unwrap();

    assert_eq!(message(&session, "title"), DEFAULT_FALLBACK_MESSAGE);
}

#[test]
fn unmounted_fields_stop_listening() {
    let (registry, _form, mut session) = session();
    session.mount(id("title")).unwrap();
    session.mount(id("body")).unwrap();
    assert_eq!(registry.total_subscribers(), 2);

    session.unmount(&id("title")).unwrap();
    registry
        .add_property_error(&id("title"), "", "Nobody hears this")
        .unwrap();

    assert_eq!(registry.total_subscribers(), 1);
    assert_eq!(
        registry.subscriber_count(&SubscriptionKey::property_level(id("title"))),
        0
    );

    session.unmount_all().unwrap();
    assert_eq!(registry.total_subscribers(), 0);
}

#[test]
fn unevaluated_form_is_not_submittable() {
    let registry = InMemoryRegistry::new();
    let form = MemoryForm::unevaluated();
    let session = EditSession::new(Arc::new(registry), Arc::new(form.clone()));

    assert!(!session.is_submittable());
    form.mark_evaluated().unwrap();
    assert!(session.is_submittable());
}

#[test]
fn remounted_field_keeps_the_form_submittable_after_save() {
    let (registry, form, mut session) = session();
    session.mount(id("title")).unwrap();
    registry
        .add_property_error(&id("title"), "", "Name is required")
        .unwrap();
    assert!(!session.is_submittable());

    session.unmount(&id("title")).unwrap();
    assert!(session.is_submittable());

    registry.reset().unwrap();
    session.mount(id("title")).unwrap();
    session.saving().unwrap();
    session.saved().unwrap();

    assert!(session.presenter(&id("title")).unwrap().is_valid());
    assert!(!form.is_validator_failing(VALIDATOR_SLOT));
    assert!(session.is_submittable());
}

#[test]
fn saved_clears_a_failing_slot_the_field_did_not_flag() {
    let (_registry, form, mut session) = session();
    session.mount(id("title")).unwrap();
    form.set_validity(VALIDATOR_SLOT, &id("title"), false).unwrap();
    assert!(session.presenter(&id("title")).unwrap().is_valid());
    assert!(!session.is_submittable());

    session.saving().unwrap();
    session.saved().unwrap();

    assert!(!form.is_validator_failing(VALIDATOR_SLOT));
    assert!(session.is_submittable());
}
