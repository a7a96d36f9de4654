//! Contract tests for the presenter against mocked ports.

use std::sync::{Arc, Mutex};

use mockall::{mock, predicate::eq};
use propval_core::{
    application::ApplicationError,
    prelude::*,
};

mock! {
    pub Registry {}

    impl ServerValidationRegistry for Registry {
        fn subscribe(
            &self,
            key: SubscriptionKey,
            callback: ValidationCallback,
        ) -> PropvalResult<SubscriptionHandle>;
        fn unsubscribe(&self, key: &SubscriptionKey) -> PropvalResult<()>;
        fn remove(&self, handle: SubscriptionHandle) -> PropvalResult<()>;
        fn property_error(
            &self,
            property: &PropertyIdentity,
            field_name: &str,
        ) -> Option<ValidationError>;
        fn has_errors(&self) -> bool;
    }
}

mock! {
    pub Form {}

    impl FormValidity for Form {
        fn validity(&self) -> Option<bool>;
        fn is_validator_failing(&self, validator: &str) -> bool;
        fn group_has_invalid(&self, property: &PropertyIdentity) -> bool;
        fn set_validity(
            &self,
            validator: &str,
            property: &PropertyIdentity,
            valid: bool,
        ) -> PropvalResult<()>;
    }
}

fn title() -> PropertyIdentity {
    PropertyIdentity::new("title").unwrap()
}

#[test]
fn mount_subscribes_at_property_level_and_unmount_releases_handle_and_slot() {
    let mut registry = MockRegistry::new();
    registry.expect_has_errors().return_const(false);
    registry
        .expect_subscribe()
        .withf(|key, _| key.property.as_str() == "title" && key.is_property_level())
        .times(1)
        .returning(|_, _| Ok(SubscriptionHandle::new(7)));
    registry
        .expect_remove()
        .with(eq(SubscriptionHandle::new(7)))
        .times(1)
        .returning(|_| Ok(()));

    let mut form = MockForm::new();
    form.expect_set_validity()
        .with(eq(VALIDATOR_SLOT), eq(title()), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let presenter = ValidationMessagePresenter::new(Arc::new(registry), Arc::new(form));

    presenter.mount(title()).unwrap();
    presenter.unmount().unwrap();
    assert!(!presenter.is_mounted());
}

#[test]
fn failed_subscription_leaves_presenter_unmounted() {
    let mut registry = MockRegistry::new();
    registry.expect_has_errors().return_const(false);
    registry.expect_subscribe().times(1).returning(|key, _| {
        Err(ApplicationError::SubscriptionFailed {
            key: key.to_string(),
            reason: "registry closed".into(),
        }
        .into())
    });

    let presenter = ValidationMessagePresenter::new(Arc::new(registry), Arc::new(MockForm::new()));

    assert!(presenter.mount(title()).is_err());
    assert!(!presenter.is_mounted());
}

#[test]
fn pushed_message_is_not_replaced_by_save() {
    let captured: Arc<Mutex<Option<ValidationCallback>>> = Arc::default();
    let sink = Arc::clone(&captured);

    let mut registry = MockRegistry::new();
    registry.expect_has_errors().return_const(false);
    registry.expect_subscribe().times(1).returning(move |_, callback| {
        *sink.lock().unwrap() = Some(callback);
        Ok(SubscriptionHandle::new(1))
    });
    registry.expect_property_error().times(0);
    registry.expect_remove().times(1).returning(|_| Ok(()));

    let mut form = MockForm::new();
    form.expect_set_validity()
        .with(eq(VALIDATOR_SLOT), eq(title()), eq(false))
        .times(1)
        .returning(|_, _, _| Ok(()));
    form.expect_set_validity()
        .with(eq(VALIDATOR_SLOT), eq(title()), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let presenter = ValidationMessagePresenter::new(Arc::new(registry), Arc::new(form));
    presenter.mount(title()).unwrap();

    let callback = captured.lock().unwrap().take().unwrap();
    callback(&ValidationNotice::from_errors(
        vec![
            ValidationError::property_wide("Name is required"),
            ValidationError::new("value", "Too short"),
        ],
        Vec::new(),
    ));
    presenter.on_save_started().unwrap();

    assert_eq!(presenter.current_message(), "Name is required");
    assert!(presenter.is_showing_error());
    assert!(presenter.snapshot().show_validation);
    presenter.unmount().unwrap();
}

#[test]
fn client_validity_is_read_from_the_form() {
    let mut registry = MockRegistry::new();
    registry.expect_has_errors().return_const(true);
    registry
        .expect_subscribe()
        .returning(|_, _| Ok(SubscriptionHandle::new(3)));
    registry
        .expect_property_error()
        .with(eq(title()), eq(""))
        .times(1)
        .returning(|_, _| None);
    registry.expect_remove().times(0);

    let mut form = MockForm::new();
    form.expect_validity().return_const(Some(false));
    form.expect_is_validator_failing()
        .with(eq(VALIDATOR_SLOT))
        .return_const(false);
    form.expect_group_has_invalid()
        .with(eq(title()))
        .return_const(true);
    // Released when the still-mounted presenter is dropped.
    form.expect_set_validity()
        .with(eq(VALIDATOR_SLOT), eq(title()), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let presenter = ValidationMessagePresenter::new(Arc::new(registry), Arc::new(form));
    presenter.mount(title()).unwrap();

    presenter.on_client_validity_changed().unwrap();

    // Gate opened at mount because the registry still held errors.
    assert_eq!(presenter.current_message(), DEFAULT_FALLBACK_MESSAGE);
}

#[test]
fn saved_rewrites_slot_even_when_flag_is_unchanged() {
    let mut registry = MockRegistry::new();
    registry.expect_has_errors().return_const(false);
    registry
        .expect_subscribe()
        .returning(|_, _| Ok(SubscriptionHandle::new(5)));
    registry.expect_remove().times(1).returning(|_| Ok(()));

    let mut form = MockForm::new();
    // Twice from `saved`, once from unmount.
    form.expect_set_validity()
        .with(eq(VALIDATOR_SLOT), eq(title()), eq(true))
        .times(3)
        .returning(|_, _, _| Ok(()));

    let presenter = ValidationMessagePresenter::new(Arc::new(registry), Arc::new(form));
    presenter.mount(title()).unwrap();
    assert!(presenter.is_valid());

    presenter.on_save_completed().unwrap();
    presenter.on_save_completed().unwrap();
    presenter.unmount().unwrap();
}
