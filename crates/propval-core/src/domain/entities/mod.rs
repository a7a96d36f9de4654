pub mod field_state;

pub use field_state::FieldValidationState;
