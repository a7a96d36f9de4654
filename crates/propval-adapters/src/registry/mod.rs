//! Server validation registry adapters.

mod memory;
mod model_state;

pub use memory::InMemoryRegistry;
pub use model_state::{ModelStateError, parse_model_state};
