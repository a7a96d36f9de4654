//! Form validity adapters.

mod memory;

pub use memory::MemoryForm;
