//! Storage for last-applied records.

mod file;
mod memory;

pub use file::{FileStateStore, STATE_FILE_VERSION, StateFile};
pub use memory::InMemoryStateStore;
