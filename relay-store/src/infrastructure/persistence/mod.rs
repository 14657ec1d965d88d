mod memory;

pub use memory::{InMemoryMessageStore, InMemoryProfileStore};
