//! In-Memory Implementations

mod attempt_store;

pub use attempt_store::InMemoryAttemptStore;
