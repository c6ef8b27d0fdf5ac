//! Test doubles shared by unit tests and the integration suites in `tests/`.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

mod clock;
mod in_memory_store;

pub use clock::MutableClock;
pub use in_memory_store::InMemoryStore;
