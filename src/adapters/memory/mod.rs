//! In-memory adapters for tests and database-free local runs.

mod clock;
mod store;

pub use clock::ManualClock;
pub use store::InMemoryStore;
