//! Callback record persistence.
//!
//! The registry talks to storage only through [`CallbackStore`] and the
//! [`CallbackUnitOfWork`] it hands out, so the same logic runs against the
//! in-memory store (tests/dev) and Postgres (production).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCallbackStore;
pub use postgres::PostgresCallbackStore;
pub use r#trait::{CallbackRecord, CallbackStore, CallbackUnitOfWork, StoreError};
