//! Infrastructure layer: callback persistence and the registry built on it.

pub mod callback_store;
pub mod registry;

#[cfg(test)]
mod integration_tests;

pub use callback_store::{
    CallbackRecord, CallbackStore, CallbackUnitOfWork, InMemoryCallbackStore, PostgresCallbackStore,
    StoreError,
};
pub use registry::{CallbackRegistry, RegistryError, RegistryResult, UpsertOutcome};
