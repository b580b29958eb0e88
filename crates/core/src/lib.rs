//! `homepage-core` — callback registry domain primitives.
//!
//! Pure value types shared by the store, the registry and the HTTP layer.
//! Nothing here performs IO.

pub mod application;
pub mod callback;
pub mod error;
pub mod id;

pub use application::ApplicationKey;
pub use callback::ApiCallback;
pub use error::{DomainError, DomainResult};
pub use id::CallbackId;
