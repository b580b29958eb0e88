use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use homepage_core::{ApiCallback, ApplicationKey, CallbackId};

/// A persisted callback record.
///
/// `id` is the store's surrogate key. It is stable for the life of the row
/// but never leaves the infrastructure layer; callers see [`ApiCallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRecord {
    pub id: i64,
    pub public_id: CallbackId,
    pub application_key: ApplicationKey,
    pub api_type: String,
    pub api_version: String,
    pub relative_callback_uri: String,
}

impl CallbackRecord {
    /// Project the record to the caller-facing shape.
    pub fn to_api(&self) -> ApiCallback {
        ApiCallback {
            public_id: self.public_id,
            api_type: self.api_type.clone(),
            api_version: self.api_version.clone(),
            relative_callback_uri: self.relative_callback_uri.clone(),
        }
    }

    pub fn into_api(self) -> ApiCallback {
        ApiCallback {
            public_id: self.public_id,
            api_type: self.api_type,
            api_version: self.api_version,
            relative_callback_uri: self.relative_callback_uri,
        }
    }

    /// Overwrite the mutable fields from a registration.
    ///
    /// `public_id` is the identity and is left alone.
    pub fn apply(&mut self, application_key: &ApplicationKey, callback: &ApiCallback) {
        self.application_key = application_key.clone();
        self.api_type = callback.api_type.clone();
        self.api_version = callback.api_version.clone();
        self.relative_callback_uri = callback.relative_callback_uri.clone();
    }
}

/// Callback store operation error.
///
/// ## Error Categories
///
/// - **UniqueViolation**: another row already holds the `public_id` (usually a
///   lost create race)
/// - **ConstraintViolation**: any other integrity constraint
/// - **Connection**: the store could not be reached (pool closed, IO, TLS,
///   timeouts)
/// - **Database**: everything else reported by the backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("store unreachable: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Transactional store of callback records.
///
/// Every registry operation runs inside exactly one [`CallbackUnitOfWork`]:
/// reads and writes made through it become visible to others only on
/// [`CallbackUnitOfWork::commit`]. Dropping a unit of work without committing
/// rolls it back.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - enforce uniqueness of `public_id` and report a clash as
///   [`StoreError::UniqueViolation`] (from `insert` or `commit`)
/// - apply a unit of work atomically (all staged writes or none)
/// - never cache rows across units of work
#[async_trait::async_trait]
pub trait CallbackStore: Send + Sync {
    /// Open a new unit of work.
    async fn begin(&self) -> Result<Box<dyn CallbackUnitOfWork>, StoreError>;

    /// Cheap connectivity probe used by health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// A single atomic unit of work against the callback store.
#[async_trait::async_trait]
pub trait CallbackUnitOfWork: Send {
    /// Look a record up by its public identifier. Absence is `Ok(None)`.
    async fn find_by_public_id(
        &mut self,
        public_id: CallbackId,
    ) -> Result<Option<CallbackRecord>, StoreError>;

    /// Stage a new record owned by `application_key`.
    async fn insert(
        &mut self,
        application_key: &ApplicationKey,
        callback: &ApiCallback,
    ) -> Result<(), StoreError>;

    /// Stage an in-place update of an existing record (matched by `id`).
    async fn update(&mut self, record: &CallbackRecord) -> Result<(), StoreError>;

    /// Stage deletion of an existing record (matched by `id`).
    async fn delete(&mut self, record: &CallbackRecord) -> Result<(), StoreError>;

    /// All records owned by `application_key`, in no particular order.
    async fn query_by_application_key(
        &mut self,
        application_key: &ApplicationKey,
    ) -> Result<Vec<CallbackRecord>, StoreError>;

    /// Make every staged write durable.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> CallbackStore for Arc<S>
where
    S: CallbackStore + ?Sized,
{
    async fn begin(&self) -> Result<Box<dyn CallbackUnitOfWork>, StoreError> {
        (**self).begin().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}
