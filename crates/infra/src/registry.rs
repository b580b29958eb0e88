//! Callback registry: create/update/delete/list of callback registrations.
//!
//! Every operation:
//! 1. validates its input (no store access on failure)
//! 2. runs inside exactly one unit of work from the injected [`CallbackStore`]
//! 3. logs and propagates store failures unchanged as
//!    [`RegistryError::Persistence`]
//!
//! An upsert of an existing `public_id` overwrites the mutable fields,
//! including the owning application key, so re-registering a callback under
//! another application moves it there.

use thiserror::Error;
use tracing::instrument;

use homepage_core::{ApiCallback, ApplicationKey, CallbackId, DomainError};

use crate::callback_store::{CallbackStore, StoreError};

/// Result type of registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Input was missing or malformed. Raised before any store access.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The store failed while serving `operation`.
    #[error("persistence failure during {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl RegistryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistryError::Validation(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, RegistryError::Persistence { .. })
    }
}

/// Outcome of a single create-or-update attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// The callback registry.
///
/// Holds no state besides the store handle; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct CallbackRegistry<S> {
    store: S,
}

impl<S> CallbackRegistry<S>
where
    S: CallbackStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the callback if its `public_id` is unseen, otherwise update it in place.
    ///
    /// A create that loses a race against a concurrent create of the same
    /// `public_id` is retried once as an update.
    #[instrument(
        skip(self, application_key, callback),
        fields(application_key = %application_key, public_id = %callback.public_id)
    )]
    pub async fn upsert(
        &self,
        application_key: &str,
        callback: &ApiCallback,
    ) -> RegistryResult<UpsertOutcome> {
        let application_key = ApplicationKey::parse(application_key)?;
        callback.validate()?;

        let outcome = match self.write(&application_key, callback).await {
            Err(StoreError::UniqueViolation(msg)) => {
                tracing::warn!(reason = %msg, "lost concurrent create; retrying as update");
                self.write(&application_key, callback).await
            }
            other => other,
        }
        .map_err(|source| persistence_failure("upsert", source))?;

        tracing::debug!(?outcome, "callback stored");
        Ok(outcome)
    }

    /// Delete the callback with this `public_id`. Absent ids succeed silently.
    #[instrument(skip(self), fields(public_id = %public_id))]
    pub async fn remove(&self, public_id: CallbackId) -> RegistryResult<()> {
        let public_id = public_id.ensure_valid()?;

        let removed = self
            .delete(public_id)
            .await
            .map_err(|source| persistence_failure("remove", source))?;
        tracing::debug!(removed, "callback removal processed");
        Ok(())
    }

    /// Every callback owned by `application_key`, in no particular order.
    #[instrument(skip(self, application_key), fields(application_key = %application_key))]
    pub async fn list_by_application(
        &self,
        application_key: &str,
    ) -> RegistryResult<Vec<ApiCallback>> {
        let application_key = ApplicationKey::parse(application_key)?;

        self.query(&application_key)
            .await
            .map_err(|source| persistence_failure("list_by_application", source))
    }

    /// One find-then-insert-or-update pass inside a single unit of work.
    ///
    /// Any early return drops the unit of work, rolling it back.
    async fn write(
        &self,
        application_key: &ApplicationKey,
        callback: &ApiCallback,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut uow = self.store.begin().await?;
        let outcome = match uow.find_by_public_id(callback.public_id).await? {
            None => {
                uow.insert(application_key, callback).await?;
                UpsertOutcome::Created
            }
            Some(mut record) => {
                record.apply(application_key, callback);
                uow.update(&record).await?;
                UpsertOutcome::Updated
            }
        };
        uow.commit().await?;
        Ok(outcome)
    }

    /// Find-then-delete inside a single unit of work. Returns whether a record existed.
    async fn delete(&self, public_id: CallbackId) -> Result<bool, StoreError> {
        let mut uow = self.store.begin().await?;
        let removed = match uow.find_by_public_id(public_id).await? {
            Some(record) => {
                uow.delete(&record).await?;
                true
            }
            None => false,
        };
        uow.commit().await?;
        Ok(removed)
    }

    async fn query(&self, application_key: &ApplicationKey) -> Result<Vec<ApiCallback>, StoreError> {
        let mut uow = self.store.begin().await?;
        let records = uow.query_by_application_key(application_key).await?;
        uow.commit().await?;
        Ok(records.into_iter().map(|r| r.into_api()).collect())
    }
}

fn persistence_failure(operation: &'static str, source: StoreError) -> RegistryError {
    tracing::error!(operation, error = %source, "callback store operation failed");
    RegistryError::Persistence { operation, source }
}
