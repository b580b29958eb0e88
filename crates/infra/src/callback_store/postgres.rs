//! Postgres-backed callback store.
//!
//! One unit of work maps to one SQL transaction. Dropping a
//! [`PostgresUnitOfWork`] without committing rolls the transaction back, which
//! is also what happens when the request future driving it is cancelled.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|-----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other integrity violation) | `23xxx` | `ConstraintViolation` |
//! | Database (connection exception) | `08xxx` | `Connection` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / PoolTimedOut / Io / Tls | N/A | `Connection` |
//! | Other | N/A | `Database` |

use std::sync::Arc;

use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::{Span, instrument};

use homepage_core::{ApiCallback, ApplicationKey, CallbackId};

use super::r#trait::{CallbackRecord, CallbackStore, CallbackUnitOfWork, StoreError};

/// Schema for the callback table. Applied by [`PostgresCallbackStore::ensure_schema`].
pub const SCHEMA: &str = include_str!("../../migrations/0001_create_api_callbacks.sql");

/// Postgres-backed callback store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`; clones share the pool.
///
/// ## Uniqueness
///
/// `api_callbacks.public_id` carries a unique index. Two transactions racing
/// to create the same `public_id` serialize on that index and the loser's
/// `INSERT` fails with SQLSTATE `23505`.
#[derive(Debug, Clone)]
pub struct PostgresCallbackStore {
    pool: Arc<PgPool>,
}

impl PostgresCallbackStore {
    /// Create a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and build a store.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Create the callback table and its indexes if they do not exist.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CallbackStore for PostgresCallbackStore {
    async fn begin(&self) -> Result<Box<dyn CallbackUnitOfWork>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}

/// A unit of work backed by a single Postgres transaction.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl CallbackUnitOfWork for PostgresUnitOfWork {
    #[instrument(skip(self), fields(public_id = %public_id, found = tracing::field::Empty))]
    async fn find_by_public_id(
        &mut self,
        public_id: CallbackId,
    ) -> Result<Option<CallbackRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                public_id,
                application_key,
                api_type,
                api_version,
                relative_callback_uri
            FROM api_callbacks
            WHERE public_id = $1
            "#,
        )
        .bind(public_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_by_public_id", e))?;

        let record = row.as_ref().map(record_from_row).transpose()?;
        Span::current().record("found", record.is_some());
        Ok(record)
    }

    #[instrument(skip(self, callback), fields(application_key = %application_key, public_id = %callback.public_id))]
    async fn insert(
        &mut self,
        application_key: &ApplicationKey,
        callback: &ApiCallback,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO api_callbacks (
                public_id,
                application_key,
                api_type,
                api_version,
                relative_callback_uri
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(callback.public_id.as_uuid())
        .bind(application_key.as_str())
        .bind(&callback.api_type)
        .bind(&callback.api_version)
        .bind(&callback.relative_callback_uri)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_callback", e))?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(id = record.id, public_id = %record.public_id))]
    async fn update(&mut self, record: &CallbackRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE api_callbacks
            SET
                application_key = $2,
                api_type = $3,
                api_version = $4,
                relative_callback_uri = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(record.application_key.as_str())
        .bind(&record.api_type)
        .bind(&record.api_version)
        .bind(&record.relative_callback_uri)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_callback", e))?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(id = record.id, public_id = %record.public_id))]
    async fn delete(&mut self, record: &CallbackRecord) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM api_callbacks WHERE id = $1")
            .bind(record.id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_callback", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(application_key = %application_key))]
    async fn query_by_application_key(
        &mut self,
        application_key: &ApplicationKey,
    ) -> Result<Vec<CallbackRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                public_id,
                application_key,
                api_type,
                api_version,
                relative_callback_uri
            FROM api_callbacks
            WHERE application_key = $1
            "#,
        )
        .bind(application_key.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("query_by_application_key", e))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PostgresUnitOfWork { tx } = *self;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

fn record_from_row(row: &PgRow) -> Result<CallbackRecord, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Database(format!("failed to decode callback row: {e}"));

    let application_key: String = row.try_get("application_key").map_err(decode)?;
    Ok(CallbackRecord {
        id: row.try_get("id").map_err(decode)?,
        public_id: CallbackId::from_uuid(row.try_get::<uuid::Uuid, _>("public_id").map_err(decode)?),
        application_key: ApplicationKey::parse(application_key)
            .map_err(|e| StoreError::Database(format!("stored application_key is invalid: {e}")))?,
        api_type: row.try_get("api_type").map_err(decode)?,
        api_version: row.try_get("api_version").map_err(decode)?,
        relative_callback_uri: row.try_get("relative_callback_uri").map_err(decode)?,
    })
}

/// Map a SQLx error to a `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::UniqueViolation(msg),
                Some(code) if code.starts_with("23") => StoreError::ConstraintViolation(msg),
                Some(code) if code.starts_with("08") => StoreError::Connection(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Connection(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Connection(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Connection(format!("io error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => StoreError::Connection(format!("tls error in {}: {}", operation, e)),
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    //! The database tests need a disposable PostgreSQL instance and are
    //! ignored by default. Run them with
    //! `DATABASE_URL=... cargo test -p homepage-infra -- --ignored`.

    use super::*;

    async fn store() -> PostgresCallbackStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
        let store = PostgresCallbackStore::connect(&url)
            .await
            .expect("failed to connect to DATABASE_URL");
        store.ensure_schema().await.expect("failed to apply schema");
        store
    }

    fn app(key: &str) -> ApplicationKey {
        ApplicationKey::parse(key).unwrap()
    }

    #[test]
    fn non_database_errors_map_to_connection_or_database() {
        assert!(map_sqlx_error("op", sqlx::Error::PoolClosed).is_connection());
        assert!(map_sqlx_error("op", sqlx::Error::PoolTimedOut).is_connection());
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn insert_find_update_delete() {
        let store = store().await;
        let id = CallbackId::new();
        let key = app(&format!("pg-test-{}", CallbackId::new()));

        let mut uow = store.begin().await.unwrap();
        uow.insert(&key, &ApiCallback::new(id, "card", "1", "/a")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let mut record = uow.find_by_public_id(id).await.unwrap().unwrap();
        assert_eq!(record.application_key, key);
        record.api_version = "2".to_string();
        uow.update(&record).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let rows = uow.query_by_application_key(&key).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].api_version, "2");
        uow.delete(&rows[0]).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_by_public_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_public_id_is_a_unique_violation() {
        let store = store().await;
        let id = CallbackId::new();
        let key = app("pg-dup");

        let mut uow = store.begin().await.unwrap();
        uow.insert(&key, &ApiCallback::new(id, "card", "1", "/a")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let err = uow
            .insert(&key, &ApiCallback::new(id, "card", "1", "/a"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn dropped_transaction_rolls_back() {
        let store = store().await;
        let id = CallbackId::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert(&app("pg-rollback"), &ApiCallback::new(id, "card", "1", "/a"))
                .await
                .unwrap();
        }
        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_by_public_id(id).await.unwrap().is_none());
    }
}
