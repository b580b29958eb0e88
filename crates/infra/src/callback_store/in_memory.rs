use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use homepage_core::{ApiCallback, ApplicationKey, CallbackId};

use super::r#trait::{CallbackRecord, CallbackStore, CallbackUnitOfWork, StoreError};

#[derive(Debug, Default)]
struct Shared {
    rows: RwLock<HashMap<CallbackId, CallbackRecord>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
}

impl Shared {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}

/// In-memory callback store.
///
/// Intended for tests/dev. Units of work stage their writes locally and
/// apply them under the write lock on commit, so two units of work can both
/// observe a `public_id` as absent; the later commit then fails with
/// [`StoreError::UniqueViolation`], the same outcome a relational store's
/// unique index gives.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCallbackStore {
    shared: Arc<Shared>,
}

impl InMemoryCallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection to the store.
    pub fn set_available(&self, available: bool) {
        self.shared.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Committed records, in no particular order.
    pub fn snapshot(&self) -> Vec<CallbackRecord> {
        match self.shared.rows.read() {
            Ok(rows) => rows.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.shared.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CallbackStore for InMemoryCallbackStore {
    async fn begin(&self) -> Result<Box<dyn CallbackUnitOfWork>, StoreError> {
        self.shared.check_available()?;
        Ok(Box::new(InMemoryUnitOfWork {
            shared: self.shared.clone(),
            staged: Vec::new(),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.shared.check_available()
    }
}

#[derive(Debug, Clone)]
enum StagedWrite {
    Insert(CallbackRecord),
    Update(CallbackRecord),
    Delete { id: i64, public_id: CallbackId },
}

struct InMemoryUnitOfWork {
    shared: Arc<Shared>,
    staged: Vec<StagedWrite>,
}

impl InMemoryUnitOfWork {
    /// Committed rows with this unit's staged writes laid over them.
    fn view(&self) -> Result<HashMap<CallbackId, CallbackRecord>, StoreError> {
        self.shared.check_available()?;
        let mut rows = self
            .shared
            .rows
            .read()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))?
            .clone();
        for write in &self.staged {
            match write {
                StagedWrite::Insert(record) => {
                    rows.insert(record.public_id, record.clone());
                }
                StagedWrite::Update(record) => {
                    if rows.get(&record.public_id).is_some_and(|r| r.id == record.id) {
                        rows.insert(record.public_id, record.clone());
                    }
                }
                StagedWrite::Delete { id, public_id } => {
                    if rows.get(public_id).is_some_and(|r| r.id == *id) {
                        rows.remove(public_id);
                    }
                }
            }
        }
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl CallbackUnitOfWork for InMemoryUnitOfWork {
    async fn find_by_public_id(
        &mut self,
        public_id: CallbackId,
    ) -> Result<Option<CallbackRecord>, StoreError> {
        Ok(self.view()?.remove(&public_id))
    }

    async fn insert(
        &mut self,
        application_key: &ApplicationKey,
        callback: &ApiCallback,
    ) -> Result<(), StoreError> {
        self.shared.check_available()?;
        // Ids behave like a database sequence: consumed even if the unit rolls back.
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.staged.push(StagedWrite::Insert(CallbackRecord {
            id,
            public_id: callback.public_id,
            application_key: application_key.clone(),
            api_type: callback.api_type.clone(),
            api_version: callback.api_version.clone(),
            relative_callback_uri: callback.relative_callback_uri.clone(),
        }));
        Ok(())
    }

    async fn update(&mut self, record: &CallbackRecord) -> Result<(), StoreError> {
        self.shared.check_available()?;
        self.staged.push(StagedWrite::Update(record.clone()));
        Ok(())
    }

    async fn delete(&mut self, record: &CallbackRecord) -> Result<(), StoreError> {
        self.shared.check_available()?;
        self.staged.push(StagedWrite::Delete {
            id: record.id,
            public_id: record.public_id,
        });
        Ok(())
    }

    async fn query_by_application_key(
        &mut self,
        application_key: &ApplicationKey,
    ) -> Result<Vec<CallbackRecord>, StoreError> {
        Ok(self
            .view()?
            .into_values()
            .filter(|r| &r.application_key == application_key)
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryUnitOfWork { shared, staged } = *self;
        shared.check_available()?;
        if staged.is_empty() {
            return Ok(());
        }

        let mut rows = shared
            .rows
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))?;

        // Apply to a copy first so a failing write leaves the committed state untouched.
        let mut next = rows.clone();
        for write in staged {
            match write {
                StagedWrite::Insert(record) => {
                    if next.contains_key(&record.public_id) {
                        return Err(StoreError::UniqueViolation(format!(
                            "public_id {} already exists",
                            record.public_id
                        )));
                    }
                    next.insert(record.public_id, record);
                }
                // Updates and deletes of rows that vanished meanwhile affect zero rows.
                StagedWrite::Update(record) => {
                    if let Some(existing) = next.get_mut(&record.public_id) {
                        if existing.id == record.id {
                            *existing = record;
                        }
                    }
                }
                StagedWrite::Delete { id, public_id } => {
                    if next.get(&public_id).is_some_and(|r| r.id == id) {
                        next.remove(&public_id);
                    }
                }
            }
        }

        *rows = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(key: &str) -> ApplicationKey {
        ApplicationKey::parse(key).unwrap()
    }

    fn callback(id: CallbackId, version: &str) -> ApiCallback {
        ApiCallback::new(id, "card", version, "/api/card")
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible_to_others() {
        let store = InMemoryCallbackStore::new();
        let id = CallbackId::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert(&app("a"), &callback(id, "1")).await.unwrap();
        assert!(uow.find_by_public_id(id).await.unwrap().is_some());

        let mut other = store.begin().await.unwrap();
        assert!(other.find_by_public_id(id).await.unwrap().is_none());

        uow.commit().await.unwrap();
        let mut after = store.begin().await.unwrap();
        assert!(after.find_by_public_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropping_a_unit_of_work_rolls_back() {
        let store = InMemoryCallbackStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert(&app("a"), &callback(CallbackId::new(), "1")).await.unwrap();
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn second_concurrent_insert_fails_on_commit() {
        let store = InMemoryCallbackStore::new();
        let id = CallbackId::new();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        assert!(first.find_by_public_id(id).await.unwrap().is_none());
        assert!(second.find_by_public_id(id).await.unwrap().is_none());
        first.insert(&app("a"), &callback(id, "1")).await.unwrap();
        second.insert(&app("a"), &callback(id, "2")).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(err.is_unique_violation());

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].api_version, "1");
    }

    #[tokio::test]
    async fn failed_commit_applies_nothing() {
        let store = InMemoryCallbackStore::new();
        let taken = CallbackId::new();
        let mut seed = store.begin().await.unwrap();
        seed.insert(&app("a"), &callback(taken, "1")).await.unwrap();
        seed.commit().await.unwrap();

        let fresh = CallbackId::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert(&app("a"), &callback(fresh, "1")).await.unwrap();
        uow.insert(&app("a"), &callback(taken, "9")).await.unwrap();
        assert!(uow.commit().await.is_err());

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].public_id, taken);
    }

    #[tokio::test]
    async fn unavailable_store_refuses_work() {
        let store = InMemoryCallbackStore::new();
        store.set_available(false);
        let Err(err) = store.begin().await else {
            panic!("begin must fail while the store is unavailable");
        };
        assert!(err.is_connection());
        assert!(store.ping().await.is_err());

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn query_is_scoped_to_application_key() {
        let store = InMemoryCallbackStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert(&app("a"), &callback(CallbackId::new(), "1")).await.unwrap();
        uow.insert(&app("b"), &callback(CallbackId::new(), "1")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let rows = uow.query_by_application_key(&app("a")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].application_key, app("a"));
    }
}
