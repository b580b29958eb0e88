use std::sync::Arc;

use homepage_infra::{
    CallbackRegistry, CallbackStore, InMemoryCallbackStore, PostgresCallbackStore, StoreError,
};

use crate::config::ApiConfig;

/// Which backend serves the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    InMemory,
    Postgres,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::InMemory => "in-memory",
            StoreKind::Postgres => "postgres",
        }
    }
}

/// Shared request-independent state: the registry over its store.
#[derive(Clone)]
pub struct AppServices {
    pub registry: CallbackRegistry<Arc<dyn CallbackStore>>,
    pub store_kind: StoreKind,
}

impl AppServices {
    pub fn new(store: Arc<dyn CallbackStore>, store_kind: StoreKind) -> Self {
        Self {
            registry: CallbackRegistry::new(store),
            store_kind,
        }
    }

    pub fn in_memory(store: InMemoryCallbackStore) -> Self {
        Self::new(Arc::new(store), StoreKind::InMemory)
    }

    /// Connect to PostgreSQL and make sure the callback table exists.
    pub async fn postgres(database_url: &str) -> Result<Self, StoreError> {
        let store = PostgresCallbackStore::connect(database_url).await?;
        store.ensure_schema().await?;
        Ok(Self::new(Arc::new(store), StoreKind::Postgres))
    }

    pub fn store(&self) -> &Arc<dyn CallbackStore> {
        self.registry.store()
    }
}

/// PostgreSQL when `DATABASE_URL` is configured, in-memory otherwise.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("using PostgreSQL callback store");
            AppServices::postgres(url).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set; callbacks are kept in memory and lost on restart");
            Ok(AppServices::in_memory(InMemoryCallbackStore::new()))
        }
    }
}
