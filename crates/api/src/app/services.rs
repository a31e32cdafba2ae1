use std::sync::Arc;

use forumhub_infra::{
    config::DatabaseSettings, ForumStore, InMemoryStore, MongoStore, SharedStore, StoreBackend,
};

/// Process-scoped services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    store: SharedStore,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Open the configured store once at startup.
    pub async fn from_settings(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        match settings.backend {
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on exit");
                Ok(Self::in_memory())
            }
            StoreBackend::Mongo => {
                let store = MongoStore::connect(settings).await?;
                // The driver reconnects lazily, so an unreachable cluster is not fatal here.
                if let Err(e) = store.ping().await {
                    tracing::warn!("document store ping failed: {e}");
                }
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    pub fn store(&self) -> &dyn ForumStore {
        self.store.as_ref()
    }
}
