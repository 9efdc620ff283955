use std::sync::Arc;

use tracing::info;

use mostrador_store::{InMemoryStore, OrderLedger, OrderStore, PostgresStore};

/// Everything the handlers need, built once at startup and cloned per
/// request via an `Extension` layer.
#[derive(Clone)]
pub struct AppServices {
    pub ledger: OrderLedger,
    pub store: Arc<dyn OrderStore>,
}

impl AppServices {
    pub fn with_store(store: Arc<dyn OrderStore>) -> Self {
        Self {
            ledger: OrderLedger::new(Arc::clone(&store)),
            store,
        }
    }

    /// Volatile backend for development and tests.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()))
    }

    /// Backend selection: `DATABASE_URL` set means Postgres (with migrations
    /// applied on startup), unset means in-memory.
    pub async fn from_env() -> anyhow::Result<Self> {
        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                let store = PostgresStore::connect(&url).await?;
                store.migrate().await?;
                info!("using postgres backend");
                Ok(Self::with_store(Arc::new(store)))
            }
            Err(_) => {
                info!("DATABASE_URL not set, using in-memory backend");
                Ok(Self::in_memory())
            }
        }
    }
}
