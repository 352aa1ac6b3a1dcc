use std::sync::Arc;

use tracing::info;

use crate::{
    auth::repo::{PgUserRepo, UserRepo},
    books::repo::{BookRepo, PgBookRepo},
    config::{AppConfig, AuthConfig, DatabaseConfig, MEMORY_URL_PREFIX},
    contact::repo::{ContactRepo, PgContactRepo},
    db,
    memory::MemoryStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub books: Arc<dyn BookRepo>,
    pub contact: Arc<dyn ContactRepo>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        if config.database.is_memory() {
            info!("using in-memory store");
            return Ok(Self::with_memory(config, Arc::new(MemoryStore::new())));
        }

        let pool = db::connect(&config.database).await?;
        Ok(Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            books: Arc::new(PgBookRepo::new(pool.clone())),
            contact: Arc::new(PgContactRepo::new(pool)),
            config,
        })
    }

    pub fn with_memory(config: Arc<AppConfig>, store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            books: store.clone(),
            contact: store,
            config,
        }
    }

    /// In-memory state with default settings, for tests and local runs.
    pub fn fake() -> Self {
        Self::fake_with(false).0
    }

    /// Like `fake`, also handing back the store for direct inspection.
    pub fn fake_with(hash_passwords: bool) -> (Self, Arc<MemoryStore>) {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database: DatabaseConfig {
                url: MEMORY_URL_PREFIX.into(),
                max_connections: 1,
            },
            auth: AuthConfig { hash_passwords },
        });
        let store = Arc::new(MemoryStore::new());
        (Self::with_memory(config, store.clone()), store)
    }
}
