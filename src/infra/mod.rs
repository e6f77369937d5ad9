pub mod db;
pub mod memory;
pub mod postgres;
pub mod store;

use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::infra::db::Db;
use crate::infra::memory::MemoryStore;
use crate::infra::store::Store;

/// Picks the backend from configuration: PostgreSQL when `DATABASE_URL` is
/// set, otherwise a process-local store that does not survive restarts.
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    match &config.database_url {
        Some(url) => {
            let db = Db::connect(config, url).await?;
            tracing::info!("connected to postgres");
            Ok(Arc::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
