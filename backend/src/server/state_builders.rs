//! Builders choosing the resident store behind the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use resident_directory::inbound::http::state::HttpState;
use resident_directory::outbound::memory::InMemoryResidentRepository;
use resident_directory::outbound::persistence::{
    DbPool, DieselResidentRepository, PoolConfig, run_pending_migrations,
};

use super::ServerSettings;

/// Store backing the HTTP state.
pub enum ResidentStore {
    Postgres(DbPool),
    InMemory,
}

/// Connect to PostgreSQL when configured, otherwise fall back to memory.
///
/// # Errors
/// Returns [`std::io::Error`] when migrations or pool construction fail.
pub async fn connect_store(settings: &ServerSettings) -> std::io::Result<ResidentStore> {
    let Some(database_url) = settings.database_url() else {
        warn!("no database_url configured; residents are kept in memory and lost on restart");
        return Ok(ResidentStore::InMemory);
    };

    if settings.run_migrations() {
        run_pending_migrations(database_url)
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
    }

    let config = PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
    let pool = DbPool::new(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(max_connections = settings.db_max_connections(), "connected to PostgreSQL");
    Ok(ResidentStore::Postgres(pool))
}

/// Wire domain services over the selected store.
pub fn build_http_state(store: ResidentStore) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match store {
        ResidentStore::Postgres(pool) => {
            HttpState::from_repository(Arc::new(DieselResidentRepository::new(pool, clock)))
        }
        ResidentStore::InMemory => {
            HttpState::from_repository(Arc::new(InMemoryResidentRepository::new(clock)))
        }
    }
}
