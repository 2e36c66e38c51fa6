//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ResidentRepository, ResidentSyncCommand, ResidentsCommand, ResidentsQuery};
use crate::domain::{ResidentDirectoryService, ResidentSyncService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub residents: Arc<dyn ResidentsQuery>,
    pub residents_command: Arc<dyn ResidentsCommand>,
    pub sync: Arc<dyn ResidentSyncCommand>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(
        residents: Arc<dyn ResidentsQuery>,
        residents_command: Arc<dyn ResidentsCommand>,
        sync: Arc<dyn ResidentSyncCommand>,
    ) -> Self {
        Self {
            residents,
            residents_command,
            sync,
        }
    }

    /// Wire the domain services over a single resident store.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use resident_directory::inbound::http::state::HttpState;
    /// use resident_directory::outbound::memory::InMemoryResidentRepository;
    ///
    /// let state = HttpState::from_repository(Arc::new(InMemoryResidentRepository::default()));
    /// let _query = state.residents.clone();
    /// ```
    pub fn from_repository<R>(repo: Arc<R>) -> Self
    where
        R: ResidentRepository + 'static,
    {
        let directory = Arc::new(ResidentDirectoryService::new(repo.clone()));
        Self {
            residents: directory.clone(),
            residents_command: directory,
            sync: Arc::new(ResidentSyncService::new(repo)),
        }
    }
}
