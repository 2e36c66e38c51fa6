//! Driving port for resident reads.
//!
//! Inbound adapters use this port to list, look up and search residents
//! without depending on the persistence adapter behind it.

use async_trait::async_trait;

use crate::domain::{Error, Resident, ResidentId, ResidentSearch};

/// Domain use-case port for reading residents.
#[async_trait]
pub trait ResidentsQuery: Send + Sync {
    /// Every resident, most recently updated first.
    async fn list_residents(&self) -> Result<Vec<Resident>, Error>;

    /// Residents matching the filter.
    async fn search_residents(&self, filter: &ResidentSearch) -> Result<Vec<Resident>, Error>;

    /// A single resident; fails with `not_found` when absent.
    async fn find_resident(&self, id: &ResidentId) -> Result<Resident, Error>;
}
