//! Driving port for single-record resident mutations.

use async_trait::async_trait;

use crate::domain::{Error, Resident, ResidentFields, ResidentId, ResidentPatch};

/// Domain use-case port for creating, updating and deleting residents.
#[async_trait]
pub trait ResidentsCommand: Send + Sync {
    /// Validate and persist a new resident.
    ///
    /// Fails with `invalid_request` for empty required fields and `conflict`
    /// when the plate or permit number is already taken.
    async fn create_resident(&self, fields: ResidentFields) -> Result<Resident, Error>;

    /// Apply a partial update, re-checking both uniqueness constraints.
    async fn update_resident(&self, id: &ResidentId, patch: ResidentPatch)
    -> Result<Resident, Error>;

    /// Delete a resident. Unknown identifiers are not an error.
    async fn delete_resident(&self, id: &ResidentId) -> Result<(), Error>;
}
