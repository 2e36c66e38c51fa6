//! Resident directory domain service.
//!
//! Implements the read and single-record write ports on top of a
//! [`ResidentRepository`]. Inputs arrive already normalised; this service
//! validates them, delegates persistence and maps store failures onto
//! transport-agnostic [`Error`] values.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{
    ResidentRepository, ResidentRepositoryError, ResidentsCommand, ResidentsQuery,
};
use crate::domain::{
    Error, Resident, ResidentDraft, ResidentFields, ResidentId, ResidentPatch, ResidentSearch,
    ResidentValidationError, UniqueField,
};

/// Detail code attached to validation failures for empty attributes.
pub const EMPTY_FIELD_CODE: &str = "empty_field";
/// Detail code attached to uniqueness conflicts.
pub const DUPLICATE_VALUE_CODE: &str = "duplicate_value";

/// Map a repository failure onto a domain error.
pub(crate) fn map_repository_error(error: ResidentRepositoryError) -> Error {
    match error {
        ResidentRepositoryError::Connection { message } => {
            tracing::warn!(%message, "resident store unreachable");
            Error::service_unavailable(format!("resident repository unavailable: {message}"))
        }
        ResidentRepositoryError::Query { message } => {
            tracing::error!(%message, "resident store query failed");
            Error::internal(format!("resident repository error: {message}"))
        }
        ResidentRepositoryError::Duplicate { field } => duplicate_error(field),
        ResidentRepositoryError::NotFound { id } => {
            Error::not_found(format!("resident {id} not found"))
        }
    }
}

/// Conflict raised when a plate or permit number is already taken.
pub(crate) fn duplicate_error(field: UniqueField) -> Error {
    Error::conflict(format!("a resident with this {field} already exists")).with_details(json!({
        "field": field.as_str(),
        "code": DUPLICATE_VALUE_CODE,
    }))
}

/// Bad request raised when resident attributes fail validation.
pub(crate) fn validation_error(error: ResidentValidationError) -> Error {
    match error {
        ResidentValidationError::EmptyField { field } => {
            Error::invalid_request(error.to_string()).with_details(json!({
                "field": field.as_str(),
                "code": EMPTY_FIELD_CODE,
            }))
        }
        ResidentValidationError::InvalidId => Error::invalid_request(error.to_string()),
    }
}

/// Resident service implementing the read and write driving ports.
#[derive(Clone)]
pub struct ResidentDirectoryService<R> {
    repo: Arc<R>,
}

impl<R> ResidentDirectoryService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> ResidentDirectoryService<R>
where
    R: ResidentRepository,
{
    async fn load(&self, id: &ResidentId) -> Result<Resident, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("resident {id} not found")))
    }
}

#[async_trait]
impl<R> ResidentsQuery for ResidentDirectoryService<R>
where
    R: ResidentRepository,
{
    async fn list_residents(&self) -> Result<Vec<Resident>, Error> {
        self.repo.find_all().await.map_err(map_repository_error)
    }

    async fn search_residents(&self, filter: &ResidentSearch) -> Result<Vec<Resident>, Error> {
        if filter.is_unconstrained() {
            return self.list_residents().await;
        }
        self.repo.search(filter).await.map_err(map_repository_error)
    }

    async fn find_resident(&self, id: &ResidentId) -> Result<Resident, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<R> ResidentsCommand for ResidentDirectoryService<R>
where
    R: ResidentRepository,
{
    async fn create_resident(&self, fields: ResidentFields) -> Result<Resident, Error> {
        let draft = ResidentDraft::try_from(fields).map_err(validation_error)?;
        let resident = self
            .repo
            .insert(&draft)
            .await
            .map_err(map_repository_error)?;
        tracing::info!(resident_id = %resident.id(), "resident created");
        Ok(resident)
    }

    async fn update_resident(
        &self,
        id: &ResidentId,
        patch: ResidentPatch,
    ) -> Result<Resident, Error> {
        let current = self.load(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let draft = current.draft().apply(&patch).map_err(validation_error)?;
        let resident = self
            .repo
            .replace(id, &draft)
            .await
            .map_err(map_repository_error)?;
        tracing::info!(resident_id = %resident.id(), "resident updated");
        Ok(resident)
    }

    async fn delete_resident(&self, id: &ResidentId) -> Result<(), Error> {
        self.repo.delete(id).await.map_err(map_repository_error)?;
        tracing::info!(resident_id = %id, "resident deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "resident_service_tests.rs"]
mod tests;
