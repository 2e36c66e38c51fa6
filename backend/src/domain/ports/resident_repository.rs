//! Port for resident persistence.
//!
//! The store owns every persisted resident and enforces two independent
//! uniqueness constraints: `carPlate` and `permitNumber`. Each insert is
//! atomic with respect to both constraints. Bulk inserts are unordered: a
//! rejected record never prevents attempts on the records after it.

use async_trait::async_trait;

use crate::domain::{Resident, ResidentDraft, ResidentId, ResidentSearch, UniqueField};

use super::define_port_error;

define_port_error! {
    /// Errors raised by resident repository adapters.
    pub enum ResidentRepositoryError {
        /// The store could not be reached.
        Connection { message: String } => "resident repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "resident repository query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Duplicate { field: UniqueField } => "a resident with this {field} already exists",
        /// No resident has the requested identifier.
        NotFound { id: ResidentId } => "resident {id} not found",
    }
}

/// Why the store refused one record of a bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertRejection {
    /// The record collided with an existing value or an earlier record of
    /// the same batch.
    Duplicate { field: UniqueField },
    /// The store failed to write the record for another reason.
    Failed { message: String },
}

/// Per-record result of a bulk insert, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Resident),
    Rejected(InsertRejection),
}

impl InsertOutcome {
    /// The persisted resident, if the insert succeeded.
    pub fn inserted(&self) -> Option<&Resident> {
        match self {
            Self::Inserted(resident) => Some(resident),
            Self::Rejected(_) => None,
        }
    }
}

/// Port for resident storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResidentRepository: Send + Sync {
    /// Persist a new resident, assigning its identifier and timestamps.
    ///
    /// Fails with [`ResidentRepositoryError::Duplicate`] naming the first
    /// colliding field, checking `carPlate` before `permitNumber`.
    async fn insert(&self, draft: &ResidentDraft) -> Result<Resident, ResidentRepositoryError>;

    /// Attempt every draft independently and report one outcome per draft.
    ///
    /// Only an unreachable store before anything was written surfaces as an
    /// `Err`; once writes have started, later failures become
    /// [`InsertRejection::Failed`] outcomes so the caller can count exactly
    /// what was persisted.
    async fn insert_many(
        &self,
        drafts: &[ResidentDraft],
    ) -> Result<Vec<InsertOutcome>, ResidentRepositoryError>;

    /// All residents, most recently updated first.
    async fn find_all(&self) -> Result<Vec<Resident>, ResidentRepositoryError>;

    /// Fetch a resident by identifier.
    async fn find_by_id(&self, id: &ResidentId) -> Result<Option<Resident>, ResidentRepositoryError>;

    /// Residents matching every constraint of the filter.
    async fn search(&self, filter: &ResidentSearch) -> Result<Vec<Resident>, ResidentRepositoryError>;

    /// Replace the attributes of an existing resident and bump `updated_at`.
    ///
    /// Uniqueness is checked against every other resident; keeping the
    /// record's own plate or permit is not a collision.
    async fn replace(
        &self,
        id: &ResidentId,
        draft: &ResidentDraft,
    ) -> Result<Resident, ResidentRepositoryError>;

    /// Remove a resident. Removing an unknown identifier succeeds.
    async fn delete(&self, id: &ResidentId) -> Result<(), ResidentRepositoryError>;
}
