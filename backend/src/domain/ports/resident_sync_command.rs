//! Driving port for bulk resident synchronisation.
//!
//! Offline-capable clients push whole batches of resident records. Records
//! that collide with existing plates or permits are an expected part of
//! synchronisation, so they are counted rather than reported as failures.

use async_trait::async_trait;

use crate::domain::{Error, Resident, ResidentField, SyncPayload, UniqueField};

/// Why a candidate of a sync batch was not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRejection {
    /// A required attribute was empty after normalisation.
    Invalid { field: ResidentField },
    /// The plate or permit number is already taken.
    Duplicate { field: UniqueField },
    /// The store failed to write the candidate.
    Failed { message: String },
}

/// A candidate that was not persisted, identified by its batch position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCandidate {
    pub index: usize,
    pub reason: SyncRejection,
}

/// Outcome of a synchronisation push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentSyncReport {
    /// Residents persisted by this push, in batch order.
    pub inserted: Vec<Resident>,
    /// Candidates that were skipped, in batch order.
    pub rejected: Vec<RejectedCandidate>,
}

impl ResidentSyncReport {
    /// Exact number of residents the store confirmed as persisted.
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }

    /// Number of candidates that were not persisted.
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Domain use-case port for bulk synchronisation.
#[async_trait]
pub trait ResidentSyncCommand: Send + Sync {
    /// Normalise and insert every candidate under unordered semantics.
    ///
    /// Only an unreachable store fails the whole push; an all-duplicate
    /// batch is a successful push with nothing inserted.
    async fn sync(&self, payload: SyncPayload) -> Result<ResidentSyncReport, Error>;
}
