//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod resident_repository;
mod resident_sync_command;
mod residents_command;
mod residents_query;

#[cfg(test)]
pub use resident_repository::MockResidentRepository;
pub use resident_repository::{
    InsertOutcome, InsertRejection, ResidentRepository, ResidentRepositoryError,
};
pub use resident_sync_command::{
    RejectedCandidate, ResidentSyncCommand, ResidentSyncReport, SyncRejection,
};
pub use residents_command::ResidentsCommand;
pub use residents_query::ResidentsQuery;
