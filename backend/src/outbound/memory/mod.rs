//! In-process resident store.
//!
//! Backs tests and database-less runs. It enforces the same uniqueness
//! rules as the PostgreSQL adapter.

mod in_memory_resident_repository;

pub use in_memory_resident_repository::InMemoryResidentRepository;
