//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the resident repository port backed by
//! PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! - **Thin adapters**: the repository only translates between Diesel rows
//!   and domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures are mapped to
//!   [`ResidentRepositoryError`](crate::domain::ports::ResidentRepositoryError).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mockable::DefaultClock;
//! use resident_directory::outbound::persistence::{DbPool, DieselResidentRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/residents")).await?;
//! let repo = DieselResidentRepository::new(pool, Arc::new(DefaultClock));
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_resident_repository;
mod migrations;
mod models;
mod pool;
mod resident_error_mapping;
mod schema;

pub use diesel_resident_repository::DieselResidentRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
