//! Domain primitives, services and ports.
//!
//! Purpose: define the resident directory model independently of any
//! transport or store. Inbound adapters drive the domain through the ports in
//! [`ports`]; outbound adapters implement [`ports::ResidentRepository`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Resident, ResidentDraft, ResidentId: the stored record and its parts.
//! - ResidentSearch: normalised search filter.
//! - SyncPayload: accepted bulk synchronisation shapes.
//! - ResidentDirectoryService / ResidentSyncService: driving port
//!   implementations.

pub mod error;
pub mod normalisation;
pub mod ports;
pub mod resident;
pub mod resident_search;
pub mod resident_service;
pub mod resident_sync_service;
pub mod sync_payload;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::normalisation::{
    coerce_text, normalise_candidate, normalise_patch, normalise_text, normalise_value,
};
pub use self::resident::{
    Resident, ResidentDraft, ResidentField, ResidentFields, ResidentId, ResidentPatch,
    ResidentValidationError, UniqueField,
};
pub use self::resident_search::{Location, ResidentSearch, ResidentSearchParams};
pub use self::resident_service::{
    DUPLICATE_VALUE_CODE, EMPTY_FIELD_CODE, ResidentDirectoryService,
};
pub use self::resident_sync_service::ResidentSyncService;
pub use self::sync_payload::{MalformedPayload, SyncPayload, WRAPPED_BATCH_KEY};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use resident_directory::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("missing"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
