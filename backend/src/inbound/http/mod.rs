//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod residents;
pub mod state;
pub mod sync;

use actix_web::web;

pub use crate::domain::ApiResult;

/// Mount point of the resident API.
pub const RESIDENTS_SCOPE: &str = "/api/residents";

/// Largest accepted JSON body; sync batches can hold thousands of records.
pub const JSON_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Register the resident API with its extractor configuration.
///
/// Literal routes are registered before `/{id}` so `search`, `sync` and
/// `health` never parse as identifiers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use resident_directory::inbound::http::{configure_residents, state::HttpState};
/// use resident_directory::outbound::memory::InMemoryResidentRepository;
///
/// let state = HttpState::from_repository(Arc::new(InMemoryResidentRepository::default()));
/// let _app = App::new()
///     .app_data(web::Data::new(state))
///     .configure(configure_residents);
/// ```
pub fn configure_residents(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(error::json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
    .service(
        web::scope(RESIDENTS_SCOPE)
            .service(health::residents_health)
            .service(residents::search_residents)
            .service(sync::sync_residents)
            .service(residents::list_residents)
            .service(residents::create_resident)
            .service(residents::get_resident)
            .service(residents::update_resident)
            .service(residents::delete_resident),
    );
}
