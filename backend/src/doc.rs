//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every resident endpoint, the health probes and the
//! shared error envelope. Swagger UI serves it at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::residents::{DeleteResponse, ResidentRequest, ResidentResponse};
use crate::inbound::http::sync::{SyncRequest, SyncResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Resident directory API",
        description = "Resident records for gated-community access control: CRUD, search and offline sync."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::residents_health,
        crate::inbound::http::residents::list_residents,
        crate::inbound::http::residents::search_residents,
        crate::inbound::http::residents::get_resident,
        crate::inbound::http::residents::create_resident,
        crate::inbound::http::residents::update_resident,
        crate::inbound::http::residents::delete_resident,
        crate::inbound::http::sync::sync_residents,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        HealthStatus,
        ResidentRequest,
        ResidentResponse,
        DeleteResponse,
        SyncRequest,
        SyncResponse
    )),
    tags(
        (name = "residents", description = "Resident records and bulk synchronisation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
