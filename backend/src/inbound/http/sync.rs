//! Bulk synchronisation endpoint for offline-capable clients.
//!
//! ```text
//! POST /api/residents/sync [{...}, {...}]
//! POST /api/residents/sync {"residents": [{...}, {...}]}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::ResidentSyncReport;
use crate::domain::{Error, SyncPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::malformed_payload;
use crate::inbound::http::residents::{ResidentRequest, ResidentResponse};
use crate::inbound::http::state::HttpState;

/// Documented sync body: `{"residents": [...]}`. A bare array is accepted too.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncRequest {
    pub residents: Vec<ResidentRequest>,
}

/// Sync outcome. Duplicates are skipped and counted, never reported as errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    #[schema(example = 1)]
    pub inserted_count: usize,
    #[schema(example = 0)]
    pub rejected_count: usize,
    /// Residents inserted by this push.
    pub residents: Vec<ResidentResponse>,
}

impl From<ResidentSyncReport> for SyncResponse {
    fn from(report: ResidentSyncReport) -> Self {
        Self {
            inserted_count: report.inserted_count(),
            rejected_count: report.rejected_count(),
            residents: report.inserted.iter().map(ResidentResponse::from).collect(),
        }
    }
}

/// Push a batch of residents collected offline.
#[utoipa::path(
    post,
    path = "/api/residents/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Batch processed", body = SyncResponse),
        (status = 400, description = "Body is neither an array nor a wrapped array", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["residents"],
    operation_id = "syncResidents"
)]
#[post("/sync")]
pub async fn sync_residents(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<SyncResponse>> {
    let payload =
        SyncPayload::try_from(payload.into_inner()).map_err(|err| malformed_payload(err.to_string()))?;
    let report = state.sync.sync(payload).await?;
    Ok(web::Json(report.into()))
}
