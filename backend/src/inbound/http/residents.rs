//! Resident directory API handlers.
//!
//! ```text
//! GET    /api/residents
//! GET    /api/residents/search?section=GH1&carPlate=AB%20123
//! GET    /api/residents/{id}
//! POST   /api/residents            {"fullName":"Jane Doe", ...}
//! PUT    /api/residents/{id}       {"door":"14"}
//! DELETE /api/residents/{id}
//! ```
//!
//! Bodies are accepted as free-form JSON objects and normalised by the
//! domain, so older clients sending numbers or legacy field names keep
//! working.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    Error, Resident, ResidentId, ResidentSearch, ResidentSearchParams, normalise_candidate,
    normalise_patch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::malformed_payload;
use crate::inbound::http::state::HttpState;

/// Resident record as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentResponse {
    pub id: Uuid,
    #[schema(example = "jane doe")]
    pub full_name: String,
    #[schema(example = "GH1")]
    pub section: String,
    #[schema(example = "B")]
    pub building: String,
    #[schema(example = "12")]
    pub door: String,
    #[schema(example = "ab 123")]
    pub car_plate: String,
    #[schema(example = "M1")]
    pub permit_number: String,
    pub phone_primary: String,
    /// `null` when the resident has no secondary number.
    pub phone_secondary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Resident> for ResidentResponse {
    fn from(resident: &Resident) -> Self {
        let draft = resident.draft();
        Self {
            id: *resident.id().as_uuid(),
            full_name: draft.full_name().to_owned(),
            section: draft.section().to_owned(),
            building: draft.building().to_owned(),
            door: draft.door().to_owned(),
            car_plate: draft.car_plate().to_owned(),
            permit_number: draft.permit_number().to_owned(),
            phone_primary: draft.phone_primary().to_owned(),
            phone_secondary: draft.phone_secondary().map(str::to_owned),
            created_at: resident.created_at(),
            updated_at: resident.updated_at(),
        }
    }
}

impl From<Resident> for ResidentResponse {
    fn from(resident: Resident) -> Self {
        Self::from(&resident)
    }
}

/// Documented shape of create and update bodies.
///
/// Any JSON object is accepted; values are trimmed and coerced to text.
/// `doorNumber` and `numeroDeMacaron` are accepted as aliases.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentRequest {
    #[schema(example = "Jane Doe")]
    pub full_name: Option<String>,
    pub section: Option<String>,
    pub building: Option<String>,
    pub door: Option<String>,
    #[schema(example = "AB 123")]
    pub car_plate: Option<String>,
    pub permit_number: Option<String>,
    pub phone_primary: Option<String>,
    pub phone_secondary: Option<String>,
}

/// Search query string. Every parameter is optional; blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub section: Option<String>,
    /// Only applied together with `door`.
    pub building: Option<String>,
    /// Only applied together with `building`.
    pub door: Option<String>,
    /// Legacy spelling of `door`; ignored when `door` is present.
    #[serde(rename = "doorNumber")]
    pub door_number: Option<String>,
    pub car_plate: Option<String>,
    pub permit_number: Option<String>,
    /// Legacy spelling of `permitNumber`; ignored when `permitNumber` is present.
    #[serde(rename = "numeroDeMacaron")]
    pub numero_de_macaron: Option<String>,
    /// Case-insensitive substring match.
    pub full_name: Option<String>,
}

impl From<SearchQuery> for ResidentSearch {
    fn from(query: SearchQuery) -> Self {
        ResidentSearch::from(ResidentSearchParams {
            section: query.section,
            building: query.building,
            door: query.door.or(query.door_number),
            car_plate: query.car_plate,
            permit_number: query.permit_number.or(query.numero_de_macaron),
            full_name: query.full_name,
        })
    }
}

/// Acknowledgement returned by delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

fn object_body(payload: Value) -> Result<Map<String, Value>, Error> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(malformed_payload("request body must be a JSON object")),
    }
}

/// Parse a path identifier; identifiers that cannot exist are "not found".
fn existing_id(raw: &str) -> Result<ResidentId, Error> {
    ResidentId::new(raw).map_err(|_| Error::not_found(format!("resident {raw} not found")))
}

fn respond_with_list(residents: Vec<Resident>) -> web::Json<Vec<ResidentResponse>> {
    web::Json(residents.iter().map(ResidentResponse::from).collect())
}

/// List every resident, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/residents",
    responses(
        (status = 200, description = "Residents", body = [ResidentResponse]),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["residents"],
    operation_id = "listResidents"
)]
#[get("")]
pub async fn list_residents(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ResidentResponse>>> {
    let residents = state.residents.list_residents().await?;
    Ok(respond_with_list(residents))
}

/// Search residents. Filters combine with AND.
#[utoipa::path(
    get,
    path = "/api/residents/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching residents", body = [ResidentResponse]),
        (status = 400, description = "Invalid query", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["residents"],
    operation_id = "searchResidents"
)]
#[get("/search")]
pub async fn search_residents(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<ResidentResponse>>> {
    let filter = ResidentSearch::from(query.into_inner());
    let residents = state.residents.search_residents(&filter).await?;
    Ok(respond_with_list(residents))
}

/// Fetch a single resident.
#[utoipa::path(
    get,
    path = "/api/residents/{id}",
    params(("id" = String, Path, description = "Resident identifier")),
    responses(
        (status = 200, description = "Resident", body = ResidentResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["residents"],
    operation_id = "getResident"
)]
#[get("/{id}")]
pub async fn get_resident(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ResidentResponse>> {
    let id = existing_id(&path)?;
    let resident = state.residents.find_resident(&id).await?;
    Ok(web::Json(resident.into()))
}

/// Register a resident.
#[utoipa::path(
    post,
    path = "/api/residents",
    request_body = ResidentRequest,
    responses(
        (status = 201, description = "Created", body = ResidentResponse),
        (status = 400, description = "Empty field or malformed body", body = Error),
        (status = 409, description = "Car plate or permit already registered", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["residents"],
    operation_id = "createResident"
)]
#[post("")]
pub async fn create_resident(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let body = object_body(payload.into_inner())?;
    let resident = state
        .residents_command
        .create_resident(normalise_candidate(&body))
        .await?;
    Ok(HttpResponse::Created().json(ResidentResponse::from(resident)))
}

/// Partially update a resident. Absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/residents/{id}",
    params(("id" = String, Path, description = "Resident identifier")),
    request_body = ResidentRequest,
    responses(
        (status = 200, description = "Updated", body = ResidentResponse),
        (status = 400, description = "Empty field or malformed body", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Car plate or permit already registered", body = Error)
    ),
    tags = ["residents"],
    operation_id = "updateResident"
)]
#[put("/{id}")]
pub async fn update_resident(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<ResidentResponse>> {
    let id = existing_id(&path)?;
    let body = object_body(payload.into_inner())?;
    let resident = state
        .residents_command
        .update_resident(&id, normalise_patch(&body))
        .await?;
    Ok(web::Json(resident.into()))
}

/// Delete a resident. Deleting an unknown resident still succeeds.
#[utoipa::path(
    delete,
    path = "/api/residents/{id}",
    params(("id" = String, Path, description = "Resident identifier")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["residents"],
    operation_id = "deleteResident"
)]
#[delete("/{id}")]
pub async fn delete_resident(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeleteResponse>> {
    // A malformed id names no resident, so there is nothing to delete.
    if let Ok(id) = ResidentId::new(path.as_str()) {
        state.residents_command.delete_resident(&id).await?;
    }
    Ok(web::Json(DeleteResponse { success: true }))
}

#[cfg(test)]
#[path = "residents_tests.rs"]
mod tests;
