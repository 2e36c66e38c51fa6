//! End-to-end checks for the resident API wired the way the server wires it.
//!
//! The app is assembled from the public crate surface: trace middleware, the
//! resident routes and either the in-memory store or deterministic test
//! doubles for the driving ports.

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use resident_directory::Trace;
use resident_directory::domain::ports::{
    ResidentSyncCommand, ResidentSyncReport, ResidentsCommand, ResidentsQuery,
};
use resident_directory::domain::{
    Error, Resident, ResidentFields, ResidentId, ResidentPatch, ResidentSearch, SyncPayload,
};
use resident_directory::inbound::http::configure_residents;
use resident_directory::inbound::http::state::HttpState;
use resident_directory::outbound::memory::InMemoryResidentRepository;
use resident_directory::test_support::SteppingClock;
use rstest::rstest;
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

fn in_memory_state() -> web::Data<HttpState> {
    let repo = InMemoryResidentRepository::new(Arc::new(SteppingClock::per_second()));
    web::Data::new(HttpState::from_repository(Arc::new(repo)))
}

macro_rules! app_with {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .wrap(Trace)
                .configure(configure_residents),
        )
        .await
    };
}

fn resident(full_name: &str, car_plate: &str, permit_number: &str) -> Value {
    json!({
        "fullName": full_name,
        "section": "GH1",
        "building": "A",
        "door": "1",
        "carPlate": car_plate,
        "permitNumber": permit_number,
        "phonePrimary": "0600000000",
    })
}

// -----------------------------------------------------------------------------
// Test doubles for driving ports
// -----------------------------------------------------------------------------

/// Store that is always unreachable, recording the batches it was offered.
#[derive(Clone, Default)]
struct OfflineStore {
    batches: Arc<Mutex<Vec<usize>>>,
}

impl OfflineStore {
    fn batches(&self) -> Vec<usize> {
        self.batches.lock().expect("batches lock").clone()
    }

    fn unavailable() -> Error {
        Error::service_unavailable("resident store unavailable")
    }
}

#[async_trait]
impl ResidentsQuery for OfflineStore {
    async fn list_residents(&self) -> Result<Vec<Resident>, Error> {
        Err(Self::unavailable())
    }

    async fn search_residents(&self, _filter: &ResidentSearch) -> Result<Vec<Resident>, Error> {
        Err(Self::unavailable())
    }

    async fn find_resident(&self, _id: &ResidentId) -> Result<Resident, Error> {
        Err(Self::unavailable())
    }
}

#[async_trait]
impl ResidentsCommand for OfflineStore {
    async fn create_resident(&self, _fields: ResidentFields) -> Result<Resident, Error> {
        Err(Self::unavailable())
    }

    async fn update_resident(
        &self,
        _id: &ResidentId,
        _patch: ResidentPatch,
    ) -> Result<Resident, Error> {
        Err(Self::unavailable())
    }

    async fn delete_resident(&self, _id: &ResidentId) -> Result<(), Error> {
        Err(Self::unavailable())
    }
}

#[async_trait]
impl ResidentSyncCommand for OfflineStore {
    async fn sync(&self, payload: SyncPayload) -> Result<ResidentSyncReport, Error> {
        self.batches
            .lock()
            .expect("batches lock")
            .push(payload.candidates().len());
        Err(Self::unavailable())
    }
}

fn offline_state(store: &OfflineStore) -> web::Data<HttpState> {
    let shared = Arc::new(store.clone());
    web::Data::new(HttpState::new(shared.clone(), shared.clone(), shared))
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[actix_rt::test]
async fn sync_skips_a_duplicate_already_in_the_directory() {
    let app = app_with!(in_memory_state());
    let existing = json!({
        "fullName": "Existing Resident",
        "section": "GH1",
        "building": "A",
        "door": "1",
        "carPlate": "AB 123",
        "permitNumber": "M1",
        "phonePrimary": "0600000000",
    });
    let req = test::TestRequest::post()
        .uri("/api/residents")
        .set_json(existing)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let batch = json!([
        {
            "fullName": "Plate Clash",
            "section": "GH1",
            "building": "A",
            "door": "2",
            "carPlate": "ab 123",
            "permitNumber": "M2",
            "phonePrimary": "0611111111",
        },
        {
            "fullName": "New Resident",
            "section": "GH2",
            "building": "C",
            "door": "3",
            "carPlate": "CD 456",
            "permitNumber": "M3",
            "phonePrimary": "0622222222",
        },
    ]);
    let req = test::TestRequest::post()
        .uri("/api/residents/sync")
        .set_json(batch)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["insertedCount"], 1);
    assert_eq!(body["rejectedCount"], 1);
    assert_eq!(body["residents"][0]["fullName"], "new resident");

    let req = test::TestRequest::get().uri("/api/residents").to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 2);
}

#[actix_rt::test]
async fn sync_accepts_wrapped_batches_with_in_batch_duplicates() {
    let app = app_with!(in_memory_state());
    let resident = json!({
        "fullName": "Jane",
        "section": "GH1",
        "building": "B",
        "doorNumber": 12,
        "carPlate": "XY 1",
        "numeroDeMacaron": "P-9",
        "phonePrimary": "0600000000",
    });
    let req = test::TestRequest::post()
        .uri("/api/residents/sync")
        .set_json(json!({ "residents": [resident.clone(), resident] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["insertedCount"], 1);
    assert_eq!(body["rejectedCount"], 1);
    assert_eq!(body["residents"][0]["door"], "12");
    assert_eq!(body["residents"][0]["permitNumber"], "P-9");
}

#[actix_rt::test]
async fn sync_of_only_known_plates_and_permits_inserts_nothing() {
    let app = app_with!(in_memory_state());
    let req = test::TestRequest::post()
        .uri("/api/residents")
        .set_json(resident("Existing Resident", "AB 123", "M1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let batch = json!([
        resident("Plate Clash", "ab 123", "M2"),
        resident("Permit Clash", "ZZ 999", "M1"),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/residents/sync")
        .set_json(batch)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["insertedCount"], 0);
    assert_eq!(body["rejectedCount"], 2);
    assert_eq!(body["residents"], json!([]));

    let req = test::TestRequest::get().uri("/api/residents").to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[case(json!({ "records": [resident("Jane", "AB 1", "M1")] }))]
#[case(json!({ "residents": resident("Jane", "AB 1", "M1") }))]
#[case(json!(42))]
#[actix_rt::test]
async fn sync_rejects_malformed_payloads(#[case] payload: Value) {
    let app = app_with!(in_memory_state());
    let req = test::TestRequest::post()
        .uri("/api/residents/sync")
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "malformed_payload");
    assert!(body["traceId"].is_string());

    let req = test::TestRequest::get().uri("/api/residents").to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());
}

#[actix_rt::test]
async fn error_responses_echo_incoming_trace_id() {
    let app = app_with!(in_memory_state());
    let req = test::TestRequest::get()
        .uri("/api/residents/7c9e6679-7425-40de-944b-e07fc1f90ae7")
        .insert_header(("trace-id", TRACE_ID))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let header = res
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], TRACE_ID);
}

#[rstest]
#[case::list("/api/residents")]
#[case::search("/api/residents/search?section=GH1")]
#[case::get("/api/residents/7c9e6679-7425-40de-944b-e07fc1f90ae7")]
#[actix_rt::test]
async fn unreachable_store_maps_to_service_unavailable(#[case] uri: &str) {
    let store = OfflineStore::default();
    let app = app_with!(offline_state(&store));
    let req = test::TestRequest::get().uri(uri).to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "service_unavailable");
}

#[actix_rt::test]
async fn sync_hands_the_whole_batch_to_the_port() {
    let store = OfflineStore::default();
    let app = app_with!(offline_state(&store));
    let req = test::TestRequest::post()
        .uri("/api/residents/sync")
        .set_json(json!([{}, {}, {}]))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(store.batches(), vec![3]);
}

#[actix_rt::test]
async fn health_does_not_touch_the_store() {
    let store = OfflineStore::default();
    let app = app_with!(offline_state(&store));
    let req = test::TestRequest::get().uri("/api/residents/health").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
}
