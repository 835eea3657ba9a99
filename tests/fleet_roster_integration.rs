use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use fleet_roster::api::routes::create_router;
use fleet_roster::config::{AnalysisConfig, SourcesConfig};
use fleet_roster::logic::RosterEngine;
use fleet_roster::model::{EntityKind, WarningKind};
use fleet_roster::source::{FailureCause, HttpSourceClient, SourceClient, SourceEndpoint};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::net::TcpListener;

// In-process stand-in for the sheet-backed record stores: one JSON array per sheet.
#[derive(Default)]
struct SheetStore {
    sheets: Mutex<HashMap<String, Vec<Value>>>,
    failing: Mutex<HashSet<String>>,
    garbled: Mutex<HashSet<String>>,
}

impl SheetStore {
    fn rows(&self, sheet: &str) -> Vec<Value> {
        self.sheets.lock().get(sheet).cloned().unwrap_or_default()
    }

    fn fail(&self, sheet: &str) {
        self.failing.lock().insert(sheet.to_string());
    }
}

async fn read_sheet(
    State(store): State<Arc<SheetStore>>,
    Path(sheet): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if store.failing.lock().contains(&sheet) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    if store.garbled.lock().contains(&sheet) {
        return Ok(Json(json!({ "error": "quota exceeded" })));
    }
    Ok(Json(Value::Array(store.rows(&sheet))))
}

async fn append_row(
    State(store): State<Arc<SheetStore>>,
    Path(sheet): Path<String>,
    Json(row): Json<Value>,
) -> StatusCode {
    if store.failing.lock().contains(&sheet) {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    store.sheets.lock().entry(sheet).or_default().push(row);
    StatusCode::CREATED
}

async fn update_rows(
    State(store): State<Arc<SheetStore>>,
    Path((sheet, column, value)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut sheets = store.sheets.lock();
    let Some(rows) = sheets.get_mut(&sheet) else {
        return StatusCode::NOT_FOUND;
    };

    let mut matched = 0;
    for row in rows.iter_mut() {
        if row.get(&column).and_then(Value::as_str) != Some(value.as_str()) {
            continue;
        }
        if let (Some(target), Some(Value::Object(data))) = (row.as_object_mut(), body.get("data")) {
            for (label, field) in data {
                target.insert(label.clone(), field.clone());
            }
        }
        matched += 1;
    }

    if matched == 0 {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

fn rider(
    name: &str,
    roll_no: &str,
    department: &str,
    vehicle_no: &str,
    route: (&str, &str),
) -> Value {
    json!({
        "Name": name,
        "Roll No": roll_no,
        "Department": department,
        "Year": "2",
        "Bus No": vehicle_no,
        "Route Name": route.1,
        "Route Number": route.0,
    })
}

async fn start_sheet_store() -> (Arc<SheetStore>, String) {
    let north = ("R1", "North Loop");
    let lake = ("R2", "Lake Road");
    let store = Arc::new(SheetStore::default());
    {
        let mut sheets = store.sheets.lock();
        sheets.insert(
            "cse".to_string(),
            vec![
                rider("Asha", "CS1", "CSE", "B1", north),
                rider("Ravi", "CS2", "CSE", "B1", north),
                rider("Kiran", "CS3", "CSE", "B2", lake),
            ],
        );
        sheets.insert(
            "csbs".to_string(),
            vec![
                rider("Meena", "CB1", "CSBS", "B1", north),
                rider("Arun", "CB2", "CSBS", "B2", lake),
            ],
        );
        sheets.insert(
            "operators".to_string(),
            vec![json!({
                "Driver ID": "D1",
                "Name": "Kumar",
                "Contact": "555-0101",
                "Bus No": "B1",
                "Route": "R1",
                "License No": "TN-01",
            })],
        );
        sheets.insert(
            "vehicles".to_string(),
            vec![
                json!({ "Bus No": "B1", "Capacity": 3, "Route Number": "R1", "Status": "active" }),
                json!({
                    "Bus No": "B2",
                    "Capacity": "10 seats",
                    "Route Number": "R2",
                    "Status": "active",
                }),
            ],
        );
        sheets.insert(
            "routes".to_string(),
            vec![
                json!({
                    "Route Number": "R1",
                    "Route Name": "North Loop",
                    "Stops": "Gate, Market",
                }),
                json!({ "Route Number": "R2", "Route Name": "Lake Road" }),
            ],
        );
    }

    let app = Router::new()
        .route("/:sheet", get(read_sheet).post(append_row))
        .route("/:sheet/:column/:value", patch(update_rows))
        .with_state(store.clone());
    let url = spawn(app).await;
    (store, url)
}

fn sources(store_url: &str) -> SourcesConfig {
    let endpoint = |id: &str| SourceEndpoint::new(id, &format!("{}/{}", store_url, id));
    SourcesConfig {
        request_timeout_secs: 5,
        rider_shards: vec![
            endpoint("cse").with_sub_unit("CSE"),
            endpoint("csbs").with_sub_unit("CSBS"),
        ],
        operators: Some(endpoint("operators")),
        vehicles: Some(endpoint("vehicles")),
        routes: Some(endpoint("routes")),
        ..SourcesConfig::default()
    }
}

fn engine_for(store_url: &str) -> Arc<RosterEngine<HttpSourceClient>> {
    let sources = sources(store_url);
    let client = HttpSourceClient::new(sources.request_timeout(), None).unwrap();
    Arc::new(RosterEngine::new(client, sources, AnalysisConfig::default()))
}

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .unwrap()
    }

    async fn patch(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .patch(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> Value {
        let response = self.get(path).await;
        assert!(response.status().is_success(), "GET {} failed: {}", path, response.status());
        response.json().await.unwrap()
    }
}

async fn start_api() -> (Arc<SheetStore>, TestClient) {
    let (store, store_url) = start_sheet_store().await;
    let app = create_router().with_state(engine_for(&store_url));
    let api = TestClient::new(spawn(app).await);
    (store, api)
}

fn find_tracked<'a>(items: &'a Value, roll_no: &str) -> &'a Value {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["record"]["roll_no"] == roll_no)
        .unwrap_or_else(|| panic!("rider {} not in snapshot", roll_no))
}

#[tokio::test]
async fn test_http_client_reads_and_writes_sheets() {
    let (store, store_url) = start_sheet_store().await;
    let client = HttpSourceClient::new(std::time::Duration::from_secs(5), None).unwrap();
    let vehicles = SourceEndpoint::new("vehicles", &format!("{}/vehicles", store_url));

    let records = client.fetch(&vehicles).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("Capacity").map(String::as_str), Some("3"));

    let mut fields = fleet_roster::model::RawRecord::new();
    fields.insert("Status".to_string(), "maintenance".to_string());
    client
        .update(&vehicles, EntityKind::Vehicle.key_label(), "B2", fields.clone())
        .await
        .unwrap();
    assert_eq!(store.rows("vehicles")[1]["Status"], "maintenance");

    let missing = client
        .update(&vehicles, EntityKind::Vehicle.key_label(), "B99", fields)
        .await
        .unwrap_err();
    assert_eq!(missing.cause, FailureCause::Status(404));
}

#[tokio::test]
async fn test_reconcile_over_http_tolerates_one_failed_shard() {
    let (store, store_url) = start_sheet_store().await;
    store.fail("csbs");

    let snapshot = engine_for(&store_url).reconcile().await;

    assert_eq!(snapshot.riders.len(), 3);
    assert_eq!(snapshot.warnings.len(), 1);
    assert_eq!(snapshot.warnings[0].kind, WarningKind::SourceUnavailable);
    assert_eq!(snapshot.warnings[0].source_id, "csbs");

    let b1 = snapshot
        .load_records
        .iter()
        .find(|record| record.vehicle_no == "B1")
        .unwrap();
    assert_eq!(b1.assigned_riders, 2);
    assert_eq!(b1.capacity, 3);
    assert_eq!(b1.utilization, 67);
}

#[tokio::test]
async fn test_reconcile_with_every_source_down_is_empty_with_warnings() {
    let (store, store_url) = start_sheet_store().await;
    for sheet in ["cse", "csbs", "operators", "vehicles", "routes"] {
        store.fail(sheet);
    }

    let snapshot = engine_for(&store_url).reconcile().await;

    assert!(snapshot.riders.is_empty());
    assert!(snapshot.operators.is_empty());
    assert!(snapshot.load_records.is_empty());
    assert_eq!(snapshot.warnings.len(), 5);
}

#[tokio::test]
async fn test_garbled_payload_is_reported_as_unavailable_source() {
    let (store, store_url) = start_sheet_store().await;
    store.garbled.lock().insert("routes".to_string());

    let snapshot = engine_for(&store_url).reconcile().await;

    assert!(snapshot.routes.is_empty());
    assert_eq!(snapshot.riders.len(), 5);
    assert_eq!(snapshot.warnings.len(), 1);
    assert_eq!(snapshot.warnings[0].source_id, "routes");
}

#[tokio::test]
async fn test_api_roster_views() {
    let (_store, api) = start_api().await;

    let summary: Value = api.post("/reconcile", json!({})).await.json().await.unwrap();
    assert_eq!(summary["total_riders"], 5);
    assert_eq!(summary["overcrowded_vehicles"], 1);
    assert_eq!(summary["underutilized_vehicles"], 1);
    assert_eq!(summary["generation"], 1);

    let load = api.get_json("/load").await;
    assert_eq!(load["total"], 2);
    assert_eq!(load["items"][0]["vehicle_no"], "B1");
    assert_eq!(load["items"][0]["classification"], "overcrowded");
    assert_eq!(load["items"][0]["recommendation"], "extra vehicle required");
    assert_eq!(load["items"][1]["capacity"], 10);
    assert_eq!(load["items"][1]["classification"], "underutilized");

    let asha = api.get_json("/riders/CS1").await;
    assert_eq!(asha["operator"]["name"], "Kumar");
    assert_eq!(asha["route"]["stops"], "Gate, Market");
    assert_eq!(api.get("/riders/ZZ9").await.status(), reqwest::StatusCode::NOT_FOUND);

    let kumar = api.get_json("/operators/D1").await;
    assert_eq!(kumar["assigned_riders"], 3);
    assert_eq!(kumar["route"]["route_name"], "North Loop");

    assert_eq!(api.get_json("/riders?department=CSBS").await["total"], 2);
    assert_eq!(api.get_json("/riders?department=all&search=ravi").await["total"], 1);
    assert_eq!(api.get_json("/riders").await["total"], 5);
}

#[tokio::test]
async fn test_api_submission_stays_pending_until_reconciled() {
    let (store, api) = start_api().await;
    api.post("/reconcile", json!({})).await;

    let response = api
        .post(
            "/records/rider",
            json!({
                "name": "Divya",
                "rollNo": "CB9",
                "department": "csbs",
                "year": 1,
                "busNo": "B2",
                "routeName": "Lake Road",
                "routeNumber": "R2",
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let pending: Value = response.json().await.unwrap();
    assert_eq!(pending["state"], "pending");

    let written = store.rows("csbs");
    assert_eq!(written.len(), 3);
    assert_eq!(written[2]["Roll No"], "CB9");
    assert_eq!(written[2]["Year"], "1");

    let snapshot = api.get_json("/snapshot").await;
    assert_eq!(find_tracked(&snapshot["riders"], "CB9")["state"], "pending");
    assert_eq!(snapshot["pending"].as_array().unwrap().len(), 1);
    assert_eq!(api.get_json("/summary").await["total_riders"], 5);

    let summary: Value = api.post("/reconcile", json!({})).await.json().await.unwrap();
    assert_eq!(summary["total_riders"], 6);
    assert_eq!(summary["pending_submissions"], 0);

    let snapshot = api.get_json("/snapshot").await;
    assert_eq!(find_tracked(&snapshot["riders"], "CB9")["state"], "confirmed");
}

#[tokio::test]
async fn test_api_rejects_incomplete_or_failed_submissions() {
    let (store, api) = start_api().await;

    let response = api.post("/records/operator", json!({ "name": "Selvi" })).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("driverId"));
    assert_eq!(store.rows("operators").len(), 1);

    store.fail("vehicles");
    let response = api
        .post(
            "/records/vehicle",
            json!({
                "busNo": "B7",
                "capacity": "40",
                "routeName": "Lake Road",
                "routeNumber": "R2",
                "status": "active",
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert!(api.get_json("/snapshot").await["pending"].as_array().unwrap().is_empty());

    let response = api.post("/records/route", json!({ "routeNumber": "R9" })).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let response = api.post("/records/buses", json!({})).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_update_applies_after_next_reconcile() {
    let (store, api) = start_api().await;
    api.post("/reconcile", json!({})).await;

    let response = api
        .patch("/records/rider/CS3", json!({ "data": { "Bus No": "B1" } }))
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    assert_eq!(store.rows("cse")[2]["Bus No"], "B1");
    assert_eq!(api.get_json("/riders/CS3").await["rider"]["vehicle_no"], "B2");

    api.post("/reconcile", json!({})).await;
    let kiran = api.get_json("/riders/CS3").await;
    assert_eq!(kiran["rider"]["vehicle_no"], "B1");
    assert_eq!(kiran["operator"]["operator_id"], "D1");

    let response = api
        .patch("/records/rider/NOPE", json!({ "data": { "Year": "3" } }))
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_csv_export() {
    let (_store, api) = start_api().await;

    let response = api.get("/export/load").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("load.csv"));
    assert!(response.text().await.unwrap().is_empty());

    api.post("/reconcile", json!({})).await;
    let body = api.get("/export/riders").await.text().await.unwrap();
    let lines: Vec<_> = body.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("serial_no,name,roll_no"));
    assert!(lines[1].starts_with("1,Asha,CS1,CSE"));

    assert_eq!(api.get("/export/buses").await.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (_store, api) = start_api().await;
    assert_eq!(api.get_json("/health").await["status"], "healthy");
}
