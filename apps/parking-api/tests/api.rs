use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use domain::{BuildingContext, TariffConfig};
use http_body_util::BodyExt;
use parking_api::{AppState, build_app};
use pms_occupancy::OccupancyService;
use pms_registry::SpotRegistry;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app() -> Router {
    let service = OccupancyService::new(
        BuildingContext::new("torre-norte", "Torre Norte"),
        SpotRegistry::with_inventory("V", 3, 120),
        TariffConfig::default(),
    );
    build_app(AppState::new(service))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json")
    };
    (status, value)
}

fn vehicle_entry(name: &str, plate: &str, spot: &str) -> Value {
    json!({
        "name": name,
        "documentId": "12345678",
        "type": "vehicle",
        "vehiclePlate": plate,
        "destinationUnit": "302",
        "residentName": "Ana Gomez",
        "parkingSpot": spot
    })
}

#[tokio::test]
async fn health_sets_request_headers() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response.headers().get("x-request-id").expect("request id");
    assert_eq!(request_id.to_str().expect("ascii").len(), 36);
    assert!(response.headers().get("x-trace-id").is_some());
}

#[tokio::test]
async fn routes_are_served_under_api_prefix() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/spots", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let spots = body["data"].as_array().expect("spots");
    assert_eq!(spots.len(), 3);
    assert_eq!(spots[0]["code"], "V-01");
    assert_eq!(spots[0]["status"], "available");
}

#[tokio::test]
async fn entry_overtime_and_exit_flow() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Juan Perez", "abc123", "V-01")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["spot"]["status"], "occupied");
    assert_eq!(body["data"]["spot"]["remainingMinutes"], 120);
    assert_eq!(body["data"]["visitor"]["vehiclePlate"], "ABC123");
    let visitor_id = body["data"]["visitor"]["id"]
        .as_str()
        .expect("visitor id")
        .to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/clock/advance",
        Some(json!({ "minutes": 130 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["alerts"].as_array().expect("alerts").len(), 1);
    assert_eq!(body["data"]["alerts"][0]["type"], "parking_overtime");

    let (_, body) = send(&app, Method::GET, "/spots/V-01", None).await;
    assert_eq!(body["data"]["status"], "overtime");
    assert_eq!(body["data"]["remainingMinutes"], -10);

    let (status, body) = send(&app, Method::GET, "/spots/V-01/charge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 2000);
    assert_eq!(body["data"]["overtimeMinutes"], 10);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/visitors/{visitor_id}/exit"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["spotReleased"], true);
    assert_eq!(body["data"]["charge"]["amount"], 2000);
    assert_eq!(body["data"]["visitor"]["status"], "exited");

    let (_, body) = send(&app, Method::GET, "/spots/V-01", None).await;
    assert_eq!(body["data"]["status"], "available");
    assert!(body["data"]["visitorId"].is_null());

    let (_, body) = send(&app, Method::GET, "/alerts?filter=critical", None).await;
    assert_eq!(body["data"].as_array().expect("alerts").len(), 1);
}

#[tokio::test]
async fn occupied_spot_returns_conflict() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Juan Perez", "ABC123", "V-01")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Maria Lopez", "XYZ789", "V-01")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PARKING.SPOT_UNAVAILABLE");
}

#[tokio::test]
async fn invalid_entry_returns_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/visitors",
        Some(json!({
            "name": "Juan Perez",
            "documentId": "12345678",
            "type": "bicycle",
            "destinationUnit": "302"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");

    let (status, _) = send(
        &app,
        Method::POST,
        "/visitors",
        Some(json!({
            "name": "   ",
            "documentId": "12345678",
            "type": "pedestrian",
            "destinationUnit": "302"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_resources_return_not_found() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/spots/P-99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");

    let (status, _) = send(&app, Method::POST, "/visitors/missing/exit", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/alerts/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_exit_returns_conflict() {
    let app = test_app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/visitors",
        Some(json!({
            "name": "Carla Ruiz",
            "documentId": "87654321",
            "type": "pedestrian",
            "destinationUnit": "101",
            "vehiclePlate": "",
            "parkingSpot": ""
        })),
    )
    .await;
    let visitor_id = body["data"]["visitor"]["id"]
        .as_str()
        .expect("visitor id")
        .to_string();
    let uri = format!("/visitors/{visitor_id}/exit");

    let (status, _) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "VISITOR.ALREADY_EXITED");
}

#[tokio::test]
async fn reserve_and_release_spot() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/spots/V-02/reserve",
        Some(json!({ "residentUnit": "404" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "reserved");

    let (status, _) = send(
        &app,
        Method::POST,
        "/spots/V-02/reserve",
        Some(json!({ "residentUnit": "405" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Method::POST, "/spots/V-02/release", None).await;
    assert_eq!(body["data"]["released"], true);
    assert_eq!(body["data"]["spot"]["status"], "available");

    let (_, body) = send(&app, Method::POST, "/spots/V-02/release", None).await;
    assert_eq!(body["data"]["released"], false);
}

#[tokio::test]
async fn alerts_can_be_read_and_dismissed() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Juan Perez", "ABC123", "V-01")),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/alerts?filter=unread", None).await;
    let alerts = body["data"].as_array().expect("alerts");
    assert_eq!(alerts.len(), 1);
    let alert_id = alerts[0]["id"].as_str().expect("id").to_string();

    let (status, body) = send(&app, Method::POST, &format!("/alerts/{alert_id}/read"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["read"], true);

    let (_, body) = send(&app, Method::POST, "/alerts/read-all", None).await;
    assert_eq!(body["data"]["updated"], 0);

    let (status, _) = send(&app, Method::DELETE, &format!("/alerts/{alert_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/alerts", None).await;
    assert!(body["data"].as_array().expect("alerts").is_empty());

    let (status, _) = send(&app, Method::GET, "/alerts?filter=urgent", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tariff_update_is_validated() {
    let app = test_app();
    let (_, body) = send(&app, Method::GET, "/tariff", None).await;
    assert_eq!(body["data"]["hourlyRate"], 2000);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/tariff",
        Some(json!({
            "freeMinutes": 60,
            "hourlyRate": 1500,
            "overtimeMultiplier": 1.5,
            "maxOvertimeHours": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["freeMinutes"], 60);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/tariff",
        Some(json!({
            "freeMinutes": 0,
            "hourlyRate": 1500,
            "overtimeMultiplier": 1.5,
            "maxOvertimeHours": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");
}

#[tokio::test]
async fn dashboard_and_visitor_listing() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Juan Perez", "ABC123", "V-01")),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(body["data"]["buildingName"], "Torre Norte");
    assert_eq!(body["data"]["occupiedSpots"], 1);
    assert_eq!(body["data"]["availableSpots"], 2);
    assert_eq!(body["data"]["visitorsInside"], 1);
    assert_eq!(body["data"]["unreadAlerts"], 1);

    let (_, body) = send(&app, Method::GET, "/visitors?active=true&q=juan", None).await;
    assert_eq!(body["data"].as_array().expect("visitors").len(), 1);
    let (_, body) = send(&app, Method::GET, "/visitors?q=nobody", None).await;
    assert!(body["data"].as_array().expect("visitors").is_empty());

    let (status, body) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["entries"].as_u64().expect("entries") >= 1);
}

#[tokio::test]
async fn parking_request_is_approved_and_completed_on_arrival() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/parking-requests",
        Some(json!({
            "residentUnit": "302",
            "visitorName": "Maria Garcia",
            "vehiclePlate": "xyz-789",
            "scheduledAt": 1_700_000_000_000_i64,
            "durationHours": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["request"]["status"], "pending");
    assert_eq!(body["data"]["request"]["vehiclePlate"], "XYZ-789");
    assert_eq!(body["data"]["alert"]["type"], "parking_request");
    let request_id = body["data"]["request"]["id"]
        .as_str()
        .expect("request id")
        .to_string();

    let (_, body) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(body["data"]["pendingRequests"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/parking-requests/{request_id}/approve"),
        Some(json!({ "spotCode": "V-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["request"]["spotAssigned"], "V-02");
    assert_eq!(body["data"]["spot"]["status"], "reserved");

    let (status, _) = send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Maria Garcia", "XYZ-789", "V-02")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/parking-requests/{request_id}"), None).await;
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/parking-requests/{request_id}/reject"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PARKING.REQUEST_STATE");

    let (_, body) = send(&app, Method::GET, "/parking-requests?status=completed", None).await;
    assert_eq!(body["data"].as_array().expect("requests").len(), 1);
    let (status, _) = send(&app, Method::GET, "/parking-requests?status=cancelled", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn available_listing_skips_force_released_spot_still_in_use() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Juan Perez", "ABC123", "V-01")),
    )
    .await;
    send(&app, Method::POST, "/spots/V-01/release", None).await;

    let (_, body) = send(&app, Method::GET, "/spots?available=true", None).await;
    let codes: Vec<&str> = body["data"]
        .as_array()
        .expect("spots")
        .iter()
        .filter_map(|spot| spot["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["V-02", "V-03"]);

    let (_, body) = send(&app, Method::GET, "/spots", None).await;
    assert_eq!(body["data"].as_array().expect("spots").len(), 3);
}

#[tokio::test]
async fn charge_lookup_leaves_alerts_untouched() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/visitors",
        Some(vehicle_entry("Juan Perez", "ABC123", "V-01")),
    )
    .await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/clock/advance",
        Some(json!({ "minutes": 420 })),
    )
    .await;
    let alerts = body["data"]["alerts"].as_array().expect("alerts");
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1]["priority"], "critical");

    let (_, before) = send(&app, Method::GET, "/alerts", None).await;
    let (status, body) = send(&app, Method::GET, "/spots/V-01/charge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["capped"], true);
    assert_eq!(body["data"]["amount"], 16_000);
    send(&app, Method::GET, "/spots/V-01/charge", None).await;
    let (_, after) = send(&app, Method::GET, "/alerts", None).await;
    assert_eq!(
        before["data"].as_array().expect("alerts").len(),
        after["data"].as_array().expect("alerts").len()
    );
}
