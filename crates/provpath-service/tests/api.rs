use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};

use provpath_lib::resolver::RouteLeg;
use provpath_lib::{
    PathfindingService, RetryPolicy, RouteResolver, RouteTransport, RoutingResponse,
    TransportFailure, load_registry,
};
use provpath_service::app;
use provpath_service_shared::AppState;
use provpath_service_shared::test_utils::{fixture_data_dir, fixture_regions, test_state};

/// Answers every request with the same road distance.
struct FixedTransport {
    meters: f64,
}

impl RouteTransport for FixedTransport {
    fn fetch(
        &self,
        _coordinates: &[(f64, f64)],
        _profile: &str,
    ) -> Result<RoutingResponse, TransportFailure> {
        Ok(RoutingResponse {
            code: "Ok".to_string(),
            routes: vec![RouteLeg {
                distance: self.meters,
            }],
            message: None,
        })
    }
}

fn server() -> TestServer {
    TestServer::new(app(test_state(), "/metrics")).unwrap()
}

fn server_with_routing(meters: f64) -> TestServer {
    let registry = load_registry(&fixture_data_dir()).unwrap();
    let resolver = RouteResolver::new(
        Box::new(FixedTransport { meters }),
        RetryPolicy::default().with_backoff(Duration::ZERO),
    );
    let service = PathfindingService::new(registry)
        .unwrap()
        .with_resolver(Some(resolver));
    TestServer::new(app(AppState::from_service(service), "/metrics")).unwrap()
}

#[tokio::test]
async fn find_path_returns_hops_and_estimate() {
    let response = server()
        .post("/api/v1/path/find")
        .json(&json!({
            "start": "Hà Nội",
            "end": "da nang",
            "road_class": "highway"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["hop_count"], 7);
    assert_eq!(body["road_class"], "highway");
    assert_eq!(body["path"][0]["code"], fixture_regions::HA_NOI);
    assert_eq!(body["path"][7]["code"], fixture_regions::DA_NANG);
    assert_eq!(body["segments"].as_array().unwrap().len(), 7);
    assert!(body["estimated_distance_km"].as_f64().unwrap() > 600.0);
    assert!(body.get("real_distance_km").is_none());
    assert_eq!(body["content_type"], "application/json");
}

#[tokio::test]
async fn find_path_adds_real_distance_when_routing_is_attached() {
    let response = server_with_routing(92_300.0)
        .post("/api/v1/path/find")
        .json(&json!({ "start": "01", "end": "24" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["hop_count"], 1);
    assert!((body["real_distance_km"].as_f64().unwrap() - 92.3).abs() < 1e-9);
}

#[tokio::test]
async fn find_path_skips_routing_when_not_requested() {
    let response = server_with_routing(92_300.0)
        .post("/api/v1/path/find")
        .json(&json!({ "start": "01", "end": "24", "resolve_real_distance": false }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("real_distance_km").is_none());
}

#[tokio::test]
async fn find_path_unknown_region_is_problem_with_suggestions() {
    let response = server()
        .post("/api/v1/path/find")
        .json(&json!({ "start": "Ha Nam", "end": "01", "fuzzy_match": false }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.header("content-type"),
        HeaderValue::from_static("application/problem+json")
    );
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/unknown-region");
    let suggestions: Vec<&str> = body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(suggestions.contains(&"Hà Nội"), "got {:?}", suggestions);
}

#[tokio::test]
async fn find_path_blank_start_is_bad_request() {
    let response = server()
        .post("/api/v1/path/find")
        .json(&json!({ "start": "  ", "end": "01" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-request");
    assert!(body["detail"].as_str().unwrap().contains("'start'"));
}

#[tokio::test]
async fn find_path_unknown_road_class_is_bad_request() {
    let response = server()
        .post("/api/v1/path/find")
        .json(&json!({ "start": "01", "end": "48", "road_class": "motorway" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn find_path_missing_field_is_rejected() {
    let response = server()
        .post("/api/v1/path/find")
        .json(&json!({ "start": "01" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn request_id_is_echoed_back() {
    let response = server()
        .post("/api/v1/path/find")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .json(&json!({ "start": "", "end": "01" }))
        .await;

    assert_eq!(response.header("x-request-id"), "req-42");
    let body: Value = response.json();
    assert_eq!(body["instance"], "req-42");
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let response = server().get("/health/live").await;

    let id = response.header("x-request-id");
    assert_eq!(id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn reachable_respects_hop_limit() {
    let response = server()
        .post("/api/v1/path/reachable")
        .json(&json!({ "start": "01", "max_hops": 1 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 6);
    assert_eq!(body["regions"][0]["code"], "01");
    assert_eq!(body["regions"][0]["hops"], 0);
    assert!(
        body["regions"]
            .as_array()
            .unwrap()
            .iter()
            .skip(1)
            .all(|r| r["hops"] == 1)
    );
}

#[tokio::test]
async fn connectivity_reports_connected_regions() {
    let response = server()
        .post("/api/v1/path/connectivity")
        .json(&json!({ "first": "Lai Châu", "second": "Cà Mau" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["connected"], true);
    assert_eq!(body["first"]["code"], fixture_regions::LAI_CHAU);
    assert_eq!(body["second"]["code"], fixture_regions::CA_MAU);
}

#[tokio::test]
async fn regions_lists_every_region_sorted() {
    let response = server().get("/api/v1/regions").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 34);
    let codes: Vec<&str> = body["regions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["code"].as_str())
        .collect();
    let mut sorted = codes.clone();
    sorted.sort();
    assert_eq!(codes, sorted);
}

#[tokio::test]
async fn region_info_accepts_code_and_name() {
    let by_code: Value = server().get("/api/v1/regions/96").await.json();
    assert_eq!(by_code["name"], "Cà Mau");
    assert_eq!(by_code["neighbor_count"], 2);

    let response = server().get("/api/v1/regions/ca%20mau").await;
    response.assert_status_ok();
    let by_name: Value = response.json();
    assert_eq!(by_name["code"], "96");
}

#[tokio::test]
async fn region_info_unknown_is_not_found() {
    let response = server().get("/api/v1/regions/99").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_honours_limit() {
    let response = server()
        .post("/api/v1/regions/search")
        .json(&json!({ "query": "thanh pho", "limit": 3 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let codes: Vec<&str> = body["regions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["01", "31", "46"]);
}

#[tokio::test]
async fn search_limit_out_of_range_is_bad_request() {
    let response = server()
        .post("/api/v1/regions/search")
        .json(&json!({ "query": "ha", "limit": 0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validate_reports_misses_without_failing() {
    let response = server()
        .post("/api/v1/regions/validate")
        .json(&json!({ "identifier": "Hanoy" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["valid"], false);
    assert!(
        body["suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "Hà Nội")
    );

    let body: Value = server()
        .post("/api/v1/regions/validate")
        .json(&json!({ "identifier": "48" }))
        .await
        .json();
    assert_eq!(body["valid"], true);
    assert_eq!(body["matched_by"], "code");
}

#[tokio::test]
async fn stats_reports_connected_graph() {
    let response = server().get("/api/v1/stats").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["region_count"], 34);
    assert_eq!(body["edge_count"], 58);
    assert_eq!(body["connected"], true);
}

#[tokio::test]
async fn health_ready_reports_dataset() {
    let response = server().get("/health/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["regions_loaded"], 34);
    assert_eq!(body["graph_built"], true);
}

#[tokio::test]
async fn metrics_endpoint_answers_without_recorder() {
    let response = server().get("/metrics").await;

    response.assert_status_ok();
    assert!(response.text().starts_with('#'));
}
