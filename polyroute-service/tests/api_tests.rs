//! Integration tests for the HTTP API.

use axum::http::StatusCode;
use axum_test::TestServer;
use polyroute::DirectionsClientBuilder;
use polyroute_service::{router, AppState};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;

const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

/// Create a test server without a directions client.
fn create_test_server() -> TestServer {
    let state = Arc::new(AppState::without_directions());
    TestServer::new(router(state)).unwrap()
}

const ROUTE_BODY: &str = r#"{
    "status": "OK",
    "routes": [{
        "summary": "I-80 W",
        "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"},
        "legs": [{"distance": {"text": "300 km", "value": 300000}, "duration": {"text": "4 hours", "value": 13200}}]
    }]
}"#;

/// Serve one canned JSON body to every request on a local port.
fn spawn_directions_stub(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/directions", listener.local_addr().unwrap());

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 && line != "\r\n" {
                line.clear();
            }
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
        }
    });

    url
}

/// Create a test server whose directions client talks to `url`.
async fn create_test_server_with_directions(url: String) -> TestServer {
    // The blocking client must be built off the async worker threads
    let client = tokio::task::spawn_blocking(move || {
        DirectionsClientBuilder::new("test-key")
            .base_url(url)
            .max_retries(0)
            .build()
    })
    .await
    .unwrap()
    .unwrap();

    let state = Arc::new(AppState {
        directions: Some(client),
    });
    TestServer::new(router(state)).unwrap()
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[tokio::test]
async fn test_decode_endpoint_success() {
    let server = create_test_server();

    let response = server
        .get("/decode")
        .add_query_param("polyline", REFERENCE)
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 3);
    assert_close(&json["coordinates"][0][0], -120.2);
    assert_close(&json["coordinates"][0][1], 38.5);
    assert_close(&json["coordinates"][2][0], -126.453);
    assert_close(&json["coordinates"][2][1], 43.252);
}

#[tokio::test]
async fn test_decode_endpoint_empty_polyline() {
    let server = create_test_server();

    let response = server.get("/decode").add_query_param("polyline", "").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 0);
    assert_eq!(json["coordinates"], json!([]));
}

#[tokio::test]
async fn test_decode_endpoint_precision() {
    let server = create_test_server();

    let response = server
        .get("/decode")
        .add_query_param("polyline", "_izlhA~rlgdF_{geC~ywl@_kwzCn`{nI")
        .add_query_param("precision", 6)
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 3);
    assert_close(&json["coordinates"][0][0], -120.2);
    assert_close(&json["coordinates"][0][1], 38.5);
}

#[tokio::test]
async fn test_decode_endpoint_truncated() {
    let server = create_test_server();

    let response = server
        .get("/decode")
        .add_query_param("polyline", "_p~iF~ps")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("byte 5"));
}

#[tokio::test]
async fn test_decode_endpoint_missing_longitude() {
    let server = create_test_server();

    let response = server.get("/decode").add_query_param("polyline", "_p~iF").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("longitude"));
}

#[tokio::test]
async fn test_decode_endpoint_invalid_precision() {
    let server = create_test_server();

    let response = server
        .get("/decode")
        .add_query_param("polyline", "CC")
        .add_query_param("precision", 11)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_decode_endpoint_missing_params() {
    let server = create_test_server();

    let response = server.get("/decode").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_decode_coordinates() {
    let server = create_test_server();

    let response = server
        .post("/decode")
        .json(&json!({ "polyline": "CC" }))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["count"], 1);
    assert_close(&json["coordinates"][0][0], 0.00002);
    assert_close(&json["coordinates"][0][1], 0.00002);
}

#[tokio::test]
async fn test_post_decode_geojson() {
    let server = create_test_server();

    let response = server
        .post("/decode")
        .json(&json!({ "polyline": REFERENCE, "format": "geojson" }))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["type"], "Feature");
    assert_eq!(json["geometry"]["type"], "LineString");
    assert_eq!(json["geometry"]["coordinates"].as_array().unwrap().len(), 3);
    assert_close(&json["geometry"]["coordinates"][1][0], -120.95);
    assert_close(&json["geometry"]["coordinates"][1][1], 40.7);
}

#[tokio::test]
async fn test_post_decode_malformed() {
    let server = create_test_server();

    let response = server
        .post("/decode")
        .json(&json!({ "polyline": "_" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("byte 0"));
}

#[tokio::test]
async fn test_encode_linestring() {
    let server = create_test_server();

    let response = server
        .post("/encode")
        .json(&json!({
            "geometry": {
                "type": "LineString",
                "coordinates": [[-120.2, 38.5], [-120.95, 40.7], [-126.453, 43.252]]
            }
        }))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["polyline"], REFERENCE);
    assert_eq!(json["count"], 3);
}

#[tokio::test]
async fn test_encode_multipoint_with_precision() {
    let server = create_test_server();

    let response = server
        .post("/encode")
        .json(&json!({
            "geometry": {
                "type": "MultiPoint",
                "coordinates": [[-120.2, 38.5], [-120.95, 40.7], [-126.453, 43.252]]
            },
            "precision": 6
        }))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["polyline"], "_izlhA~rlgdF_{geC~ywl@_kwzCn`{nI");
}

#[tokio::test]
async fn test_encode_rejects_polygon() {
    let server = create_test_server();

    let response = server
        .post("/encode")
        .json(&json!({
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("Polygon"));
}

#[tokio::test]
async fn test_encode_rejects_out_of_range() {
    let server = create_test_server();

    let response = server
        .post("/encode")
        .json(&json!({
            "geometry": { "type": "LineString", "coordinates": [[0.0, 95.0], [0.0, 0.0]] }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_without_directions() {
    let server = create_test_server();

    let response = server
        .get("/route")
        .add_query_param("origin", "19.4326,-99.1332")
        .add_query_param("destination", "20.6597,-103.3496")
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_route_invalid_origin() {
    let server = create_test_server();

    let response = server
        .get("/route")
        .add_query_param("origin", "not-a-place")
        .add_query_param("destination", "20.6597,-103.3496")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_missing_params() {
    let server = create_test_server();

    let response = server
        .get("/route")
        .add_query_param("origin", "19.4326,-99.1332")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn test_stats_endpoint_without_directions() {
    let server = create_test_server();

    let response = server.get("/stats").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["directions_enabled"], false);
    assert_eq!(json["cached_routes"], 0);
    assert_eq!(json["cache_hits"], 0);
    assert_eq!(json["cache_misses"], 0);
    assert_eq!(json["hit_rate"], 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_route_success() {
    let url = spawn_directions_stub(ROUTE_BODY);
    let server = create_test_server_with_directions(url).await;

    let response = server
        .get("/route")
        .add_query_param("origin", "38.5,-120.2")
        .add_query_param("destination", "43.252,-126.453")
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["polyline"], REFERENCE);
    assert_eq!(json["summary"], "I-80 W");
    assert_eq!(json["distance_meters"], 300000.0);
    assert_eq!(json["coordinates"].as_array().unwrap().len(), 3);
    assert_close(&json["coordinates"][1][0], -120.95);
    assert_close(&json["coordinates"][1][1], 40.7);

    // Second identical request is a cache hit
    server
        .get("/route")
        .add_query_param("origin", "38.5,-120.2")
        .add_query_param("destination", "43.252,-126.453")
        .await
        .assert_status_ok();

    let json: Value = server.get("/stats").await.json();
    assert_eq!(json["directions_enabled"], true);
    assert_eq!(json["cache_hits"], 1);
    assert_eq!(json["cache_misses"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_route_malformed_upstream_polyline() {
    let url = spawn_directions_stub(
        r#"{"status": "OK", "routes": [{"overview_polyline": {"points": "_p~iF"}}]}"#,
    );
    let server = create_test_server_with_directions(url).await;

    let response = server
        .get("/route")
        .add_query_param("origin", "38.5,-120.2")
        .add_query_param("destination", "43.252,-126.453")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("INVALID_POLYLINE"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_route_zero_results() {
    let url = spawn_directions_stub(r#"{"status": "ZERO_RESULTS", "routes": []}"#);
    let server = create_test_server_with_directions(url).await;

    let response = server
        .get("/route")
        .add_query_param("origin", "38.5,-120.2")
        .add_query_param("destination", "43.252,-126.453")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}
