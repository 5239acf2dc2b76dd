use axum::{body::to_bytes, http::Request, Router};
use journeylog_rs::{
    config::Config,
    routes::{self, journeys::format_duration},
    state::AppState,
    store::{JourneyStore, MemorySlot},
    types::journey::{GeoSample, JourneyRecord},
};
use serde_json::Value;
use tower::ServiceExt;

fn seeded_app(slot: MemorySlot) -> Router {
    let mut store = JourneyStore::load(slot);
    let ride = vec![
        GeoSample {
            timestamp: Some(0),
            ..GeoSample::new(59.3293, 18.0686)
        },
        GeoSample {
            timestamp: Some(3_723_000),
            ..GeoSample::new(59.3393, 18.0786)
        },
    ];
    let _ = store.add_many(vec![
        JourneyRecord::new("ride", "Ride", ride),
        JourneyRecord::new("empty", "Empty", Vec::new()),
    ]);
    let state = AppState::with_store(Config::from_env(), store);
    routes::router().with_state(state)
}

async fn send(app: Router, method: &str, uri: &str) -> (axum::http::StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(method)
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn list_shows_stats_and_colors() {
    let (status, _, body) = send(seeded_app(MemorySlot::new()), "GET", "/api/journeys").await;

    assert_eq!(status, axum::http::StatusCode::OK);
    let list: Value = serde_json::from_slice(&body).expect("json");
    let list = list.as_array().expect("array");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], "ride");
    assert_eq!(list[0]["color"], "#2176ae");
    assert_eq!(list[0]["duration_text"], "1h 2m");
    assert_eq!(list[1]["stats"]["points"], 0);
    assert_eq!(list[1]["distance_text"], "0.00 km");
}

#[tokio::test]
async fn delete_is_idempotent() {
    let slot = MemorySlot::new();
    let app = seeded_app(slot.clone());

    let (status, _, body) = send(app.clone(), "DELETE", "/api/journeys/ride").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let removed: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(removed["removed"], true);
    assert_eq!(removed["persisted"], true);

    let (status, _, body) = send(app.clone(), "DELETE", "/api/journeys/ride").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let removed: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(removed["removed"], false);

    let restored = JourneyStore::load(slot);
    let ids: Vec<_> = restored.list().iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, ["empty"]);
}

#[tokio::test]
async fn download_returns_sample_array() {
    let (status, headers, body) =
        send(seeded_app(MemorySlot::new()), "GET", "/api/journeys/ride/download").await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert!(headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .contains("journey.json"));
    let samples: Value = serde_json::from_slice(&body).expect("json");
    let samples = samples.as_array().expect("array");
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0]["latitude"], 59.3293);
    assert!(samples[0].get("accuracy").is_none());
}

#[tokio::test]
async fn download_unknown_journey_is_not_found() {
    let (status, _, _) = send(seeded_app(MemorySlot::new()), "GET", "/api/journeys/nope/download").await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn map_svg_skips_hidden_journeys() {
    let app = seeded_app(MemorySlot::new());

    let (status, headers, body) = send(app.clone(), "GET", "/api/map.svg").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/svg+xml");
    let svg = String::from_utf8(body).expect("utf8");
    assert!(svg.contains("journey-ride"));
    assert!(!svg.contains("journey-empty"));

    let (_, _, body) = send(app, "GET", "/api/map.svg?hidden=ride").await;
    let svg = String::from_utf8(body).expect("utf8");
    assert!(!svg.contains("journey-ride"));
}

#[tokio::test]
async fn map_png_renders_image() {
    let (status, headers, body) =
        send(seeded_app(MemorySlot::new()), "GET", "/api/map.png?width=320&height=240").await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/png");
    assert!(body.len() > 100);
}

#[tokio::test]
async fn map_rejects_bad_dimensions() {
    let (status, _, _) = send(seeded_app(MemorySlot::new()), "GET", "/api/map.svg?width=1").await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
}

#[test]
fn durations_read_like_the_viewer() {
    assert_eq!(format_duration(0), "");
    assert_eq!(format_duration(42_000), "42s");
    assert_eq!(format_duration(200_000), "3m 20s");
    assert_eq!(format_duration(3_900_000), "1h 5m");
}
