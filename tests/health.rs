use axum::{body::to_bytes, http::Request, Router};
use journeylog_rs::{
    config::Config,
    routes,
    state::AppState,
    store::{JourneyStore, MemorySlot},
};
use tower::ServiceExt;

fn app() -> Router {
    let store = JourneyStore::load(MemorySlot::new());
    let state = AppState::with_store(Config::from_env(), store);
    routes::router().with_state(state)
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .method("GET")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let text = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(text.contains("\"status\":\"ok\""));
    assert!(text.contains("\"journeys\":0"));
}
