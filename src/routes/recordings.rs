use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, PositionError};
use crate::pipeline::normalize::parse_sample;
use crate::recording::RecordingSession;
use crate::routes::journeys::JourneySummary;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/recordings", post(start_recording))
        .route("/api/recordings/:id", get(recording_status))
        .route("/api/recordings/:id/samples", post(push_samples))
        .route("/api/recordings/:id/error", post(report_error))
        .route("/api/recordings/:id/stop", post(stop_recording))
}

#[derive(Debug, Serialize)]
struct RecordingStatus {
    id: String,
    active: bool,
    points: usize,
    status: String,
}

impl RecordingStatus {
    fn of(session: &RecordingSession) -> Self {
        Self {
            id: session.id().to_string(),
            active: session.is_active(),
            points: session.len(),
            status: session.status(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SamplesResponse {
    accepted: usize,
    dropped: usize,
    status: String,
}

/// Mirrors the geolocation error object: code 1 denied, 2 unavailable, 3 timeout.
#[derive(Debug, Deserialize)]
struct PositionErrorPayload {
    code: Option<u8>,
    #[serde(default)]
    message: String,
}

impl From<PositionErrorPayload> for PositionError {
    fn from(payload: PositionErrorPayload) -> Self {
        match payload.code {
            Some(1) => PositionError::PermissionDenied,
            Some(2) => PositionError::Unavailable,
            Some(3) => PositionError::Timeout,
            _ => PositionError::Other(payload.message),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StopRequest {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct StopResponse {
    journey: JourneySummary,
    persisted: bool,
    status: String,
}

async fn start_recording(State(state): State<AppState>) -> Json<RecordingStatus> {
    let (session, _sink) = RecordingSession::start(Uuid::new_v4().simple().to_string());
    let status = RecordingStatus::of(&session);
    state.insert_recording(session);
    Json(status)
}

async fn recording_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordingStatus>, AppError> {
    state
        .with_recording(&id, RecordingStatus::of)
        .map(Json)
        .ok_or(AppError::SessionNotFound(id))
}

/// A position callback may deliver one fix or a queued burst. Unusable
/// fixes are dropped one by one; fixes for a stopped or unknown session are
/// turned away.
async fn push_samples(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<SamplesResponse>, AppError> {
    let sink = state
        .with_recording(&id, RecordingSession::sink)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;

    let fixes = match payload {
        Value::Array(fixes) => fixes,
        fix @ Value::Object(_) => vec![fix],
        _ => {
            return Err(AppError::BadRequest(
                "Expected a position fix or an array of fixes".to_string(),
            ))
        }
    };
    let total = fixes.len();
    let accepted = fixes
        .iter()
        .filter_map(parse_sample)
        .map(|sample| sink.push(sample))
        .filter(|pushed| *pushed)
        .count();

    let status = state
        .with_recording(&id, RecordingSession::status)
        .unwrap_or_else(|| "Journey recording stopped.".to_string());
    Ok(Json(SamplesResponse {
        accepted,
        dropped: total - accepted,
        status,
    }))
}

/// The session keeps running after a position error.
async fn report_error(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PositionErrorPayload>,
) -> Result<Json<RecordingStatus>, AppError> {
    let sink = state
        .with_recording(&id, RecordingSession::sink)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    sink.report_error(&payload.into());

    state
        .with_recording(&id, RecordingStatus::of)
        .map(Json)
        .ok_or(AppError::SessionNotFound(id))
}

async fn stop_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<StopRequest>>,
) -> Result<Json<StopResponse>, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let session = state
        .take_recording(&id)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    let finished = session.stop();
    let journey = finished.into_journey(request.name);

    let mut store = state.store().await;
    let added = store.add(journey);
    let persisted = added.is_persisted();
    let index = store.len() - 1;
    let summary = JourneySummary::new(index, &added.value, store.color_of(index));
    drop(store);

    tracing::info!(
        "Recording {} saved as journey {} ({} points, {:.2} km)",
        id,
        summary.id,
        summary.stats.points,
        summary.stats.distance / 1000.0
    );

    let status = if persisted {
        "Journey recording stopped.".to_string()
    } else {
        "Journey recording stopped, but it could not be saved to storage.".to_string()
    };
    Ok(Json(StopResponse {
        journey: summary,
        persisted,
        status,
    }))
}
