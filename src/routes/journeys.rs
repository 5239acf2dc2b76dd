use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::types::journey::{JourneyRecord, JourneyStats};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/journeys", get(list_journeys))
        .route("/api/journeys/:id", delete(remove_journey))
        .route("/api/journeys/:id/download", get(download_journey))
}

/// One row of the journey list, as shown next to the map.
#[derive(Debug, Clone, Serialize)]
pub struct JourneySummary {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub color: String,
    pub stats: JourneyStats,
    pub distance_text: String,
    pub duration_text: String,
}

impl JourneySummary {
    pub fn new(index: usize, journey: &JourneyRecord, color: &str) -> Self {
        Self {
            index,
            id: journey.id.clone(),
            name: journey.name.clone(),
            color: color.to_string(),
            stats: journey.stats,
            distance_text: format!("{:.2} km", journey.stats.distance / 1000.0),
            duration_text: format_duration(journey.stats.duration),
        }
    }
}

async fn list_journeys(State(state): State<AppState>) -> Json<Vec<JourneySummary>> {
    let store = state.store().await;
    let summaries = store
        .list()
        .iter()
        .enumerate()
        .map(|(index, journey)| JourneySummary::new(index, journey, store.color_of(index)))
        .collect();
    Json(summaries)
}

#[derive(Debug, Serialize)]
struct RemoveResponse {
    removed: bool,
    persisted: bool,
    status: String,
}

/// Removing an unknown id is not an error.
async fn remove_journey(State(state): State<AppState>, Path(id): Path<String>) -> Json<RemoveResponse> {
    let removed = state.store().await.remove(&id);
    let persisted = removed.is_persisted();
    let status = match &removed.value {
        Some(journey) if persisted => {
            tracing::info!("Removed journey {} ({})", journey.id, journey.name);
            format!("Removed {}.", journey.name)
        }
        Some(journey) => format!("Removed {}, but storage could not be updated.", journey.name),
        None => format!("No journey with id {}.", id),
    };

    Json(RemoveResponse {
        removed: removed.value.is_some(),
        persisted,
        status,
    })
}

/// The bare sample array, the same file the recorder page offers for download.
async fn download_journey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store().await;
    let journey = store.get(&id).ok_or_else(|| AppError::NotFound(id.clone()))?;
    let body = serde_json::to_string_pretty(journey.samples())
        .map_err(|e| AppError::Internal(format!("Failed to serialize journey: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"journey.json\""),
        ],
        body,
    ))
}

/// `1h 5m`, `3m 20s`, `42s`; empty when there is no duration.
pub fn format_duration(duration_ms: i64) -> String {
    if duration_ms <= 0 {
        return String::new();
    }
    let seconds = duration_ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
