use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// A per-source ingestion failure. Every variant names the file or URL it
/// came from so a batch can report it and move on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("Error reading {origin}: {reason}")]
    MalformedJson { origin: String, reason: String },
    #[error("Unrecognized journey document in {origin}")]
    UnrecognizedShape { origin: String },
    #[error("Journey {id} from {origin} is already stored")]
    DuplicateJourney { origin: String, id: String },
    #[error("Failed to fetch {origin}: {reason}")]
    Fetch { origin: String, reason: String },
}

impl IngestError {
    pub fn origin(&self) -> &str {
        match self {
            IngestError::MalformedJson { origin, .. }
            | IngestError::UnrecognizedShape { origin }
            | IngestError::DuplicateJourney { origin, .. }
            | IngestError::Fetch { origin, .. } => origin,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize journeys: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Storage quota exceeded ({size} bytes, limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PositionError {
    #[error("User denied geolocation")]
    PermissionDenied,
    #[error("Position unavailable")]
    Unavailable,
    #[error("Position request timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("SVG generation failed: {0}")]
    SvgError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("PNG rendering failed: {0}")]
    RenderFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("Journey not found: {0}")]
    NotFound(String),
    #[error("Recording session not active: {0}")]
    SessionNotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Ingest(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::NotFound(_) | AppError::SessionNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Store(_)
            | AppError::Render(_)
            | AppError::Raster(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
