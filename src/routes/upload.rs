use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};

use crate::error::AppError;
use crate::pipeline::batch::{normalize_batch, SourceDocument};
use crate::routes::{apply_batch, IngestReport};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/journeys/upload", post(upload))
}

/// Accepts any number of JSON files. Each one is read and normalized on its
/// own; the good ones are stored together in one write.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestReport>, AppError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "files" {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("file {}", documents.len() + 1));
        let bytes = field.bytes().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read {}: {}", filename, e))
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        documents.push(SourceDocument::text(filename, text));
    }

    if documents.is_empty() {
        return Err(AppError::BadRequest("No file provided".to_string()));
    }

    let existing_ids = state.store().await.ids();
    let outcome = normalize_batch(&documents, &existing_ids);

    tracing::info!(
        "Upload of {} file(s) produced {} journey(s) and {} error(s)",
        documents.len(),
        outcome.journeys.len(),
        outcome.errors.len()
    );

    let report = apply_batch(&state, documents.len(), outcome.journeys, outcome.errors).await;
    Ok(Json(report))
}
