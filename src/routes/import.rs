use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::batch::{fetch_listings, normalize_batch};
use crate::routes::{apply_batch, IngestReport};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/journeys/import", post(import_remote))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportRequest {
    #[serde(default)]
    urls: Vec<String>,
}

/// Pull journey exports from remote listings. Without urls the well-known
/// listing next to the viewer is used.
async fn import_remote(
    State(state): State<AppState>,
    payload: Option<Json<ImportRequest>>,
) -> Result<Json<IngestReport>, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let urls: Vec<String> = request
        .urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    let urls = if urls.is_empty() {
        vec![state.config().listing_url()]
    } else {
        urls
    };

    let fetched = fetch_listings(state.http(), &urls, state.config().fetch_timeout).await;

    let mut documents = Vec::new();
    let mut errors = Vec::new();
    for result in fetched {
        match result {
            Ok(document) => documents.push(document),
            Err(e) => {
                tracing::warn!("{}", e);
                errors.push(e);
            }
        }
    }

    // Ids are checked only after every fetch finished, so the store lock is
    // never held across the network.
    let existing_ids = state.store().await.ids();
    let mut outcome = normalize_batch(&documents, &existing_ids);
    errors.append(&mut outcome.errors);

    tracing::info!(
        "Import from {} listing(s) produced {} journey(s) and {} error(s)",
        urls.len(),
        outcome.journeys.len(),
        errors.len()
    );

    let report = apply_batch(&state, urls.len(), outcome.journeys, errors).await;
    Ok(Json(report))
}
