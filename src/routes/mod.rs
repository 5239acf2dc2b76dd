pub mod health;
pub mod import;
pub mod journeys;
pub mod map;
pub mod recordings;
pub mod upload;

use std::collections::HashSet;

use axum::Router;
use serde::Serialize;

use crate::error::IngestError;
use crate::state::AppState;
use crate::types::journey::JourneyRecord;

/// Every API route, without static files or middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(journeys::router())
        .merge(upload::router())
        .merge(import::router())
        .merge(map::router())
        .merge(recordings::router())
}

/// Outcome of an upload or remote import batch.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub added: Vec<journeys::JourneySummary>,
    pub errors: Vec<String>,
    pub persisted: bool,
    pub status: String,
}

/// Store the normalized journeys in one write and describe what happened.
pub(crate) async fn apply_batch(
    state: &AppState,
    sources: usize,
    journeys: Vec<JourneyRecord>,
    errors: Vec<IngestError>,
) -> IngestReport {
    let mut store = state.store().await;
    let first_index = store.len();
    let persisted = store.add_many(journeys);
    if let Err(e) = &persisted.outcome {
        tracing::warn!("Journey batch kept in memory only: {}", e);
    }
    let is_persisted = persisted.is_persisted();
    let added: Vec<_> = persisted
        .into_inner()
        .iter()
        .enumerate()
        .map(|(offset, journey)| {
            let index = first_index + offset;
            journeys::JourneySummary::new(index, journey, store.color_of(index))
        })
        .collect();
    drop(store);

    let failed_sources = count_failed_sources(&errors);
    let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
    let mut status = if errors.is_empty() {
        format!("Uploaded {} file(s).", sources)
    } else {
        format!(
            "Uploaded {} of {} file(s). {}",
            sources.saturating_sub(failed_sources),
            sources,
            errors.join(" ")
        )
    };
    if !is_persisted {
        status.push_str(" Journeys could not be saved to storage.");
    }

    IngestReport {
        added,
        errors,
        persisted: is_persisted,
        status,
    }
}

/// Sources that produced nothing. Skipped duplicates do not fail their source.
fn count_failed_sources(errors: &[IngestError]) -> usize {
    errors
        .iter()
        .filter(|e| !matches!(e, IngestError::DuplicateJourney { .. }))
        .map(IngestError::origin)
        .collect::<HashSet<_>>()
        .len()
}
