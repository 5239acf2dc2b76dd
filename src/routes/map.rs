use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::rasterize::{rasterize, RasterConfig};
use crate::pipeline::render::{MapOptions, RenderAdapter, SvgMap};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/map.svg", get(map_svg))
        .route("/api/map.png", get(map_png))
}

#[derive(Debug, Deserialize)]
struct MapQuery {
    /// Comma separated ids of journeys toggled off in the list.
    hidden: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    background: Option<String>,
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), AppError> {
    const MIN_DIM: u32 = 64;
    const MAX_DIM: u32 = 4096;

    if !(MIN_DIM..=MAX_DIM).contains(&width) || !(MIN_DIM..=MAX_DIM).contains(&height) {
        return Err(AppError::BadRequest(format!(
            "Invalid dimensions: {}x{}. Width/height must be between {} and {}",
            width, height, MIN_DIM, MAX_DIM
        )));
    }
    Ok(())
}

/// Draw every visible journey in store order and fit the view to them.
async fn render_map(state: &AppState, query: &MapQuery) -> Result<(String, MapOptions), AppError> {
    let options = MapOptions {
        width: query.width.unwrap_or(state.config().map_width),
        height: query.height.unwrap_or(state.config().map_height),
        background: query.background.clone(),
        ..MapOptions::default()
    };
    validate_dimensions(options.width, options.height)?;

    let hidden: HashSet<&str> = query
        .hidden
        .as_deref()
        .map(|ids| ids.split(',').map(str::trim).filter(|id| !id.is_empty()).collect())
        .unwrap_or_default();

    let mut map = SvgMap::new();
    {
        let store = state.store().await;
        for (index, journey) in store.list().iter().enumerate() {
            if !hidden.contains(journey.id.as_str()) {
                map.draw(journey, store.color_of(index));
            }
        }
    }
    map.fit_bounds();

    let svg = map.to_svg(&options)?;
    Ok((svg, options))
}

async fn map_svg(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (svg, _) = render_map(&state, &query).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

async fn map_png(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (svg, options) = render_map(&state, &query).await?;
    let config = RasterConfig {
        width: options.width,
        height: options.height,
        background: options.background,
    };
    let png = tokio::task::spawn_blocking(move || rasterize(&svg, &config))
        .await
        .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))??;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
