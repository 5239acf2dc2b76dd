use std::collections::HashSet;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinSet;

use crate::error::IngestError;
use crate::pipeline::normalize::{normalize_into, IngestOutcome};

/// Raw text of one uploaded file or fetched listing, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source: String,
    pub body: SourceBody,
}

#[derive(Debug, Clone)]
pub enum SourceBody {
    Text(String),
    Parsed(Value),
}

impl SourceDocument {
    pub fn text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            body: SourceBody::Text(text.into()),
        }
    }
}

/// Normalize every document on its own. A document that fails only adds to
/// `errors`; ids stay unique across the whole batch.
pub fn normalize_batch(documents: &[SourceDocument], existing_ids: &HashSet<String>) -> IngestOutcome {
    let mut taken = existing_ids.clone();
    let mut outcome = IngestOutcome::default();

    for document in documents {
        let source = Some(document.source.as_str());
        let parsed = match &document.body {
            SourceBody::Parsed(value) => normalize_into(value, source, &mut taken),
            SourceBody::Text(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => normalize_into(&value, source, &mut taken),
                Err(e) => IngestOutcome {
                    journeys: Vec::new(),
                    errors: vec![IngestError::MalformedJson {
                        origin: document.source.clone(),
                        reason: e.to_string(),
                    }],
                },
            },
        };
        tracing::debug!(
            "Normalized {}: {} journey(s), {} error(s)",
            document.source,
            parsed.journeys.len(),
            parsed.errors.len()
        );
        outcome.merge(parsed);
    }

    outcome
}

/// Fetch every listing concurrently. Fetches finish in any order; the
/// result keeps one slot per url in request order.
pub async fn fetch_listings(
    client: &reqwest::Client,
    urls: &[String],
    timeout: Duration,
) -> Vec<Result<SourceDocument, IngestError>> {
    let mut tasks = JoinSet::new();
    for (index, url) in urls.iter().enumerate() {
        let client = client.clone();
        let url = url.clone();
        tasks.spawn(async move { (index, fetch_listing(&client, &url, timeout).await) });
    }

    let mut slots: Vec<Option<Result<SourceDocument, IngestError>>> =
        (0..urls.len()).map(|_| None).collect();
    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                slots[index] = Some(result);
                completed += 1;
            }
            Err(e) => tracing::warn!("Listing fetch task failed: {}", e),
        }
    }
    tracing::info!("Fetched {}/{} listing(s)", completed, urls.len());

    slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| {
                Err(IngestError::Fetch {
                    origin: url.clone(),
                    reason: "fetch task aborted".to_string(),
                })
            })
        })
        .collect()
}

/// GET one listing. Only a 2xx JSON array counts as a usable document.
pub async fn fetch_listing(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<SourceDocument, IngestError> {
    let fetch_error = |reason: String| IngestError::Fetch {
        origin: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(format!("HTTP {}", status)));
    }

    let text = response.text().await.map_err(|e| fetch_error(e.to_string()))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| IngestError::MalformedJson {
        origin: url.to_string(),
        reason: e.to_string(),
    })?;
    if !value.is_array() {
        return Err(fetch_error("expected a JSON array of journeys".to_string()));
    }

    Ok(SourceDocument {
        source: url.to_string(),
        body: SourceBody::Parsed(value),
    })
}
