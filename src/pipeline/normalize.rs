use std::collections::HashSet;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::IngestError;
use crate::types::journey::{GeoSample, JourneyRecord};

/// Records produced from one or more documents, plus what went wrong on the way.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub journeys: Vec<JourneyRecord>,
    pub errors: Vec<IngestError>,
}

impl IngestOutcome {
    pub fn merge(&mut self, other: IngestOutcome) {
        self.journeys.extend(other.journeys);
        self.errors.extend(other.errors);
    }
}

/// The document layouts we know how to read, in detection priority order.
#[derive(Debug)]
pub enum DocumentShape<'a> {
    /// `[{id?, name?, data: {journey: [...]}}, ...]` or `[{data: [...]}, ...]`
    MultiJourney(&'a [Value]),
    /// `[{latitude, longitude, ...}, ...]`
    PointSequence(&'a [Value]),
    /// `{name?, journey: [...]}` or `{name?, data: [...]}`
    SingleJourney(&'a Map<String, Value>, &'a [Value]),
    Unrecognized,
}

impl<'a> DocumentShape<'a> {
    pub fn detect(document: &'a Value) -> Self {
        match document {
            Value::Array(items) => match items.first() {
                Some(first) if nested_points(first).is_some() => DocumentShape::MultiJourney(items.as_slice()),
                Some(first) if first.get("latitude").is_some_and(|v| !v.is_null()) => {
                    DocumentShape::PointSequence(items.as_slice())
                }
                _ => DocumentShape::Unrecognized,
            },
            Value::Object(fields) => match single_journey_points(fields) {
                Some(points) => DocumentShape::SingleJourney(fields, points),
                None => DocumentShape::Unrecognized,
            },
            _ => DocumentShape::Unrecognized,
        }
    }
}

/// Parse `text` as JSON and normalize it. Invalid JSON is reported against `source`.
pub fn normalize_text(text: &str, source: Option<&str>, existing_ids: &HashSet<String>) -> IngestOutcome {
    match serde_json::from_str::<Value>(text) {
        Ok(document) => normalize(&document, source, existing_ids),
        Err(e) => IngestOutcome {
            journeys: Vec::new(),
            errors: vec![IngestError::MalformedJson {
                origin: origin_label(source),
                reason: e.to_string(),
            }],
        },
    }
}

/// Turn one parsed document into journeys. Never touches the store: ids are
/// only checked against `existing_ids`.
pub fn normalize(document: &Value, source: Option<&str>, existing_ids: &HashSet<String>) -> IngestOutcome {
    let mut taken = existing_ids.clone();
    normalize_into(document, source, &mut taken)
}

/// Like [`normalize`], but records every id it hands out in `taken` so a
/// batch of documents never produces the same id twice.
pub(crate) fn normalize_into(
    document: &Value,
    source: Option<&str>,
    taken: &mut HashSet<String>,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    match DocumentShape::detect(document) {
        DocumentShape::MultiJourney(items) => {
            for (index, item) in items.iter().enumerate() {
                let id = match item.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    Some(id) if taken.contains(id) => {
                        outcome.errors.push(IngestError::DuplicateJourney {
                            origin: origin_label(source),
                            id: id.to_string(),
                        });
                        continue;
                    }
                    Some(id) => {
                        taken.insert(id.to_string());
                        id.to_string()
                    }
                    None => generate_id(taken),
                };
                let name = item
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Journey {}", index + 1));
                let samples = nested_points(item).map(collect_samples).unwrap_or_default();

                outcome.journeys.push(
                    JourneyRecord::new(id, name, samples).with_timestamps(
                        item.get("createdAt").and_then(Value::as_i64),
                        item.get("updatedAt").and_then(Value::as_i64),
                    ),
                );
            }
        }
        DocumentShape::PointSequence(points) => {
            let id = generate_id(taken);
            outcome
                .journeys
                .push(JourneyRecord::new(id, fallback_name(source), collect_samples(points)));
        }
        DocumentShape::SingleJourney(fields, points) => {
            let id = generate_id(taken);
            let name = fields
                .get("name")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| fallback_name(source));
            outcome.journeys.push(
                JourneyRecord::new(id, name, collect_samples(points)).with_timestamps(
                    fields.get("createdAt").and_then(Value::as_i64),
                    fields.get("updatedAt").and_then(Value::as_i64),
                ),
            );
        }
        DocumentShape::Unrecognized => {
            outcome.errors.push(IngestError::UnrecognizedShape {
                origin: origin_label(source),
            });
        }
    }

    outcome
}

/// A uuid not present in `taken`; it is added to `taken` before returning.
pub fn generate_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = Uuid::new_v4().simple().to_string();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// Read a single point. Anything without both coordinates in range is dropped.
pub fn parse_sample(value: &Value) -> Option<GeoSample> {
    let latitude = value.get("latitude").and_then(Value::as_f64)?;
    let longitude = value.get("longitude").and_then(Value::as_f64)?;
    let sample = GeoSample {
        latitude,
        longitude,
        accuracy: value.get("accuracy").and_then(Value::as_f64),
        timestamp: value.get("timestamp").and_then(as_epoch_millis),
        speed: value.get("speed").and_then(Value::as_f64),
        elevation: value
            .get("elevation")
            .or_else(|| value.get("altitude"))
            .and_then(Value::as_f64),
    };
    sample.is_valid().then_some(sample)
}

fn collect_samples(points: &[Value]) -> Vec<GeoSample> {
    points.iter().filter_map(parse_sample).collect()
}

// Browsers report fractional millisecond timestamps on some platforms.
fn as_epoch_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64))
}

/// The point array of one export element: `data.journey` or `data` itself.
fn nested_points(item: &Value) -> Option<&[Value]> {
    match item.get("data")? {
        Value::Array(points) => Some(points.as_slice()),
        Value::Object(data) => data.get("journey").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

fn single_journey_points(fields: &Map<String, Value>) -> Option<&[Value]> {
    if let Some(points) = fields.get("journey").and_then(Value::as_array) {
        return Some(points.as_slice());
    }
    match fields.get("data")? {
        Value::Array(points) => Some(points.as_slice()),
        Value::Object(data) => data.get("journey").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

/// The last path segment of a file name or URL, without its extension.
pub fn source_stem(source: &str) -> Option<&str> {
    let trimmed = source.split(['?', '#']).next().unwrap_or(source);
    let segment = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    let stem = match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    };
    (!stem.is_empty()).then_some(stem)
}

fn fallback_name(source: Option<&str>) -> String {
    source
        .and_then(source_stem)
        .map(str::to_string)
        .unwrap_or_else(|| "Journey 1".to_string())
}

fn origin_label(source: Option<&str>) -> String {
    source.unwrap_or("input").to_string()
}
