//! Live capture of position fixes into a pending journey.
//!
//! A [`RecordingSession`] owns the sample buffer; the position source gets a
//! [`SampleSink`] to deliver fixes and errors through. Stopping flips the
//! session inactive under the same lock that guards the buffer, so a fix that
//! arrives after `stop` returns is discarded.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::error::PositionError;
use crate::types::journey::{GeoSample, JourneyRecord};

#[derive(Debug)]
struct SessionState {
    active: bool,
    samples: Vec<GeoSample>,
    status: String,
}

#[derive(Debug)]
pub struct RecordingSession {
    id: String,
    started_at: DateTime<Utc>,
    state: Arc<Mutex<SessionState>>,
}

/// Callback handle for the position source. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SampleSink {
    state: Arc<Mutex<SessionState>>,
}

/// What a session produced once stopped.
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub samples: Vec<GeoSample>,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingSession {
    pub fn start(id: impl Into<String>) -> (Self, SampleSink) {
        let state = Arc::new(Mutex::new(SessionState {
            active: true,
            samples: Vec::new(),
            status: "Journey recording started...".to_string(),
        }));
        let session = Self {
            id: id.into(),
            started_at: Utc::now(),
            state: state.clone(),
        };
        tracing::info!("Recording session {} started", session.id);
        (session, SampleSink { state })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sink(&self) -> SampleSink {
        SampleSink {
            state: self.state.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    pub fn len(&self) -> usize {
        lock(&self.state).samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> String {
        lock(&self.state).status.clone()
    }

    /// Cancel delivery and hand back everything recorded so far, in order.
    pub fn stop(self) -> FinishedRecording {
        let samples = {
            let mut state = lock(&self.state);
            state.active = false;
            state.status = "Journey recording stopped.".to_string();
            std::mem::take(&mut state.samples)
        };
        tracing::info!("Recording session {} stopped with {} sample(s)", self.id, samples.len());
        FinishedRecording {
            id: self.id,
            started_at: self.started_at,
            stopped_at: Utc::now(),
            samples,
        }
    }
}

impl SampleSink {
    /// Append `sample` if the session is still running and the fix is usable.
    pub fn push(&self, sample: GeoSample) -> bool {
        let mut state = lock(&self.state);
        if !state.active {
            tracing::debug!("Ignoring sample delivered after stop");
            return false;
        }
        if !sample.is_valid() {
            tracing::debug!(
                "Ignoring out-of-range sample ({}, {})",
                sample.latitude,
                sample.longitude
            );
            return false;
        }
        state.status = match sample.accuracy {
            Some(accuracy) => format!(
                "Location: ({:.5}, {:.5}) | Accuracy: {}m",
                sample.latitude, sample.longitude, accuracy
            ),
            None => format!("Location: ({:.5}, {:.5})", sample.latitude, sample.longitude),
        };
        state.samples.push(sample);
        true
    }

    /// Surface a position source failure. The session keeps running.
    pub fn report_error(&self, error: &PositionError) {
        let mut state = lock(&self.state);
        if !state.active {
            return;
        }
        tracing::warn!("Position source error: {}", error);
        state.status = format!("Location error: {}", error);
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }
}

impl FinishedRecording {
    /// Build the journey to store. Without a name the start time is used.
    pub fn into_journey(self, name: Option<String>) -> JourneyRecord {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Journey {}", self.started_at.format("%Y-%m-%d %H:%M")));
        let stopped = self.stopped_at.timestamp_millis();
        JourneyRecord::new(String::new(), name, self.samples).with_timestamps(Some(stopped), Some(stopped))
    }
}
