mod slot;

pub use slot::{FileSlot, MemorySlot, StorageSlot};

use std::collections::HashSet;

use crate::error::StoreError;
use crate::pipeline::normalize::generate_id;
use crate::types::journey::JourneyRecord;
use crate::types::palette::Palette;

/// Name of the durable slot the journey list lives under.
pub const STORAGE_KEY: &str = "uploaded_journeys_v1";

/// The result of a mutation plus whether it reached durable storage.
/// Memory is updated either way.
#[derive(Debug)]
#[must_use]
pub struct Persisted<T> {
    pub value: T,
    pub outcome: Result<(), StoreError>,
}

impl<T> Persisted<T> {
    pub fn is_persisted(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Ordered journeys backed by one storage slot. All mutations go through here.
pub struct JourneyStore {
    journeys: Vec<JourneyRecord>,
    slot: Box<dyn StorageSlot>,
    palette: Palette,
}

impl JourneyStore {
    /// Restore from `slot`. Missing or unreadable content yields an empty store.
    pub fn load(slot: impl StorageSlot + 'static) -> Self {
        let journeys = match slot.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<JourneyRecord>>(&raw) {
                Ok(journeys) => journeys,
                Err(e) => {
                    tracing::warn!("Discarding corrupt journey storage: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read journey storage: {}", e);
                Vec::new()
            }
        };
        let journeys = dedupe_ids(journeys);
        tracing::info!("Loaded {} journey(s) from storage", journeys.len());

        Self {
            journeys,
            slot: Box::new(slot),
            palette: Palette::default(),
        }
    }

    pub fn list(&self) -> &[JourneyRecord] {
        &self.journeys
    }

    pub fn get(&self, id: &str) -> Option<&JourneyRecord> {
        self.journeys.iter().find(|j| j.id == id)
    }

    pub fn ids(&self) -> HashSet<String> {
        self.journeys.iter().map(|j| j.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }

    /// Display color of the journey at `index`.
    pub fn color_of(&self, index: usize) -> &'static str {
        self.palette.color_for(index)
    }

    pub fn add(&mut self, record: JourneyRecord) -> Persisted<JourneyRecord> {
        let stored = self.insert(record);
        Persisted {
            value: stored,
            outcome: self.persist(),
        }
    }

    /// Append all records, then write once.
    pub fn add_many(&mut self, records: Vec<JourneyRecord>) -> Persisted<Vec<JourneyRecord>> {
        let stored: Vec<_> = records.into_iter().map(|r| self.insert(r)).collect();
        Persisted {
            value: stored,
            outcome: self.persist(),
        }
    }

    /// Drop the journey with `id`. An unknown id changes nothing and skips the write.
    pub fn remove(&mut self, id: &str) -> Persisted<Option<JourneyRecord>> {
        let Some(index) = self.journeys.iter().position(|j| j.id == id) else {
            return Persisted {
                value: None,
                outcome: Ok(()),
            };
        };
        let removed = self.journeys.remove(index);
        Persisted {
            value: Some(removed),
            outcome: self.persist(),
        }
    }

    /// Write the whole list to the slot. A failed write leaves memory as is.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&self.journeys)?;
        match self.slot.write(&serialized) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("Failed to persist {} journey(s): {}", self.journeys.len(), e);
                Err(e)
            }
        }
    }

    fn insert(&mut self, record: JourneyRecord) -> JourneyRecord {
        let record = if record.id.is_empty() || self.get(&record.id).is_some() {
            if !record.id.is_empty() {
                tracing::warn!("Journey id {} already stored, assigning a new one", record.id);
            }
            let mut taken = self.ids();
            record.with_id(generate_id(&mut taken))
        } else {
            record
        };
        self.journeys.push(record.clone());
        record
    }
}

/// Older slots may hold records without an id or several with the same one.
/// The first holder of an id keeps it, every other record gets a fresh one.
fn dedupe_ids(journeys: Vec<JourneyRecord>) -> Vec<JourneyRecord> {
    let mut taken: HashSet<String> = journeys
        .iter()
        .filter(|j| !j.id.is_empty())
        .map(|j| j.id.clone())
        .collect();
    let mut seen = HashSet::new();
    journeys
        .into_iter()
        .map(|journey| {
            if !journey.id.is_empty() && seen.insert(journey.id.clone()) {
                return journey;
            }
            let id = generate_id(&mut taken);
            tracing::warn!("Stored journey {:?} reassigned id {}", journey.id, id);
            journey.with_id(id)
        })
        .collect()
}
