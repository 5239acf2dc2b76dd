use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::Config;
use crate::recording::RecordingSession;
use crate::store::{FileSlot, JourneyStore};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<Mutex<JourneyStore>>,
    recordings: Arc<DashMap<String, RecordingSession>>,
    http: reqwest::Client,
}

impl AppState {
    /// State backed by the file slot named in `config`.
    pub fn new(config: Config) -> Self {
        let slot = FileSlot::new(config.store_path.clone()).with_quota(config.store_quota);
        let store = JourneyStore::load(slot);
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: JourneyStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            recordings: Arc::new(DashMap::new()),
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Exclusive access to the store. Do not hold across network I/O.
    pub async fn store(&self) -> MutexGuard<'_, JourneyStore> {
        self.store.lock().await
    }

    pub fn insert_recording(&self, session: RecordingSession) {
        self.recordings.insert(session.id().to_string(), session);
    }

    pub fn with_recording<R>(&self, id: &str, f: impl FnOnce(&RecordingSession) -> R) -> Option<R> {
        self.recordings.get(id).map(|entry| f(entry.value()))
    }

    /// Detach a session so it can be stopped. Later lookups for `id` miss.
    pub fn take_recording(&self, id: &str) -> Option<RecordingSession> {
        self.recordings.remove(id).map(|(_, session)| session)
    }

    pub fn recording_count(&self) -> usize {
        self.recordings.len()
    }
}
