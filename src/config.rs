use std::path::PathBuf;
use std::time::Duration;

/// Relative path of the all-journeys export served next to the viewer.
pub const LISTING_PATH: &str = "Journeys/all_journeys.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub store_path: PathBuf,
    pub store_quota: usize,
    pub listing_base_url: String,
    pub fetch_timeout: Duration,
    pub map_width: u32,
    pub map_height: u32,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_or("PORT", 3000);
        let max_file_size_mb: usize = env_or("MAX_FILE_SIZE_MB", 25);
        let store_quota = env_or("STORE_QUOTA_BYTES", 5 * 1024 * 1024);
        let fetch_timeout_seconds = env_or("FETCH_TIMEOUT_SECONDS", 10);

        let store_path = std::env::var("STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data").join(format!("{}.json", crate::store::STORAGE_KEY)));
        let listing_base_url = std::env::var("LISTING_BASE_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}/", port));
        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets/web"));

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            store_path,
            store_quota,
            listing_base_url,
            fetch_timeout: Duration::from_secs(fetch_timeout_seconds),
            map_width: env_or("MAP_WIDTH", 1024),
            map_height: env_or("MAP_HEIGHT", 768),
            static_dir,
        }
    }

    /// The well-known listing under the configured base url.
    pub fn listing_url(&self) -> String {
        if self.listing_base_url.ends_with('/') {
            format!("{}{}", self.listing_base_url, LISTING_PATH)
        } else {
            format!("{}/{}", self.listing_base_url, LISTING_PATH)
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
