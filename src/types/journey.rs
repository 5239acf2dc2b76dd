use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One position fix, either delivered live or read from an imported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl GeoSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: None,
            speed: None,
            elevation: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoSample) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyStats {
    /// Meters along the path.
    pub distance: f64,
    /// Milliseconds between the first and last timestamped sample.
    pub duration: i64,
    pub points: usize,
}

impl JourneyStats {
    pub fn compute(samples: &[GeoSample]) -> Self {
        let distance = samples
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum();

        let mut timestamps = samples.iter().filter_map(|s| s.timestamp);
        let duration = match (timestamps.next(), timestamps.last()) {
            (Some(first), Some(last)) => last.saturating_sub(first).max(0),
            _ => 0,
        };

        Self {
            distance,
            duration,
            points: samples.len(),
        }
    }
}

/// A normalized journey. Stats are derived from `data` whenever a record is
/// built or deserialized, so they cannot drift from the samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredJourney")]
pub struct JourneyRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    pub stats: JourneyStats,
    pub data: Vec<GeoSample>,
}

impl JourneyRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: Vec<GeoSample>) -> Self {
        let stats = JourneyStats::compute(&data);
        Self {
            id: id.into(),
            name: name.into(),
            created_at: None,
            updated_at: None,
            stats,
            data,
        }
    }

    pub fn with_timestamps(mut self, created_at: Option<i64>, updated_at: Option<i64>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Same journey under a different id; used when the store has to assign one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn samples(&self) -> &[GeoSample] {
        &self.data
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredJourney {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    updated_at: Option<i64>,
    #[serde(default)]
    data: Vec<GeoSample>,
}

impl From<StoredJourney> for JourneyRecord {
    fn from(stored: StoredJourney) -> Self {
        let data = stored.data.into_iter().filter(GeoSample::is_valid).collect();
        JourneyRecord::new(stored.id, stored.name, data)
            .with_timestamps(stored.created_at, stored.updated_at)
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
