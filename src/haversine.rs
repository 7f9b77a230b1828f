//! Great-circle time matrix (fallback when OSRM is unavailable).
//!
//! Estimates driving time from straight-line distance at an assumed average
//! speed. Ignores the road network, which is acceptable for the small urban
//! pickup areas this planner serves.

use async_trait::async_trait;

use crate::ports::{PortError, TimeMatrixProvider};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lon) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Haversine-based time matrix provider.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    fn km_to_seconds(&self, km: f64) -> i64 {
        let hours = km / self.speed_kmh;
        (hours * 3600.0).round() as i64
    }

    /// Synchronous estimate; also the fallback path the sequence optimizer
    /// uses when the configured provider fails.
    pub fn estimate(&self, locations: &[(f64, f64)]) -> Vec<Vec<i64>> {
        let n = locations.len();
        let mut matrix = vec![vec![0; n]; n];

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                if i != j {
                    matrix[i][j] = self.km_to_seconds(haversine_km(*from, *to));
                }
            }
        }

        matrix
    }
}

#[async_trait]
impl TimeMatrixProvider for HaversineMatrix {
    async fn matrix(&self, locations: &[(f64, f64)]) -> Result<Vec<Vec<i64>>, PortError> {
        Ok(self.estimate(locations))
    }
}
