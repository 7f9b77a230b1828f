//! OSRM HTTP adapter for driving-time matrices.

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{PortError, TimeMatrixProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TimeMatrixProvider for OsrmClient {
    async fn matrix(&self, locations: &[(f64, f64)]) -> Result<Vec<Vec<i64>>, PortError> {
        if locations.is_empty() {
            return Ok(Vec::new());
        }

        // OSRM wants lon,lat pairs joined with semicolons.
        let coords = locations
            .iter()
            .map(|(lat, lon)| format!("{:.6},{:.6}", lon, lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/table/v1/{}/{}?annotations=duration",
            self.config.base_url, self.config.profile, coords
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Request(e.to_string()))?;

        let body: OsrmTableResponse = response
            .json()
            .await
            .map_err(|e| PortError::BadResponse(e.to_string()))?;

        if body.code != "Ok" {
            return Err(PortError::BadResponse(body.code));
        }

        let durations = body
            .durations
            .ok_or_else(|| PortError::BadResponse("missing durations".to_string()))?;

        Ok(durations
            .into_iter()
            .map(|row| row.into_iter().map(|value| value.round() as i64).collect())
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    durations: Option<Vec<Vec<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a local OSRM server with a loaded dataset.
    #[tokio::test]
    #[ignore]
    async fn table_against_local_osrm() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let locations = vec![(47.6062, -122.3321), (47.6097, -122.3331)];
        let matrix = client.matrix(&locations).await.unwrap();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].len(), 2);
        assert_eq!(matrix[0][0], 0);
        assert!(matrix[0][1] > 0);
    }
}
