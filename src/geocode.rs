//! HTTP geocoder adapter.
//!
//! Talks to a search-style geocoding service: `GET {base}/search?q=<address>`
//! returning a JSON array of candidates with a confidence score. Candidates
//! below the confidence floor are treated as no match.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::model::Coordinates;
use crate::ports::{Geocoder, PortError};

/// Candidates scoring below this are discarded as low-confidence.
const MIN_CONFIDENCE: f64 = 0.5;

#[derive(Clone)]
pub struct HttpGeocoder {
    inner: reqwest::Client,
    base: Url,
}

impl HttpGeocoder {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = base
            .parse()
            .map_err(|e| anyhow::anyhow!("{base} is not a valid url: {e}"))?;

        Ok(Self {
            inner: reqwest::Client::new(),
            base,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    lat: f64,
    lon: f64,
    #[serde(default)]
    confidence: Option<f64>,
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, PortError> {
        let url = self
            .base
            .join("/search")
            .map_err(|e| PortError::Request(format!("error joining url: {e}")))?;

        let candidates: Vec<Candidate> = self
            .inner
            .get(url)
            .query(&[("q", address)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::BadResponse(e.to_string()))?;

        let best = candidates
            .into_iter()
            .find(|c| c.confidence.unwrap_or(1.0) >= MIN_CONFIDENCE);

        Ok(best.map(|c| Coordinates { lat: c.lat, lon: c.lon }))
    }
}
