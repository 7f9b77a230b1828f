//! Environment configuration, loaded once at startup.

use std::env::VarError;

use anyhow::anyhow;

/// Variables without defaults; named in the fatal startup message.
pub const REQUIRED_VARIABLES: &[&str] = &["PG_URL", "DEPOT_LAT", "DEPOT_LON"];

pub struct Config {
    pub pg_url: String,
    pub listen_port: u16,
    /// Facility location; every route starts and ends here.
    pub depot_lat: f64,
    pub depot_lon: f64,
    /// Average-vehicle-capacity assumption used when sizing clusters.
    pub capacity_heuristic: usize,
    /// OSRM base URL; absent means great-circle estimates only.
    pub osrm_url: Option<String>,
    /// Geocoding service base URL; absent disables `geocodeAddress`.
    pub geocoder_url: Option<String>,
    /// Deadline for a single planning run.
    pub plan_timeout_secs: u64,
}

impl Config {
    pub fn env() -> anyhow::Result<Self> {
        Ok(Self {
            pg_url: env("PG_URL")?,
            listen_port: parse(env_or("LISTEN_PORT", "8080"), "LISTEN_PORT")?,
            depot_lat: parse(env("DEPOT_LAT")?, "DEPOT_LAT")?,
            depot_lon: parse(env("DEPOT_LON")?, "DEPOT_LON")?,
            capacity_heuristic: parse(env_or("CAPACITY_HEURISTIC", "10"), "CAPACITY_HEURISTIC")?,
            osrm_url: env_opt("OSRM_URL"),
            geocoder_url: env_opt("GEOCODER_URL"),
            plan_timeout_secs: parse(env_or("PLAN_TIMEOUT_SECS", "30"), "PLAN_TIMEOUT_SECS")?,
        })
    }

    pub fn depot(&self) -> (f64, f64) {
        (self.depot_lat, self.depot_lon)
    }

    pub fn log(&self) {
        log::info!(
            "config: depot=({}, {}), capacity_heuristic={}, osrm={}, geocoder={}, plan_timeout={}s",
            self.depot_lat,
            self.depot_lon,
            self.capacity_heuristic,
            self.osrm_url.as_deref().unwrap_or("(great-circle fallback)"),
            self.geocoder_url.as_deref().unwrap_or("(disabled)"),
            self.plan_timeout_secs,
        );
    }
}

fn env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|e| match e {
        VarError::NotPresent => anyhow!("{name} not set"),
        VarError::NotUnicode(_) => anyhow!("{name} value is not valid unicode"),
    })
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse<T: std::str::FromStr>(value: String, name: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("{name} value {value:?} is invalid: {e}"))
}
