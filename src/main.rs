use std::sync::Arc;
use std::time::Duration;

use shuttle_planner::config::{Config, REQUIRED_VARIABLES};
use shuttle_planner::editor::Editor;
use shuttle_planner::geocode::HttpGeocoder;
use shuttle_planner::haversine::HaversineMatrix;
use shuttle_planner::osrm::{OsrmClient, OsrmConfig};
use shuttle_planner::planner::Planner;
use shuttle_planner::ports::{Geocoder, SystemClock, TimeMatrixProvider};
use shuttle_planner::store::PgStore;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("FATAL: {e}");
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::env().inspect_err(|e| {
        log::error!(
            "config: {e}. Check all required environment variables ({}) are set.",
            REQUIRED_VARIABLES.join(", ")
        );
    })?;

    config.log();

    let store = PgStore::connect(&config.pg_url).await?;
    store.migrate().await?;
    log::info!("Connected to database ({})", config.pg_url);

    let matrix: Arc<dyn TimeMatrixProvider> = match &config.osrm_url {
        Some(base_url) => Arc::new(OsrmClient::new(OsrmConfig {
            base_url: base_url.clone(),
            ..OsrmConfig::default()
        })?),
        None => Arc::new(HaversineMatrix::default()),
    };

    let geocoder: Option<Arc<dyn Geocoder>> = match &config.geocoder_url {
        Some(base_url) => Some(Arc::new(HttpGeocoder::new(base_url)?)),
        None => None,
    };

    let planner = Planner::new(store.clone(), matrix, config.depot())
        .with_capacity_heuristic(config.capacity_heuristic);

    let state = shuttle_planner::api::State {
        store: store.clone(),
        planner: Arc::new(planner),
        editor: Arc::new(Editor::new(store)),
        geocoder,
        clock: Arc::new(SystemClock),
        plan_timeout: Duration::from_secs(config.plan_timeout_secs),
    };

    let listen_addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;

    let router = shuttle_planner::api::router::router(state);

    log::info!("Serving on {listen_addr}");
    axum::serve(listener, router).await?;

    Ok(())
}
