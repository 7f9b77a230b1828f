//! HTTP surface.
//!
//! The operation and field names mirror the client-facing contract; see
//! `router` for the full route table.

pub mod endpoints;
pub mod error;
pub mod principal;
pub mod router;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use crate::editor::Editor;
use crate::planner::Planner;
use crate::ports::{Clock, Geocoder};
use crate::store::PgStore;

#[derive(Clone)]
pub struct State {
    pub store: PgStore,
    pub planner: Arc<Planner<PgStore>>,
    pub editor: Arc<Editor<PgStore>>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub clock: Arc<dyn Clock>,
    pub plan_timeout: Duration,
}
