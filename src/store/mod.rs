//! Transactional persistence port.
//!
//! The planner and editor are generic over [`Store`], so the same flows run
//! against Postgres in production and the in-memory store in tests. All
//! mutations happen inside a [`StoreTx`]; dropping an uncommitted
//! transaction rolls it back.

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Child, Driver, Route, Stop, Vehicle};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Concurrent transactions collided; the caller may retry.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Entity queries plus the transaction seam.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: StoreTx;

    /// Open a transaction. Mutations only happen through the returned
    /// handle; callers must `commit` or the work is discarded.
    async fn begin(&self) -> StoreResult<Self::Tx>;

    async fn children(&self) -> StoreResult<Vec<Child>>;
    async fn drivers(&self) -> StoreResult<Vec<Driver>>;
    async fn vehicles(&self) -> StoreResult<Vec<Vehicle>>;
    async fn child(&self, id: Uuid) -> StoreResult<Option<Child>>;
    async fn driver(&self, id: Uuid) -> StoreResult<Option<Driver>>;
    async fn vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>>;

    /// A route with its stops ordered by sequence.
    async fn route(&self, id: Uuid) -> StoreResult<Option<Route>>;
    /// All routes on a date, stops included, ordered by name.
    async fn routes_on(&self, date: NaiveDate) -> StoreResult<Vec<Route>>;
    /// The route a driver holds on a date, if any.
    async fn route_for_driver(
        &self,
        driver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<Route>>;
}

/// One transaction's view of the store. Reads observe the transaction's own
/// writes.
#[async_trait]
pub trait StoreTx: Send {
    async fn children(&mut self) -> StoreResult<Vec<Child>>;
    async fn drivers(&mut self) -> StoreResult<Vec<Driver>>;
    async fn vehicles(&mut self) -> StoreResult<Vec<Vehicle>>;
    async fn child(&mut self, id: Uuid) -> StoreResult<Option<Child>>;
    async fn driver(&mut self, id: Uuid) -> StoreResult<Option<Driver>>;
    async fn vehicle(&mut self, id: Uuid) -> StoreResult<Option<Vehicle>>;
    async fn route(&mut self, id: Uuid) -> StoreResult<Option<Route>>;
    async fn routes_on(&mut self, date: NaiveDate) -> StoreResult<Vec<Route>>;
    async fn stop(&mut self, id: Uuid) -> StoreResult<Option<Stop>>;

    /// Insert a route together with the stops it carries.
    async fn insert_route(&mut self, route: &Route) -> StoreResult<()>;
    /// Update a route's name, status, and driver/vehicle assignment.
    /// Stops are untouched.
    async fn update_route(&mut self, route: &Route) -> StoreResult<()>;
    /// Delete a route and, by cascade, its stops.
    async fn delete_route(&mut self, id: Uuid) -> StoreResult<()>;
    /// Delete every route (and stop) on a date.
    async fn delete_routes_on(&mut self, date: NaiveDate) -> StoreResult<()>;

    async fn insert_stop(&mut self, stop: &Stop) -> StoreResult<()>;
    async fn update_stop_sequence(&mut self, stop_id: Uuid, sequence: u32) -> StoreResult<()>;
    async fn delete_stop(&mut self, id: Uuid) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;
}
