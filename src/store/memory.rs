//! In-memory store for tests and local development.
//!
//! Transactions take an owned lock on the whole table set and mutate a
//! working copy; `commit` swaps the copy in, dropping the handle discards
//! it. Concurrent transactions therefore serialize, which also means the
//! conflict error can never arise here.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::model::{Child, Driver, Route, Stop, Vehicle};

use super::{Store, StoreResult, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    children: BTreeMap<Uuid, Child>,
    drivers: BTreeMap<Uuid, Driver>,
    vehicles: BTreeMap<Uuid, Vehicle>,
    routes: BTreeMap<Uuid, Route>,
}

impl Tables {
    fn sorted_route(&self, id: Uuid) -> Option<Route> {
        self.routes.get(&id).cloned().map(|mut route| {
            route.stops.sort_by_key(|s| s.sequence);
            route
        })
    }

    fn routes_on(&self, date: NaiveDate) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .routes
            .values()
            .filter(|r| r.date == date)
            .cloned()
            .collect();
        for route in &mut routes {
            route.stops.sort_by_key(|s| s.sequence);
        }
        routes.sort_by(|a, b| a.name.cmp(&b.name));
        routes
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Roster entities are managed by external CRUD in production; these
    // seeding helpers stand in for it.
    pub async fn insert_child(&self, child: Child) {
        self.inner.lock().await.children.insert(child.id, child);
    }

    pub async fn insert_driver(&self, driver: Driver) {
        self.inner.lock().await.drivers.insert(driver.id, driver);
    }

    pub async fn insert_vehicle(&self, vehicle: Vehicle) {
        self.inner.lock().await.vehicles.insert(vehicle.id, vehicle);
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }

    async fn children(&self) -> StoreResult<Vec<Child>> {
        Ok(self.inner.lock().await.children.values().cloned().collect())
    }

    async fn drivers(&self) -> StoreResult<Vec<Driver>> {
        Ok(self.inner.lock().await.drivers.values().cloned().collect())
    }

    async fn vehicles(&self) -> StoreResult<Vec<Vehicle>> {
        Ok(self.inner.lock().await.vehicles.values().cloned().collect())
    }

    async fn child(&self, id: Uuid) -> StoreResult<Option<Child>> {
        Ok(self.inner.lock().await.children.get(&id).cloned())
    }

    async fn driver(&self, id: Uuid) -> StoreResult<Option<Driver>> {
        Ok(self.inner.lock().await.drivers.get(&id).cloned())
    }

    async fn vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        Ok(self.inner.lock().await.vehicles.get(&id).cloned())
    }

    async fn route(&self, id: Uuid) -> StoreResult<Option<Route>> {
        Ok(self.inner.lock().await.sorted_route(id))
    }

    async fn routes_on(&self, date: NaiveDate) -> StoreResult<Vec<Route>> {
        Ok(self.inner.lock().await.routes_on(date))
    }

    async fn route_for_driver(
        &self,
        driver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<Route>> {
        Ok(self
            .inner
            .lock()
            .await
            .routes_on(date)
            .into_iter()
            .find(|r| r.driver_id == Some(driver_id)))
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn children(&mut self) -> StoreResult<Vec<Child>> {
        Ok(self.work.children.values().cloned().collect())
    }

    async fn drivers(&mut self) -> StoreResult<Vec<Driver>> {
        Ok(self.work.drivers.values().cloned().collect())
    }

    async fn vehicles(&mut self) -> StoreResult<Vec<Vehicle>> {
        Ok(self.work.vehicles.values().cloned().collect())
    }

    async fn child(&mut self, id: Uuid) -> StoreResult<Option<Child>> {
        Ok(self.work.children.get(&id).cloned())
    }

    async fn driver(&mut self, id: Uuid) -> StoreResult<Option<Driver>> {
        Ok(self.work.drivers.get(&id).cloned())
    }

    async fn vehicle(&mut self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        Ok(self.work.vehicles.get(&id).cloned())
    }

    async fn route(&mut self, id: Uuid) -> StoreResult<Option<Route>> {
        Ok(self.work.sorted_route(id))
    }

    async fn routes_on(&mut self, date: NaiveDate) -> StoreResult<Vec<Route>> {
        Ok(self.work.routes_on(date))
    }

    async fn stop(&mut self, id: Uuid) -> StoreResult<Option<Stop>> {
        Ok(self
            .work
            .routes
            .values()
            .flat_map(|r| r.stops.iter())
            .find(|s| s.id == id)
            .cloned())
    }

    async fn insert_route(&mut self, route: &Route) -> StoreResult<()> {
        self.work.routes.insert(route.id, route.clone());
        Ok(())
    }

    async fn update_route(&mut self, route: &Route) -> StoreResult<()> {
        if let Some(existing) = self.work.routes.get_mut(&route.id) {
            existing.name = route.name.clone();
            existing.status = route.status;
            existing.driver_id = route.driver_id;
            existing.vehicle_id = route.vehicle_id;
        }
        Ok(())
    }

    async fn delete_route(&mut self, id: Uuid) -> StoreResult<()> {
        self.work.routes.remove(&id);
        Ok(())
    }

    async fn delete_routes_on(&mut self, date: NaiveDate) -> StoreResult<()> {
        self.work.routes.retain(|_, r| r.date != date);
        Ok(())
    }

    async fn insert_stop(&mut self, stop: &Stop) -> StoreResult<()> {
        if let Some(route) = self.work.routes.get_mut(&stop.route_id) {
            route.stops.push(stop.clone());
        }
        Ok(())
    }

    async fn update_stop_sequence(&mut self, stop_id: Uuid, sequence: u32) -> StoreResult<()> {
        for route in self.work.routes.values_mut() {
            if let Some(stop) = route.stops.iter_mut().find(|s| s.id == stop_id) {
                stop.sequence = sequence;
                return Ok(());
            }
        }
        Ok(())
    }

    async fn delete_stop(&mut self, id: Uuid) -> StoreResult<()> {
        for route in self.work.routes.values_mut() {
            route.stops.retain(|s| s.id != id);
        }
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        let MemoryTx { mut guard, work } = self;
        *guard = work;
        Ok(())
    }
}
