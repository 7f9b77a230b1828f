//! Manual route editing.
//!
//! Every operation runs in its own store transaction and leaves the stop
//! sequences of the touched route as a contiguous 1..N enumeration.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Route, RouteStatus, Stop, StopKind, StopStatus};
use crate::store::{Store, StoreTx};

pub struct Editor<S: Store> {
    store: S,
}

impl<S: Store> Editor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an empty route in the `Planning` state.
    pub async fn create_manual_route(&self, name: &str, date: NaiveDate) -> Result<Route> {
        if name.trim().is_empty() {
            return Err(Error::BadInput("route name must not be empty".into()));
        }

        let route = Route::new(name, date);
        let mut tx = self.store.begin().await?;
        tx.insert_route(&route).await?;
        tx.commit().await?;
        Ok(route)
    }

    /// Delete a route and its stops. Returns whether a route was deleted;
    /// routes past the planning stage are deliberately not protected.
    pub async fn delete_route(&self, route_id: Uuid) -> Result<bool> {
        let mut tx = self.store.begin().await?;
        if tx.route(route_id).await?.is_none() {
            return Ok(false);
        }
        tx.delete_route(route_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Append a pickup stop for `child_id` at the end of the route.
    /// A child may appear on a route only once.
    pub async fn add_stop_to_route(&self, route_id: Uuid, child_id: Uuid) -> Result<Route> {
        let mut tx = self.store.begin().await?;

        let route = tx.route(route_id).await?.ok_or(Error::NotFound("route"))?;
        tx.child(child_id).await?.ok_or(Error::NotFound("child"))?;

        if route.stops.iter().any(|s| s.child_id == child_id) {
            return Err(Error::BadInput("child is already on this route".into()));
        }

        let stop = Stop {
            id: Uuid::new_v4(),
            sequence: route.stops.len() as u32 + 1,
            kind: StopKind::Pickup,
            status: StopStatus::Pending,
            child_id,
            route_id,
        };
        tx.insert_stop(&stop).await?;

        let updated = tx.route(route_id).await?.ok_or(Error::NotFound("route"))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a stop, then densify the owning route's sequences back to
    /// 1..N in the surviving stops' prior order.
    pub async fn remove_stop_from_route(&self, stop_id: Uuid) -> Result<Route> {
        let mut tx = self.store.begin().await?;

        let stop = tx.stop(stop_id).await?.ok_or(Error::NotFound("stop"))?;
        tx.delete_stop(stop_id).await?;

        let route = tx
            .route(stop.route_id)
            .await?
            .ok_or(Error::NotFound("route"))?;

        // Survivors are already ordered by their prior sequence.
        for (index, survivor) in route.stops.iter().enumerate() {
            let sequence = index as u32 + 1;
            if survivor.sequence != sequence {
                tx.update_stop_sequence(survivor.id, sequence).await?;
            }
        }

        let updated = tx
            .route(stop.route_id)
            .await?
            .ok_or(Error::NotFound("route"))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Rewrite the route's stop order to match `stop_ids`. The list must be
    /// exactly a permutation of the route's stops; anything else would
    /// leave stale sequences behind.
    pub async fn reorder_stops(&self, route_id: Uuid, stop_ids: &[Uuid]) -> Result<Route> {
        if stop_ids.is_empty() {
            return Err(Error::BadInput("stopIds must not be empty".into()));
        }

        let mut tx = self.store.begin().await?;
        let route = tx.route(route_id).await?.ok_or(Error::NotFound("route"))?;

        let mut expected: Vec<Uuid> = route.stops.iter().map(|s| s.id).collect();
        let mut provided = stop_ids.to_vec();
        expected.sort();
        provided.sort();
        if expected != provided {
            return Err(Error::BadInput(
                "stopIds must be a permutation of the route's stops".into(),
            ));
        }

        for (index, stop_id) in stop_ids.iter().enumerate() {
            tx.update_stop_sequence(*stop_id, index as u32 + 1).await?;
        }

        let updated = tx.route(route_id).await?.ok_or(Error::NotFound("route"))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Assign a driver and vehicle, refusing same-date double bookings, and
    /// move a planning route to `Assigned`.
    pub async fn assign_driver_and_vehicle(
        &self,
        route_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<Route> {
        let mut tx = self.store.begin().await?;

        let mut route = tx.route(route_id).await?.ok_or(Error::NotFound("route"))?;
        tx.driver(driver_id).await?.ok_or(Error::NotFound("driver"))?;
        tx.vehicle(vehicle_id)
            .await?
            .ok_or(Error::NotFound("vehicle"))?;

        let same_date = tx.routes_on(route.date).await?;
        for other in same_date.iter().filter(|r| r.id != route_id) {
            if other.driver_id == Some(driver_id) {
                return Err(Error::DriverAlreadyAssigned);
            }
            if other.vehicle_id == Some(vehicle_id) {
                return Err(Error::VehicleAlreadyAssigned);
            }
        }

        route.driver_id = Some(driver_id);
        route.vehicle_id = Some(vehicle_id);
        if route.status == RouteStatus::Planning {
            route.status = RouteStatus::Assigned;
        }
        tx.update_route(&route).await?;
        tx.commit().await?;
        Ok(route)
    }
}
