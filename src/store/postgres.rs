//! Postgres store backed by sqlx.
//!
//! Runtime queries with tuple rows; capability and equipment sets are
//! comma-separated TEXT columns for parity with pre-existing data. Stop
//! rows cascade with their route.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgExecutor;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::model::{
    capabilities_from_csv, equipment_from_csv, CareCategory, Child, Driver, Route, RouteStatus,
    Stop, StopKind, StopStatus, Vehicle,
};

use super::{schema::SCHEMA, Store, StoreError, StoreResult, StoreTx};

#[derive(Clone)]
pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub async fn connect(pg_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(pg_url).await?;
        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap, run once at startup.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> StoreResult<PgTx> {
        let tx = self.pool.begin().await.map_err(db_err)?;
        Ok(PgTx { tx })
    }

    async fn children(&self) -> StoreResult<Vec<Child>> {
        fetch_children(&self.pool).await
    }

    async fn drivers(&self) -> StoreResult<Vec<Driver>> {
        fetch_drivers(&self.pool).await
    }

    async fn vehicles(&self) -> StoreResult<Vec<Vehicle>> {
        fetch_vehicles(&self.pool).await
    }

    async fn child(&self, id: Uuid) -> StoreResult<Option<Child>> {
        fetch_child(&self.pool, id).await
    }

    async fn driver(&self, id: Uuid) -> StoreResult<Option<Driver>> {
        fetch_driver(&self.pool, id).await
    }

    async fn vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        fetch_vehicle(&self.pool, id).await
    }

    async fn route(&self, id: Uuid) -> StoreResult<Option<Route>> {
        let row: Option<RouteRow> =
            sqlx::query_as("SELECT id, name, date, status, driver_id, vehicle_id FROM route WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        match row {
            Some(row) => {
                let stops = fetch_stops(&self.pool, &[row.0]).await?;
                Ok(Some(route_from_row(row, stops)?))
            }
            None => Ok(None),
        }
    }

    async fn routes_on(&self, date: NaiveDate) -> StoreResult<Vec<Route>> {
        let rows: Vec<RouteRow> = sqlx::query_as(
            "SELECT id, name, date, status, driver_id, vehicle_id FROM route WHERE date = $1 ORDER BY name",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        assemble_routes(&self.pool, rows).await
    }

    async fn route_for_driver(
        &self,
        driver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<Route>> {
        let row: Option<RouteRow> = sqlx::query_as(
            "SELECT id, name, date, status, driver_id, vehicle_id
             FROM route WHERE driver_id = $1 AND date = $2",
        )
        .bind(driver_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => {
                let stops = fetch_stops(&self.pool, &[row.0]).await?;
                Ok(Some(route_from_row(row, stops)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn children(&mut self) -> StoreResult<Vec<Child>> {
        fetch_children(&mut *self.tx).await
    }

    async fn drivers(&mut self) -> StoreResult<Vec<Driver>> {
        fetch_drivers(&mut *self.tx).await
    }

    async fn vehicles(&mut self) -> StoreResult<Vec<Vehicle>> {
        fetch_vehicles(&mut *self.tx).await
    }

    async fn child(&mut self, id: Uuid) -> StoreResult<Option<Child>> {
        fetch_child(&mut *self.tx, id).await
    }

    async fn driver(&mut self, id: Uuid) -> StoreResult<Option<Driver>> {
        fetch_driver(&mut *self.tx, id).await
    }

    async fn vehicle(&mut self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        fetch_vehicle(&mut *self.tx, id).await
    }

    async fn route(&mut self, id: Uuid) -> StoreResult<Option<Route>> {
        let row: Option<RouteRow> =
            sqlx::query_as("SELECT id, name, date, status, driver_id, vehicle_id FROM route WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_err)?;

        match row {
            Some(row) => {
                let stops = fetch_stops(&mut *self.tx, &[row.0]).await?;
                Ok(Some(route_from_row(row, stops)?))
            }
            None => Ok(None),
        }
    }

    async fn routes_on(&mut self, date: NaiveDate) -> StoreResult<Vec<Route>> {
        // Locks the date's routes so concurrent planners serialize.
        let rows: Vec<RouteRow> = sqlx::query_as(
            "SELECT id, name, date, status, driver_id, vehicle_id
             FROM route WHERE date = $1 ORDER BY name FOR UPDATE",
        )
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.0).collect();
        let stops = fetch_stops(&mut *self.tx, &ids).await?;
        zip_routes(rows, stops)
    }

    async fn stop(&mut self, id: Uuid) -> StoreResult<Option<Stop>> {
        let row: Option<StopRow> = sqlx::query_as(
            "SELECT id, sequence, kind, status, child_id, route_id FROM stop WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(stop_from_row).transpose()
    }

    async fn insert_route(&mut self, route: &Route) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO route (id, name, date, status, driver_id, vehicle_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(route.id)
        .bind(&route.name)
        .bind(route.date)
        .bind(route.status.as_str())
        .bind(route.driver_id)
        .bind(route.vehicle_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        for stop in &route.stops {
            self.insert_stop(stop).await?;
        }
        Ok(())
    }

    async fn update_route(&mut self, route: &Route) -> StoreResult<()> {
        sqlx::query(
            "UPDATE route SET name = $2, status = $3, driver_id = $4, vehicle_id = $5 WHERE id = $1",
        )
        .bind(route.id)
        .bind(&route.name)
        .bind(route.status.as_str())
        .bind(route.driver_id)
        .bind(route.vehicle_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_route(&mut self, id: Uuid) -> StoreResult<()> {
        // Stops go with the route (ON DELETE CASCADE).
        sqlx::query("DELETE FROM route WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_routes_on(&mut self, date: NaiveDate) -> StoreResult<()> {
        sqlx::query("DELETE FROM route WHERE date = $1")
            .bind(date)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_stop(&mut self, stop: &Stop) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO stop (id, sequence, kind, status, child_id, route_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(stop.id)
        .bind(stop.sequence as i32)
        .bind(stop.kind.as_str())
        .bind(stop.status.as_str())
        .bind(stop.child_id)
        .bind(stop.route_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_stop_sequence(&mut self, stop_id: Uuid, sequence: u32) -> StoreResult<()> {
        sqlx::query("UPDATE stop SET sequence = $2 WHERE id = $1")
            .bind(stop_id)
            .bind(sequence as i32)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_stop(&mut self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM stop WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(db_err)
    }
}

// ---------------------------------------------------------------------------
// Row types and shared queries
// ---------------------------------------------------------------------------

type ChildRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    Option<f64>,
    Option<f64>,
    String,
);
type DriverRow = (Uuid, String, String);
type VehicleRow = (Uuid, String, i32, String);
type RouteRow = (Uuid, String, NaiveDate, String, Option<Uuid>, Option<Uuid>);
type StopRow = (Uuid, i32, String, String, Uuid, Uuid);

async fn fetch_children<'e, E: PgExecutor<'e>>(exec: E) -> StoreResult<Vec<Child>> {
    let rows: Vec<ChildRow> = sqlx::query_as(
        "SELECT id, name, street, city, state, lat, lon, category FROM child ORDER BY name",
    )
    .fetch_all(exec)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(child_from_row).collect()
}

async fn fetch_child<'e, E: PgExecutor<'e>>(exec: E, id: Uuid) -> StoreResult<Option<Child>> {
    let row: Option<ChildRow> = sqlx::query_as(
        "SELECT id, name, street, city, state, lat, lon, category FROM child WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(exec)
    .await
    .map_err(db_err)?;
    row.map(child_from_row).transpose()
}

async fn fetch_drivers<'e, E: PgExecutor<'e>>(exec: E) -> StoreResult<Vec<Driver>> {
    let rows: Vec<DriverRow> =
        sqlx::query_as("SELECT id, name, capabilities FROM driver ORDER BY name")
            .fetch_all(exec)
            .await
            .map_err(db_err)?;
    rows.into_iter().map(driver_from_row).collect()
}

async fn fetch_driver<'e, E: PgExecutor<'e>>(exec: E, id: Uuid) -> StoreResult<Option<Driver>> {
    let row: Option<DriverRow> =
        sqlx::query_as("SELECT id, name, capabilities FROM driver WHERE id = $1")
            .bind(id)
            .fetch_optional(exec)
            .await
            .map_err(db_err)?;
    row.map(driver_from_row).transpose()
}

async fn fetch_vehicles<'e, E: PgExecutor<'e>>(exec: E) -> StoreResult<Vec<Vehicle>> {
    let rows: Vec<VehicleRow> =
        sqlx::query_as("SELECT id, name, capacity, equipment FROM vehicle ORDER BY name")
            .fetch_all(exec)
            .await
            .map_err(db_err)?;
    rows.into_iter().map(vehicle_from_row).collect()
}

async fn fetch_vehicle<'e, E: PgExecutor<'e>>(exec: E, id: Uuid) -> StoreResult<Option<Vehicle>> {
    let row: Option<VehicleRow> =
        sqlx::query_as("SELECT id, name, capacity, equipment FROM vehicle WHERE id = $1")
            .bind(id)
            .fetch_optional(exec)
            .await
            .map_err(db_err)?;
    row.map(vehicle_from_row).transpose()
}

async fn fetch_stops<'e, E: PgExecutor<'e>>(exec: E, route_ids: &[Uuid]) -> StoreResult<Vec<Stop>> {
    if route_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<StopRow> = sqlx::query_as(
        "SELECT id, sequence, kind, status, child_id, route_id
         FROM stop WHERE route_id = ANY($1) ORDER BY sequence",
    )
    .bind(route_ids)
    .fetch_all(exec)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(stop_from_row).collect()
}

async fn assemble_routes<'e, E: PgExecutor<'e>>(
    exec: E,
    rows: Vec<RouteRow>,
) -> StoreResult<Vec<Route>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.0).collect();
    let stops = fetch_stops(exec, &ids).await?;
    zip_routes(rows, stops)
}

fn zip_routes(rows: Vec<RouteRow>, stops: Vec<Stop>) -> StoreResult<Vec<Route>> {
    let mut by_route: HashMap<Uuid, Vec<Stop>> = HashMap::new();
    for stop in stops {
        by_route.entry(stop.route_id).or_default().push(stop);
    }

    rows.into_iter()
        .map(|row| {
            let own = by_route.remove(&row.0).unwrap_or_default();
            route_from_row(row, own)
        })
        .collect()
}

fn child_from_row(row: ChildRow) -> StoreResult<Child> {
    let (id, name, street, city, state, lat, lon, category) = row;
    let category = CareCategory::from_str(&category)
        .ok_or_else(|| StoreError::Backend(anyhow!("unknown care category: {category}")))?;
    Ok(Child {
        id,
        name,
        street,
        city,
        state,
        lat,
        lon,
        category,
    })
}

fn driver_from_row(row: DriverRow) -> StoreResult<Driver> {
    let (id, name, capabilities) = row;
    let capabilities =
        capabilities_from_csv(&capabilities).map_err(|e| StoreError::Backend(anyhow!(e)))?;
    Ok(Driver {
        id,
        name,
        capabilities,
    })
}

fn vehicle_from_row(row: VehicleRow) -> StoreResult<Vehicle> {
    let (id, name, capacity, equipment) = row;
    let equipment = equipment_from_csv(&equipment).map_err(|e| StoreError::Backend(anyhow!(e)))?;
    Ok(Vehicle {
        id,
        name,
        capacity: capacity.max(0) as u32,
        equipment,
    })
}

fn route_from_row(row: RouteRow, stops: Vec<Stop>) -> StoreResult<Route> {
    let (id, name, date, status, driver_id, vehicle_id) = row;
    let status = RouteStatus::from_str(&status)
        .ok_or_else(|| StoreError::Backend(anyhow!("unknown route status: {status}")))?;
    Ok(Route {
        id,
        name,
        date,
        status,
        driver_id,
        vehicle_id,
        stops,
    })
}

fn stop_from_row(row: StopRow) -> StoreResult<Stop> {
    let (id, sequence, kind, status, child_id, route_id) = row;
    let kind = StopKind::from_str(&kind)
        .ok_or_else(|| StoreError::Backend(anyhow!("unknown stop kind: {kind}")))?;
    let status = StopStatus::from_str(&status)
        .ok_or_else(|| StoreError::Backend(anyhow!("unknown stop status: {status}")))?;
    Ok(Stop {
        id,
        sequence: sequence.max(0) as u32,
        kind,
        status,
        child_id,
        route_id,
    })
}

/// Serialization and deadlock failures become retryable conflicts; anything
/// else is a backend fault.
fn db_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.code().as_deref(), Some("40001") | Some("40P01")) {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Backend(anyhow::Error::new(e))
}
