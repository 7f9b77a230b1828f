//! Plan orchestration: the atomic "plan all routes for a date" operation.
//!
//! Runs the whole pipeline (eligibility, workload partitioning, geographic
//! clustering, pickup sequencing) inside one store transaction, after
//! wiping whatever routes the date already had. Re-planning is a full
//! rewrite; manually assembled routes on the date are destroyed too.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cluster::{cluster_children, DEFAULT_CAPACITY_HEURISTIC};
use crate::eligibility::build_eligibility;
use crate::error::Result;
use crate::model::{Child, Driver, Route, Stop, StopKind, StopStatus, Vehicle};
use crate::ports::TimeMatrixProvider;
use crate::sequence::order_pickups;
use crate::store::{Store, StoreTx};
use crate::workload::partition_workloads;

/// A child the current pools cannot carry, with the operator-facing reason.
#[derive(Debug, Clone)]
pub struct UnroutableChild {
    pub child: Child,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct PlanningResult {
    pub generated_routes: Vec<Route>,
    pub unroutable_children: Vec<UnroutableChild>,
}

pub struct Planner<S: Store> {
    store: S,
    matrix: Arc<dyn TimeMatrixProvider>,
    depot: (f64, f64),
    capacity_heuristic: usize,
}

impl<S: Store> Planner<S> {
    pub fn new(store: S, matrix: Arc<dyn TimeMatrixProvider>, depot: (f64, f64)) -> Self {
        Self {
            store,
            matrix,
            depot,
            capacity_heuristic: DEFAULT_CAPACITY_HEURISTIC,
        }
    }

    pub fn with_capacity_heuristic(mut self, capacity_heuristic: usize) -> Self {
        self.capacity_heuristic = capacity_heuristic;
        self
    }

    /// Plan every route for `date`. Existing routes on the date are wiped
    /// first; any failure rolls the whole transaction back.
    pub async fn plan_day(&self, date: NaiveDate) -> Result<PlanningResult> {
        let mut tx = self.store.begin().await?;

        tx.delete_routes_on(date).await?;

        let children = tx.children().await?;
        let drivers = tx.drivers().await?;
        let vehicles = tx.vehicles().await?;

        let eligibility = build_eligibility(&children, &drivers, &vehicles);

        let unroutable_children: Vec<UnroutableChild> = children
            .iter()
            .filter(|c| eligibility.get(&c.id).map_or(true, |o| o.is_empty()))
            .map(|c| UnroutableChild {
                child: c.clone(),
                reason: unroutable_reason(c, &drivers, &vehicles).to_string(),
            })
            .collect();

        let workloads = partition_workloads(&children, &eligibility);

        let mut counter = 1u32;
        for workload in &workloads {
            for cluster in cluster_children(workload, self.capacity_heuristic) {
                let ordered = order_pickups(cluster, self.depot, self.matrix.as_ref()).await;
                if ordered.is_empty() {
                    continue;
                }

                let mut route = Route::new(format!("Route {counter} - {}", workload.label), date);
                let route_id = route.id;
                route.stops = ordered
                    .iter()
                    .enumerate()
                    .map(|(index, child)| Stop {
                        id: Uuid::new_v4(),
                        sequence: index as u32 + 1,
                        kind: StopKind::Pickup,
                        status: StopStatus::Pending,
                        child_id: child.id,
                        route_id,
                    })
                    .collect();

                tx.insert_route(&route).await?;
                counter += 1;
            }
        }

        let generated_routes = tx.routes_on(date).await?;
        tx.commit().await?;

        log::info!(
            "planned {}: {} routes, {} unroutable children",
            date,
            generated_routes.len(),
            unroutable_children.len()
        );

        Ok(PlanningResult {
            generated_routes,
            unroutable_children,
        })
    }
}

/// Operator-facing diagnosis for a child with no eligible transport.
fn unroutable_reason(child: &Child, drivers: &[Driver], vehicles: &[Vehicle]) -> &'static str {
    use crate::model::{Capability, CareCategory, Equipment};

    match child.category {
        CareCategory::Infant => {
            if !drivers
                .iter()
                .any(|d| d.capabilities.contains(&Capability::InfantCertified))
            {
                "No infant-certified driver available"
            } else if !vehicles
                .iter()
                .any(|v| v.equipment.contains(&Equipment::InfantSeat))
            {
                "No vehicle with infant seat available"
            } else {
                "No compatible transport available"
            }
        }
        CareCategory::Toddler => {
            if !vehicles
                .iter()
                .any(|v| v.equipment.contains(&Equipment::ToddlerSeat))
            {
                "No vehicle with toddler seat available"
            } else {
                "No compatible transport available"
            }
        }
        _ => "No compatible transport available",
    }
}
