//! Request and response bodies. Field names are part of the external
//! contract and stay camelCase on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    CareCategory, Child, Coordinates, Route, RouteStatus, Stop, StopKind, StopStatus,
};
use crate::planner::{PlanningResult, UnroutableChild};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopBody {
    pub id: Uuid,
    pub sequence: u32,
    #[serde(rename = "type")]
    pub kind: StopKind,
    pub status: StopStatus,
    pub child_id: Uuid,
    pub route_id: Uuid,
}

impl From<Stop> for StopBody {
    fn from(stop: Stop) -> Self {
        Self {
            id: stop.id,
            sequence: stop.sequence,
            kind: stop.kind,
            status: stop.status,
            child_id: stop.child_id,
            route_id: stop.route_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBody {
    pub id: Uuid,
    pub name: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub status: RouteStatus,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub stops: Vec<StopBody>,
}

impl From<Route> for RouteBody {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            name: route.name,
            date: route.date.to_string(),
            status: route.status,
            driver_id: route.driver_id,
            vehicle_id: route.vehicle_id,
            stops: route.stops.into_iter().map(StopBody::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildBody {
    pub id: Uuid,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub category: CareCategory,
}

impl From<Child> for ChildBody {
    fn from(child: Child) -> Self {
        Self {
            id: child.id,
            name: child.name,
            street: child.street,
            city: child.city,
            state: child.state,
            lat: child.lat,
            lon: child.lon,
            category: child.category,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnroutableChildBody {
    pub child: ChildBody,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResultBody {
    pub generated_routes: Vec<RouteBody>,
    pub unroutable_children: Vec<UnroutableChildBody>,
}

impl From<PlanningResult> for PlanningResultBody {
    fn from(result: PlanningResult) -> Self {
        Self {
            generated_routes: result
                .generated_routes
                .into_iter()
                .map(RouteBody::from)
                .collect(),
            unroutable_children: result
                .unroutable_children
                .into_iter()
                .map(|UnroutableChild { child, reason }| UnroutableChildBody {
                    child: child.into(),
                    reason,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanAllDailyRoutesRequest {
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateManualRouteRequest {
    pub name: String,
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStopToRouteRequest {
    pub route_id: Uuid,
    pub child_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveStopFromRouteRequest {
    pub stop_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderStopsRequest {
    pub route_id: Uuid,
    pub stop_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverAndVehicleRequest {
    pub route_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRouteRequest {
    pub route_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct OptionalDateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub coordinates: Option<Coordinates>,
}
