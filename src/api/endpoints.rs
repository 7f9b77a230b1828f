//! Request handlers.

use axum::extract::{Json, Path, Query, State};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Error;
use crate::model::RouteStatus;
use crate::store::Store;

use super::principal::Principal;
use super::types::*;

pub type Result<T> = std::result::Result<T, Error>;

fn parse_date(value: &str) -> Result<NaiveDate> {
    value
        .parse()
        .map_err(|_| Error::BadInput(format!("{value:?} is not a YYYY-MM-DD date")))
}

// ---------------------------------------------------------------------------
// Queries (admin)
// ---------------------------------------------------------------------------

pub async fn children(
    principal: Principal,
    State(state): State<super::State>,
) -> Result<Json<Vec<ChildBody>>> {
    principal.require_admin()?;
    let children = state.store.children().await?;
    Ok(Json(children.into_iter().map(ChildBody::from).collect()))
}

pub async fn child(
    principal: Principal,
    State(state): State<super::State>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChildBody>> {
    principal.require_admin()?;
    let child = state.store.child(id).await?.ok_or(Error::NotFound("child"))?;
    Ok(Json(child.into()))
}

pub async fn drivers(
    principal: Principal,
    State(state): State<super::State>,
) -> Result<Json<Vec<crate::model::Driver>>> {
    principal.require_admin()?;
    Ok(Json(state.store.drivers().await?))
}

pub async fn driver(
    principal: Principal,
    State(state): State<super::State>,
    Path(id): Path<Uuid>,
) -> Result<Json<crate::model::Driver>> {
    principal.require_admin()?;
    let driver = state
        .store
        .driver(id)
        .await?
        .ok_or(Error::NotFound("driver"))?;
    Ok(Json(driver))
}

pub async fn vehicles(
    principal: Principal,
    State(state): State<super::State>,
) -> Result<Json<Vec<crate::model::Vehicle>>> {
    principal.require_admin()?;
    Ok(Json(state.store.vehicles().await?))
}

pub async fn vehicle(
    principal: Principal,
    State(state): State<super::State>,
    Path(id): Path<Uuid>,
) -> Result<Json<crate::model::Vehicle>> {
    principal.require_admin()?;
    let vehicle = state
        .store
        .vehicle(id)
        .await?
        .ok_or(Error::NotFound("vehicle"))?;
    Ok(Json(vehicle))
}

pub async fn routes(
    principal: Principal,
    State(state): State<super::State>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<RouteBody>>> {
    principal.require_admin()?;
    let date = parse_date(&query.date)?;
    let routes = state.store.routes_on(date).await?;
    Ok(Json(routes.into_iter().map(RouteBody::from).collect()))
}

pub async fn route(
    principal: Principal,
    State(state): State<super::State>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteBody>> {
    principal.require_admin()?;
    let route = state.store.route(id).await?.ok_or(Error::NotFound("route"))?;
    Ok(Json(route.into()))
}

pub async fn geocode_address(
    principal: Principal,
    State(state): State<super::State>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>> {
    principal.require_admin()?;
    let geocoder = state
        .geocoder
        .as_ref()
        .ok_or_else(|| Error::PortFailure("no geocoder configured".into()))?;
    let coordinates = geocoder.lookup(&query.address).await?;
    Ok(Json(GeocodeResponse { coordinates }))
}

// ---------------------------------------------------------------------------
// Queries (driver)
// ---------------------------------------------------------------------------

/// The principal's route for the date (today when omitted), once it has
/// left the planning stage.
pub async fn get_my_assigned_route(
    principal: Principal,
    State(state): State<super::State>,
    Query(query): Query<OptionalDateQuery>,
) -> Result<Json<RouteBody>> {
    let driver_id = principal.require_driver()?;
    let date = match query.date {
        Some(raw) => parse_date(&raw)?,
        None => state.clock.today(),
    };

    let route = state
        .store
        .route_for_driver(driver_id, date)
        .await?
        .filter(|r| r.status != RouteStatus::Planning)
        .ok_or(Error::NotFound("route"))?;
    Ok(Json(route.into()))
}

// ---------------------------------------------------------------------------
// Mutations (admin)
// ---------------------------------------------------------------------------

pub async fn plan_all_daily_routes(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<PlanAllDailyRoutesRequest>,
) -> Result<Json<PlanningResultBody>> {
    principal.require_admin()?;
    let date = parse_date(&request.date)?;

    // The deadline covers the whole transaction; expiry drops it and the
    // store rolls back.
    let result = tokio::time::timeout(state.plan_timeout, state.planner.plan_day(date))
        .await
        .map_err(|_| Error::Timeout)??;
    Ok(Json(result.into()))
}

pub async fn create_manual_route(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<CreateManualRouteRequest>,
) -> Result<Json<RouteBody>> {
    principal.require_admin()?;
    let date = parse_date(&request.date)?;
    let route = state.editor.create_manual_route(&request.name, date).await?;
    Ok(Json(route.into()))
}

pub async fn add_stop_to_route(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<AddStopToRouteRequest>,
) -> Result<Json<RouteBody>> {
    principal.require_admin()?;
    let route = state
        .editor
        .add_stop_to_route(request.route_id, request.child_id)
        .await?;
    Ok(Json(route.into()))
}

pub async fn remove_stop_from_route(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<RemoveStopFromRouteRequest>,
) -> Result<Json<RouteBody>> {
    principal.require_admin()?;
    let route = state.editor.remove_stop_from_route(request.stop_id).await?;
    Ok(Json(route.into()))
}

pub async fn reorder_stops(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<ReorderStopsRequest>,
) -> Result<Json<RouteBody>> {
    principal.require_admin()?;
    let route = state
        .editor
        .reorder_stops(request.route_id, &request.stop_ids)
        .await?;
    Ok(Json(route.into()))
}

pub async fn assign_driver_and_vehicle_to_route(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<AssignDriverAndVehicleRequest>,
) -> Result<Json<RouteBody>> {
    principal.require_admin()?;
    let route = state
        .editor
        .assign_driver_and_vehicle(request.route_id, request.driver_id, request.vehicle_id)
        .await?;
    Ok(Json(route.into()))
}

pub async fn delete_route(
    principal: Principal,
    State(state): State<super::State>,
    Json(request): Json<DeleteRouteRequest>,
) -> Result<Json<bool>> {
    principal.require_admin()?;
    let deleted = state.editor.delete_route(request.route_id).await?;
    Ok(Json(deleted))
}
