use axum::routing::{get, post};

use super::endpoints::*;

pub fn router(state: super::State) -> axum::Router {
    axum::Router::new()
        .route("/children", get(children))
        .route("/children/{id}", get(child))
        .route("/drivers", get(drivers))
        .route("/drivers/{id}", get(driver))
        .route("/vehicles", get(vehicles))
        .route("/vehicles/{id}", get(vehicle))
        .route("/routes", get(routes))
        .route("/routes/{id}", get(route))
        .route("/geocodeAddress", get(geocode_address))
        .route("/getMyAssignedRoute", get(get_my_assigned_route))
        .route("/planAllDailyRoutes", post(plan_all_daily_routes))
        .route("/createManualRoute", post(create_manual_route))
        .route("/addStopToRoute", post(add_stop_to_route))
        .route("/removeStopFromRoute", post(remove_stop_from_route))
        .route("/reorderStops", post(reorder_stops))
        .route("/assignDriverAndVehicleToRoute", post(assign_driver_and_vehicle_to_route))
        .route("/deleteRoute", post(delete_route))
        .with_state(state)
}
