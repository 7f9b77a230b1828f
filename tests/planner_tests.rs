//! Planning pipeline scenarios: eligibility diagnosis, clustering, pickup
//! ordering, and the wipe-and-rewrite transaction.

mod fixtures;

use chrono::NaiveDate;
use fixtures::*;
use shuttle_planner::editor::Editor;
use shuttle_planner::model::{Capability, CareCategory, Equipment, RouteStatus, StopKind, StopStatus};
use shuttle_planner::store::Store;
use uuid::Uuid;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

// ============================================================================
// Unroutable diagnosis
// ============================================================================

#[tokio::test]
async fn infant_with_no_certified_driver_is_unroutable() {
    let alex = child_at("Alex", CareCategory::Infant, 47.61, -122.33);
    let store = seeded_store(
        &[alex.clone()],
        &[driver("Dana", &[])],
        &[vehicle("Van", &[])],
    )
    .await;

    let result = planner(&store).plan_day(date(10)).await.unwrap();

    assert!(result.generated_routes.is_empty());
    assert_eq!(result.unroutable_children.len(), 1);
    assert_eq!(result.unroutable_children[0].child.id, alex.id);
    assert_eq!(
        result.unroutable_children[0].reason,
        "No infant-certified driver available"
    );
}

#[tokio::test]
async fn infant_with_driver_but_no_seat_gets_vehicle_reason() {
    let alex = child_at("Alex", CareCategory::Infant, 47.61, -122.33);
    let store = seeded_store(
        &[alex],
        &[driver("Dana", &[Capability::InfantCertified])],
        &[vehicle("Van", &[])],
    )
    .await;

    let result = planner(&store).plan_day(date(10)).await.unwrap();
    assert_eq!(
        result.unroutable_children[0].reason,
        "No vehicle with infant seat available"
    );
}

#[tokio::test]
async fn toddler_without_seat_gets_vehicle_reason() {
    let kim = child_at("Kim", CareCategory::Toddler, 47.61, -122.33);
    let store = seeded_store(
        &[kim],
        &[driver("Dana", &[Capability::ToddlerTrained])],
        &[vehicle("Van", &[])],
    )
    .await;

    let result = planner(&store).plan_day(date(10)).await.unwrap();
    assert_eq!(
        result.unroutable_children[0].reason,
        "No vehicle with toddler seat available"
    );
}

#[tokio::test]
async fn toddler_with_seat_but_untrained_driver_gets_generic_reason() {
    let kim = child_at("Kim", CareCategory::Toddler, 47.61, -122.33);
    let store = seeded_store(
        &[kim],
        &[driver("Dana", &[])],
        &[vehicle("Van", &[Equipment::ToddlerSeat])],
    )
    .await;

    let result = planner(&store).plan_day(date(10)).await.unwrap();
    assert_eq!(
        result.unroutable_children[0].reason,
        "No compatible transport available"
    );
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn single_cluster_produces_one_ordered_route() {
    let a = child_at("A", CareCategory::Preschool, 47.61, -122.33);
    let b = child_at("B", CareCategory::Preschool, 47.62, -122.34);
    let c = child_at("C", CareCategory::Preschool, 47.63, -122.35);
    let store = seeded_store(
        &[c.clone(), a.clone(), b.clone()],
        &[driver("Dana", &[])],
        &[vehicle("Van", &[])],
    )
    .await;

    let result = planner(&store).plan_day(date(11)).await.unwrap();

    assert!(result.unroutable_children.is_empty());
    assert_eq!(result.generated_routes.len(), 1);

    let route = &result.generated_routes[0];
    assert_eq!(route.name, "Route 1 - Preschool");
    assert_eq!(route.status, RouteStatus::Planning);
    assert!(route.driver_id.is_none());
    assert!(route.vehicle_id.is_none());

    assert_eq!(route.stops.len(), 3);
    let sequences: Vec<u32> = route.stops.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    for stop in &route.stops {
        assert_eq!(stop.kind, StopKind::Pickup);
        assert_eq!(stop.status, StopStatus::Pending);
    }

    // Great-circle estimates walk away from the depot: A, then B, then C.
    let pickup_order: Vec<Uuid> = route.stops.iter().map(|s| s.child_id).collect();
    assert_eq!(pickup_order, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn categories_with_disjoint_options_split_into_routes() {
    let infant = child_at("I", CareCategory::Infant, 47.61, -122.33);
    let toddler = child_at("T", CareCategory::Toddler, 47.62, -122.34);
    let preschooler = child_at("P", CareCategory::Preschool, 47.63, -122.35);
    let store = seeded_store(
        &[infant.clone(), toddler.clone(), preschooler.clone()],
        &[
            driver("D1", &[Capability::InfantCertified]),
            driver("D2", &[Capability::ToddlerTrained]),
        ],
        &[
            vehicle("V1", &[Equipment::InfantSeat]),
            vehicle("V2", &[Equipment::ToddlerSeat]),
        ],
    )
    .await;

    let result = planner(&store).plan_day(date(12)).await.unwrap();

    assert!(result.unroutable_children.is_empty());
    assert_eq!(result.generated_routes.len(), 3);

    let mut labels: Vec<String> = result
        .generated_routes
        .iter()
        .map(|r| r.name.split(" - ").nth(1).unwrap().to_string())
        .collect();
    labels.sort();
    assert_eq!(labels, vec!["Infant", "Preschool", "Toddler"]);

    for route in &result.generated_routes {
        assert_eq!(route.stops.len(), 1);
    }

    let single_stop_child = |label: &str| {
        result
            .generated_routes
            .iter()
            .find(|r| r.name.ends_with(label))
            .unwrap()
            .stops[0]
            .child_id
    };
    assert_eq!(single_stop_child("Infant"), infant.id);
    assert_eq!(single_stop_child("Toddler"), toddler.id);
    assert_eq!(single_stop_child("Preschool"), preschooler.id);
}

// ============================================================================
// Boundaries
// ============================================================================

#[tokio::test]
async fn empty_roster_plans_nothing() {
    let store = seeded_store(&[], &[driver("Dana", &[])], &[vehicle("Van", &[])]).await;

    let result = planner(&store).plan_day(date(13)).await.unwrap();
    assert!(result.generated_routes.is_empty());
    assert!(result.unroutable_children.is_empty());
}

#[tokio::test]
async fn child_without_coordinates_trails_its_route() {
    let a = child_at("A", CareCategory::Preschool, 47.61, -122.33);
    let b = child_at("B", CareCategory::Preschool, 47.62, -122.34);
    let lost = child("NoAddress", CareCategory::Preschool);
    let store = seeded_store(
        &[lost.clone(), a.clone(), b.clone()],
        &[driver("Dana", &[])],
        &[vehicle("Van", &[])],
    )
    .await;

    let result = planner(&store).plan_day(date(14)).await.unwrap();

    assert_eq!(result.generated_routes.len(), 1);
    let route = &result.generated_routes[0];
    assert_eq!(route.stops.len(), 3);
    assert_eq!(route.stops.last().unwrap().child_id, lost.id);
    assert!(result.unroutable_children.is_empty());
}

// ============================================================================
// Re-planning
// ============================================================================

#[tokio::test]
async fn replanning_rewrites_routes_with_identical_shape() {
    let a = child_at("A", CareCategory::Preschool, 47.61, -122.33);
    let b = child_at("B", CareCategory::Preschool, 47.62, -122.34);
    let c = child_at("C", CareCategory::Preschool, 47.63, -122.35);
    let store = seeded_store(
        &[a, b, c],
        &[driver("Dana", &[])],
        &[vehicle("Van", &[])],
    )
    .await;
    let planner = planner(&store);

    let first = planner.plan_day(date(15)).await.unwrap();
    let second = planner.plan_day(date(15)).await.unwrap();

    let shape = |result: &shuttle_planner::planner::PlanningResult| {
        result
            .generated_routes
            .iter()
            .map(|r| {
                (
                    r.name.clone(),
                    r.stops.iter().map(|s| s.child_id).collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));

    // Full rewrite: fresh identities every time.
    let first_ids: Vec<Uuid> = first.generated_routes.iter().map(|r| r.id).collect();
    let second_ids: Vec<Uuid> = second.generated_routes.iter().map(|r| r.id).collect();
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

    // And the store holds only the second plan's routes.
    let persisted = store.routes_on(date(15)).await.unwrap();
    assert_eq!(persisted.len(), second.generated_routes.len());
}

#[tokio::test]
async fn replanning_destroys_manually_created_routes() {
    let store = seeded_store(&[], &[], &[]).await;
    let editor = Editor::new(store.clone());

    let manual = editor
        .create_manual_route("Field Trip Shuttle", date(16))
        .await
        .unwrap();

    let result = planner(&store).plan_day(date(16)).await.unwrap();
    assert!(result.generated_routes.is_empty());
    assert!(store.route(manual.id).await.unwrap().is_none());
}

#[tokio::test]
async fn large_workload_splits_by_capacity_heuristic() {
    // 12 preschoolers in two geographic lumps; heuristic 10 gives k = 2.
    let mut roster = Vec::new();
    for i in 0..6 {
        roster.push(child_at(
            &format!("N{i}"),
            CareCategory::Preschool,
            47.70 + i as f64 * 0.002,
            -122.30,
        ));
    }
    for i in 0..6 {
        roster.push(child_at(
            &format!("S{i}"),
            CareCategory::Preschool,
            47.50 + i as f64 * 0.002,
            -122.40,
        ));
    }
    let store = seeded_store(&roster, &[driver("Dana", &[])], &[vehicle("Van", &[])]).await;

    let result = planner(&store).plan_day(date(17)).await.unwrap();

    assert_eq!(result.generated_routes.len(), 2);
    let total_stops: usize = result.generated_routes.iter().map(|r| r.stops.len()).sum();
    assert_eq!(total_stops, 12);

    // Routes should not mix the two lumps.
    for route in &result.generated_routes {
        let names: Vec<&str> = route
            .stops
            .iter()
            .map(|s| {
                roster
                    .iter()
                    .find(|c| c.id == s.child_id)
                    .map(|c| c.name.as_str())
                    .unwrap()
            })
            .collect();
        let north = names.iter().filter(|n| n.starts_with('N')).count();
        assert!(north == 0 || north == names.len(), "mixed route: {names:?}");
    }
}
