//! Manual editing: sequence densification, reorder validation, and
//! same-date assignment conflicts.

mod fixtures;

use chrono::NaiveDate;
use fixtures::*;
use shuttle_planner::editor::Editor;
use shuttle_planner::error::Error;
use shuttle_planner::model::{CareCategory, RouteStatus};
use shuttle_planner::store::{MemoryStore, Store};
use uuid::Uuid;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
}

async fn store_with_children(names: &[&str]) -> (MemoryStore, Vec<Uuid>) {
    let children: Vec<_> = names
        .iter()
        .map(|n| child(n, CareCategory::Preschool))
        .collect();
    let store = seeded_store(&children, &[], &[]).await;
    let ids = children.iter().map(|c| c.id).collect();
    (store, ids)
}

// ============================================================================
// Create / delete
// ============================================================================

#[tokio::test]
async fn created_route_is_empty_and_planning() {
    let store = MemoryStore::new();
    let editor = Editor::new(store.clone());

    let route = editor.create_manual_route("Morning Run", date(1)).await.unwrap();

    assert_eq!(route.status, RouteStatus::Planning);
    assert!(route.stops.is_empty());
    assert!(route.driver_id.is_none());
    assert!(route.vehicle_id.is_none());

    let persisted = store.route(route.id).await.unwrap().unwrap();
    assert_eq!(persisted.name, "Morning Run");
}

#[tokio::test]
async fn delete_route_cascades_and_reports_absence() {
    let (store, ids) = store_with_children(&["C1"]).await;
    let editor = Editor::new(store.clone());

    let route = editor.create_manual_route("Morning Run", date(1)).await.unwrap();
    editor.add_stop_to_route(route.id, ids[0]).await.unwrap();

    assert!(editor.delete_route(route.id).await.unwrap());
    assert!(store.route(route.id).await.unwrap().is_none());

    // Second delete finds nothing.
    assert!(!editor.delete_route(route.id).await.unwrap());
}

// ============================================================================
// Stops: add / remove / reorder
// ============================================================================

#[tokio::test]
async fn stops_append_with_contiguous_sequences() {
    let (store, ids) = store_with_children(&["C1", "C2", "C3"]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("Morning Run", date(2)).await.unwrap();
    let mut latest = route.clone();
    for id in &ids {
        latest = editor.add_stop_to_route(route.id, *id).await.unwrap();
    }

    let order: Vec<(u32, Uuid)> = latest.stops.iter().map(|s| (s.sequence, s.child_id)).collect();
    assert_eq!(order, vec![(1, ids[0]), (2, ids[1]), (3, ids[2])]);

    // The same child cannot ride the route twice.
    let err = editor.add_stop_to_route(route.id, ids[0]).await.unwrap_err();
    assert!(matches!(err, Error::BadInput(_)));
}

#[tokio::test]
async fn removing_a_middle_stop_densifies_sequences() {
    let (store, ids) = store_with_children(&["C1", "C2", "C3"]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("Morning Run", date(3)).await.unwrap();
    let mut latest = route.clone();
    for id in &ids {
        latest = editor.add_stop_to_route(route.id, *id).await.unwrap();
    }
    let sequences: Vec<u32> = latest.stops.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);

    let middle = latest.stops.iter().find(|s| s.child_id == ids[1]).unwrap();
    let after = editor.remove_stop_from_route(middle.id).await.unwrap();

    let survivors: Vec<(u32, Uuid)> = after.stops.iter().map(|s| (s.sequence, s.child_id)).collect();
    assert_eq!(survivors, vec![(1, ids[0]), (2, ids[2])]);
}

#[tokio::test]
async fn adding_then_removing_everything_leaves_no_gaps() {
    let (store, ids) = store_with_children(&["C1", "C2", "C3", "C4"]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("Morning Run", date(4)).await.unwrap();
    let mut latest = route.clone();
    for id in &ids {
        latest = editor.add_stop_to_route(route.id, *id).await.unwrap();
    }

    while let Some(stop) = latest.stops.first().cloned() {
        latest = editor.remove_stop_from_route(stop.id).await.unwrap();
        let sequences: Vec<u32> = latest.stops.iter().map(|s| s.sequence).collect();
        let expected: Vec<u32> = (1..=latest.stops.len() as u32).collect();
        assert_eq!(sequences, expected, "gap after removal");
    }
    assert!(latest.stops.is_empty());
}

#[tokio::test]
async fn reorder_rewrites_sequences_in_given_order() {
    let (store, ids) = store_with_children(&["C1", "C2", "C3"]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("Morning Run", date(5)).await.unwrap();
    let mut latest = route.clone();
    for id in &ids {
        latest = editor.add_stop_to_route(route.id, *id).await.unwrap();
    }

    let stop_of = |latest: &shuttle_planner::model::Route, child: Uuid| {
        latest.stops.iter().find(|s| s.child_id == child).unwrap().id
    };
    let reordered = editor
        .reorder_stops(
            route.id,
            &[
                stop_of(&latest, ids[2]),
                stop_of(&latest, ids[0]),
                stop_of(&latest, ids[1]),
            ],
        )
        .await
        .unwrap();

    let order: Vec<(u32, Uuid)> = reordered.stops.iter().map(|s| (s.sequence, s.child_id)).collect();
    assert_eq!(order, vec![(1, ids[2]), (2, ids[0]), (3, ids[1])]);
}

#[tokio::test]
async fn reorder_with_current_order_is_a_no_op() {
    let (store, ids) = store_with_children(&["C1", "C2"]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("Morning Run", date(6)).await.unwrap();
    let mut latest = route.clone();
    for id in &ids {
        latest = editor.add_stop_to_route(route.id, *id).await.unwrap();
    }

    let current: Vec<Uuid> = latest.stops.iter().map(|s| s.id).collect();
    let after = editor.reorder_stops(route.id, &current).await.unwrap();

    let before: Vec<(u32, Uuid)> = latest.stops.iter().map(|s| (s.sequence, s.id)).collect();
    let now: Vec<(u32, Uuid)> = after.stops.iter().map(|s| (s.sequence, s.id)).collect();
    assert_eq!(before, now);
}

#[tokio::test]
async fn reorder_rejects_subsets_supersets_and_strangers() {
    let (store, ids) = store_with_children(&["C1", "C2"]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("Morning Run", date(7)).await.unwrap();
    let mut latest = route.clone();
    for id in &ids {
        latest = editor.add_stop_to_route(route.id, *id).await.unwrap();
    }
    let stop_ids: Vec<Uuid> = latest.stops.iter().map(|s| s.id).collect();

    // Subset.
    let err = editor.reorder_stops(route.id, &stop_ids[..1]).await.unwrap_err();
    assert!(matches!(err, Error::BadInput(_)));

    // Foreign stop id in place of a real one.
    let mut with_stranger = stop_ids.clone();
    with_stranger[1] = Uuid::new_v4();
    let err = editor.reorder_stops(route.id, &with_stranger).await.unwrap_err();
    assert!(matches!(err, Error::BadInput(_)));

    // Empty list.
    let err = editor.reorder_stops(route.id, &[]).await.unwrap_err();
    assert!(matches!(err, Error::BadInput(_)));

    // Sequences untouched by the failed attempts.
    let sequences: Vec<u32> = editor
        .reorder_stops(route.id, &stop_ids)
        .await
        .unwrap()
        .stops
        .iter()
        .map(|s| s.sequence)
        .collect();
    assert_eq!(sequences, vec![1, 2]);
}

#[tokio::test]
async fn stop_mutations_demand_existing_referents() {
    let (store, ids) = store_with_children(&["C1"]).await;
    let editor = Editor::new(store);

    let err = editor.add_stop_to_route(Uuid::new_v4(), ids[0]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("route")));

    let route = editor.create_manual_route("Morning Run", date(8)).await.unwrap();
    let err = editor.add_stop_to_route(route.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("child")));

    let err = editor.remove_stop_from_route(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("stop")));

    let err = editor.reorder_stops(Uuid::new_v4(), &[Uuid::new_v4()]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound("route")));
}

// ============================================================================
// Driver / vehicle assignment
// ============================================================================

#[tokio::test]
async fn assignment_conflicts_are_detected_per_date() {
    let dana = driver("Dana", &[]);
    let eli = driver("Eli", &[]);
    let van = vehicle("Van", &[]);
    let bus = vehicle("Bus", &[]);
    let store = seeded_store(&[], &[dana.clone(), eli.clone()], &[van.clone(), bus.clone()]).await;
    let editor = Editor::new(store);

    let r1 = editor.create_manual_route("R1", date(9)).await.unwrap();
    let r2 = editor.create_manual_route("R2", date(9)).await.unwrap();

    let assigned = editor
        .assign_driver_and_vehicle(r1.id, dana.id, van.id)
        .await
        .unwrap();
    assert_eq!(assigned.status, RouteStatus::Assigned);
    assert_eq!(assigned.driver_id, Some(dana.id));
    assert_eq!(assigned.vehicle_id, Some(van.id));

    let err = editor
        .assign_driver_and_vehicle(r2.id, dana.id, bus.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DriverAlreadyAssigned));

    let err = editor
        .assign_driver_and_vehicle(r2.id, eli.id, van.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::VehicleAlreadyAssigned));

    // A free pair still works.
    let assigned = editor
        .assign_driver_and_vehicle(r2.id, eli.id, bus.id)
        .await
        .unwrap();
    assert_eq!(assigned.status, RouteStatus::Assigned);
}

#[tokio::test]
async fn same_pair_may_serve_another_date() {
    let dana = driver("Dana", &[]);
    let van = vehicle("Van", &[]);
    let store = seeded_store(&[], &[dana.clone()], &[van.clone()]).await;
    let editor = Editor::new(store);

    let monday = editor.create_manual_route("Mon", date(10)).await.unwrap();
    let tuesday = editor.create_manual_route("Tue", date(11)).await.unwrap();

    editor.assign_driver_and_vehicle(monday.id, dana.id, van.id).await.unwrap();
    editor.assign_driver_and_vehicle(tuesday.id, dana.id, van.id).await.unwrap();
}

#[tokio::test]
async fn reassigning_the_same_route_is_not_a_conflict() {
    let dana = driver("Dana", &[]);
    let eli = driver("Eli", &[]);
    let van = vehicle("Van", &[]);
    let store = seeded_store(&[], &[dana.clone(), eli.clone()], &[van.clone()]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("R", date(12)).await.unwrap();
    editor.assign_driver_and_vehicle(route.id, dana.id, van.id).await.unwrap();

    let reassigned = editor
        .assign_driver_and_vehicle(route.id, eli.id, van.id)
        .await
        .unwrap();
    assert_eq!(reassigned.driver_id, Some(eli.id));
    assert_eq!(reassigned.status, RouteStatus::Assigned);
}

#[tokio::test]
async fn assignment_demands_existing_referents() {
    let dana = driver("Dana", &[]);
    let van = vehicle("Van", &[]);
    let store = seeded_store(&[], &[dana.clone()], &[van.clone()]).await;
    let editor = Editor::new(store);

    let route = editor.create_manual_route("R", date(13)).await.unwrap();

    let err = editor
        .assign_driver_and_vehicle(Uuid::new_v4(), dana.id, van.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("route")));

    let err = editor
        .assign_driver_and_vehicle(route.id, Uuid::new_v4(), van.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("driver")));

    let err = editor
        .assign_driver_and_vehicle(route.id, dana.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound("vehicle")));
}
