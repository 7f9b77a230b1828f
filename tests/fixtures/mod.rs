//! Shared builders for planner and editor tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use shuttle_planner::haversine::HaversineMatrix;
use shuttle_planner::model::{Capability, CareCategory, Child, Driver, Equipment, Vehicle};
use shuttle_planner::planner::Planner;
use shuttle_planner::store::MemoryStore;
use uuid::Uuid;

/// Facility location used throughout the scenarios.
pub const DEPOT: (f64, f64) = (47.6062, -122.3321);

pub fn child(name: &str, category: CareCategory) -> Child {
    Child {
        id: Uuid::new_v4(),
        name: name.to_string(),
        street: "1 Pine St".to_string(),
        city: "Seattle".to_string(),
        state: Some("WA".to_string()),
        lat: None,
        lon: None,
        category,
    }
}

pub fn child_at(name: &str, category: CareCategory, lat: f64, lon: f64) -> Child {
    let mut c = child(name, category);
    c.lat = Some(lat);
    c.lon = Some(lon);
    c
}

pub fn driver(name: &str, capabilities: &[Capability]) -> Driver {
    Driver {
        id: Uuid::new_v4(),
        name: name.to_string(),
        capabilities: capabilities.iter().copied().collect::<BTreeSet<_>>(),
    }
}

pub fn vehicle(name: &str, equipment: &[Equipment]) -> Vehicle {
    Vehicle {
        id: Uuid::new_v4(),
        name: name.to_string(),
        capacity: 10,
        equipment: equipment.iter().copied().collect::<BTreeSet<_>>(),
    }
}

pub async fn seeded_store(
    children: &[Child],
    drivers: &[Driver],
    vehicles: &[Vehicle],
) -> MemoryStore {
    let store = MemoryStore::new();
    for c in children {
        store.insert_child(c.clone()).await;
    }
    for d in drivers {
        store.insert_driver(d.clone()).await;
    }
    for v in vehicles {
        store.insert_vehicle(v.clone()).await;
    }
    store
}

/// A planner over the seeded store with the great-circle provider.
pub fn planner(store: &MemoryStore) -> Planner<MemoryStore> {
    Planner::new(store.clone(), Arc::new(HaversineMatrix::default()), DEPOT)
}
