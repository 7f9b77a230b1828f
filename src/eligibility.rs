//! Eligibility matching: which (driver, vehicle) pairs may carry a child.
//!
//! A pair is eligible iff the driver holds every capability and the vehicle
//! every piece of equipment the child's care category requires. Candidates
//! are the full Cartesian product of the pools; nothing is pre-paired.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::model::{CareCategory, Capability, Child, Driver, Equipment, Vehicle};

/// A (driver, vehicle) pair competent to carry some child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOption {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
}

/// Child id → eligible options. Empty vectors mean the child is unroutable
/// against the current pools. BTreeMap keeps downstream processing
/// deterministic.
pub type EligibilityMap = BTreeMap<Uuid, Vec<TransportOption>>;

/// Capabilities a driver must hold for this category.
pub fn required_capabilities(category: CareCategory) -> &'static [Capability] {
    match category {
        CareCategory::Infant => &[Capability::InfantCertified],
        CareCategory::Toddler => &[Capability::ToddlerTrained],
        CareCategory::Preschool | CareCategory::OutOfSchoolCare => &[],
    }
}

/// Equipment a vehicle must carry for this category.
pub fn required_equipment(category: CareCategory) -> &'static [Equipment] {
    match category {
        CareCategory::Infant => &[Equipment::InfantSeat],
        CareCategory::Toddler => &[Equipment::ToddlerSeat],
        CareCategory::Preschool | CareCategory::OutOfSchoolCare => &[],
    }
}

/// Enumerate eligible (driver, vehicle) pairs for every child.
pub fn build_eligibility(
    children: &[Child],
    drivers: &[Driver],
    vehicles: &[Vehicle],
) -> EligibilityMap {
    let mut map = EligibilityMap::new();

    for child in children {
        let caps = required_capabilities(child.category);
        let equipment = required_equipment(child.category);

        let mut options = Vec::new();
        for driver in drivers {
            if !caps.iter().all(|c| driver.capabilities.contains(c)) {
                continue;
            }
            for vehicle in vehicles {
                if equipment.iter().all(|e| vehicle.equipment.contains(e)) {
                    options.push(TransportOption {
                        driver_id: driver.id,
                        vehicle_id: vehicle.id,
                    });
                }
            }
        }

        if options.is_empty() {
            log::warn!(
                "no eligible transport for child {} ({})",
                child.id,
                child.category.as_str()
            );
        }

        map.insert(child.id, options);
    }

    map
}
