//! Domain entities for child-transport planning.
//!
//! Identifiers are opaque UUIDs and dates are plain calendar dates; nothing
//! below the HTTP boundary interprets either beyond equality. Capability and
//! equipment sets are value sets (`BTreeSet`) so that iteration order, and
//! therefore everything derived from it, is deterministic.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A WGS-84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Care category of a child; drives capability and equipment requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareCategory {
    Infant,
    Toddler,
    Preschool,
    OutOfSchoolCare,
}

impl CareCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareCategory::Infant => "infant",
            CareCategory::Toddler => "toddler",
            CareCategory::Preschool => "preschool",
            CareCategory::OutOfSchoolCare => "out_of_school_care",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "infant" => Some(CareCategory::Infant),
            "toddler" => Some(CareCategory::Toddler),
            "preschool" => Some(CareCategory::Preschool),
            "out_of_school_care" => Some(CareCategory::OutOfSchoolCare),
            _ => None,
        }
    }

    /// Human-readable name, used in workload labels and route names.
    pub fn label(&self) -> &'static str {
        match self {
            CareCategory::Infant => "Infant",
            CareCategory::Toddler => "Toddler",
            CareCategory::Preschool => "Preschool",
            CareCategory::OutOfSchoolCare => "Out of School Care",
        }
    }
}

/// Driver certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    InfantCertified,
    ToddlerTrained,
    SpecialNeeds,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::InfantCertified => "infant_certified",
            Capability::ToddlerTrained => "toddler_trained",
            Capability::SpecialNeeds => "special_needs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "infant_certified" => Some(Capability::InfantCertified),
            "toddler_trained" => Some(Capability::ToddlerTrained),
            "special_needs" => Some(Capability::SpecialNeeds),
            _ => None,
        }
    }
}

/// Vehicle seating/accessibility equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    InfantSeat,
    ToddlerSeat,
    BoosterSeat,
    WheelchairLift,
}

impl Equipment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Equipment::InfantSeat => "infant_seat",
            Equipment::ToddlerSeat => "toddler_seat",
            Equipment::BoosterSeat => "booster_seat",
            Equipment::WheelchairLift => "wheelchair_lift",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "infant_seat" => Some(Equipment::InfantSeat),
            "toddler_seat" => Some(Equipment::ToddlerSeat),
            "booster_seat" => Some(Equipment::BoosterSeat),
            "wheelchair_lift" => Some(Equipment::WheelchairLift),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Pickup,
    Dropoff,
}

impl StopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopKind::Pickup => "pickup",
            StopKind::Dropoff => "dropoff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(StopKind::Pickup),
            "dropoff" => Some(StopKind::Dropoff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    Pending,
    Completed,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Pending => "pending",
            StopStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StopStatus::Pending),
            "completed" => Some(StopStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Planning,
    Assigned,
    InProgress,
    Completed,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Planning => "planning",
            RouteStatus::Assigned => "assigned",
            RouteStatus::InProgress => "in_progress",
            RouteStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(RouteStatus::Planning),
            "assigned" => Some(RouteStatus::Assigned),
            "in_progress" => Some(RouteStatus::InProgress),
            "completed" => Some(RouteStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child on the facility roster. Coordinates are optional; the planner
/// tolerates their absence (the child trails its route's sequence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    pub id: Uuid,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub category: CareCategory,
}

impl Child {
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub capabilities: BTreeSet<Capability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub equipment: BTreeSet<Equipment>,
}

/// A single pickup (or, in principle, dropoff) on a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: Uuid,
    /// Position within the route, 1-based. For any route the sequences form
    /// a contiguous 1..N enumeration.
    pub sequence: u32,
    pub kind: StopKind,
    pub status: StopStatus,
    pub child_id: Uuid,
    pub route_id: Uuid,
}

/// A planned or manually created route for one calendar date. Owns its
/// stops; deleting the route deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub status: RouteStatus,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    /// Ordered by `sequence`.
    pub stops: Vec<Stop>,
}

impl Route {
    /// A fresh empty route in the default `Planning` state.
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            status: RouteStatus::Planning,
            driver_id: None,
            vehicle_id: None,
            stops: Vec::new(),
        }
    }
}

/// Encode a capability set as a comma-separated string (storage parity
/// with pre-existing data).
pub fn capabilities_to_csv(set: &BTreeSet<Capability>) -> String {
    set.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(",")
}

/// Decode a comma-separated capability string. Unknown entries are an error.
pub fn capabilities_from_csv(s: &str) -> Result<BTreeSet<Capability>, String> {
    csv_set(s, Capability::from_str, "capability")
}

pub fn equipment_to_csv(set: &BTreeSet<Equipment>) -> String {
    set.iter().map(|e| e.as_str()).collect::<Vec<_>>().join(",")
}

pub fn equipment_from_csv(s: &str) -> Result<BTreeSet<Equipment>, String> {
    csv_set(s, Equipment::from_str, "equipment")
}

fn csv_set<T: Ord>(
    s: &str,
    parse: impl Fn(&str) -> Option<T>,
    kind: &str,
) -> Result<BTreeSet<T>, String> {
    let mut set = BTreeSet::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match parse(part) {
            Some(v) => {
                set.insert(v);
            }
            None => return Err(format!("unknown {kind} value: {part}")),
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_values_round_trip() {
        for cat in [
            CareCategory::Infant,
            CareCategory::Toddler,
            CareCategory::Preschool,
            CareCategory::OutOfSchoolCare,
        ] {
            assert_eq!(CareCategory::from_str(cat.as_str()), Some(cat));
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }

    #[test]
    fn out_of_school_care_wire_value() {
        assert_eq!(CareCategory::OutOfSchoolCare.as_str(), "out_of_school_care");
    }

    #[test]
    fn capability_csv_round_trip() {
        let set: BTreeSet<_> = [Capability::ToddlerTrained, Capability::InfantCertified]
            .into_iter()
            .collect();
        let csv = capabilities_to_csv(&set);
        assert_eq!(csv, "infant_certified,toddler_trained");
        assert_eq!(capabilities_from_csv(&csv).unwrap(), set);
    }

    #[test]
    fn empty_csv_is_empty_set() {
        assert!(capabilities_from_csv("").unwrap().is_empty());
        assert!(equipment_from_csv("").unwrap().is_empty());
    }

    #[test]
    fn unknown_csv_entry_rejected() {
        assert!(equipment_from_csv("infant_seat,jetpack").is_err());
    }

    #[test]
    fn child_coords_requires_both_components() {
        let mut child = Child {
            id: Uuid::new_v4(),
            name: "Alex".into(),
            street: "1 Pine St".into(),
            city: "Seattle".into(),
            state: Some("WA".into()),
            lat: Some(47.61),
            lon: None,
            category: CareCategory::Preschool,
        };
        assert_eq!(child.coords(), None);
        child.lon = Some(-122.33);
        assert_eq!(child.coords(), Some((47.61, -122.33)));
    }

    #[test]
    fn new_route_defaults_to_planning() {
        let route = Route::new("Route 1 - Preschool", NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(route.status, RouteStatus::Planning);
        assert!(route.driver_id.is_none());
        assert!(route.vehicle_id.is_none());
        assert!(route.stops.is_empty());
    }
}
