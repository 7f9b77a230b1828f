//! Compatibility partitioning: group children by shared transport options.
//!
//! The grouping key is the sorted set of eligible driver ids, so every child
//! in a workload can be serviced by at least one common driver/vehicle pair.
//! Grouping by category alone would not guarantee that.

use std::collections::BTreeMap;

use crate::eligibility::EligibilityMap;
use crate::model::Child;

/// A maximal set of children sharing an identical eligible-driver set.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Sorted, deduplicated, comma-joined eligible driver ids.
    pub key: String,
    pub children: Vec<Child>,
    /// Informational; appears in generated route names.
    pub label: String,
}

/// Label shown when a workload spans more than one care category.
const MIXED_LABEL: &str = "Mixed Categories";

/// Partition routable children into workloads. Children with an empty
/// eligible set are skipped (already flagged unroutable upstream).
/// Workloads come back sorted by key, so processing order is deterministic.
pub fn partition_workloads(children: &[Child], eligibility: &EligibilityMap) -> Vec<Workload> {
    let mut groups: BTreeMap<String, Vec<Child>> = BTreeMap::new();

    for child in children {
        let Some(options) = eligibility.get(&child.id) else {
            continue;
        };
        if options.is_empty() {
            continue;
        }

        let mut driver_ids: Vec<String> =
            options.iter().map(|o| o.driver_id.to_string()).collect();
        driver_ids.sort();
        driver_ids.dedup();

        groups
            .entry(driver_ids.join(","))
            .or_default()
            .push(child.clone());
    }

    groups
        .into_iter()
        .map(|(key, children)| {
            let label = workload_label(&children);
            Workload {
                key,
                children,
                label,
            }
        })
        .collect()
}

fn workload_label(children: &[Child]) -> String {
    let mut categories = children.iter().map(|c| c.category);
    let Some(first) = categories.next() else {
        return MIXED_LABEL.to_string();
    };
    if categories.all(|c| c == first) {
        first.label().to_string()
    } else {
        MIXED_LABEL.to_string()
    }
}
