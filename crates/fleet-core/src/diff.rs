//! Desired-vs-managed set diff

use std::collections::BTreeSet;

use crate::desired::DesiredState;

/// The three buckets a reconciliation cycle works through.
///
/// Computed once per cycle from the freshly built desired state and the
/// managed-entity set; names within each bucket are in stable sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffPlan {
    /// Desired but not currently managed: provision identity, then apply.
    pub to_create: Vec<String>,
    /// Present on both sides: subject to fingerprint change detection.
    pub to_evaluate: Vec<String>,
    /// Managed but no longer desired: torn down.
    pub to_remove: Vec<String>,
}

impl DiffPlan {
    /// Partition entity names into create/evaluate/remove buckets.
    pub fn compute(desired: &DesiredState, managed: &BTreeSet<String>) -> Self {
        let mut plan = Self::default();

        for name in desired.keys() {
            if managed.contains(name) {
                plan.to_evaluate.push(name.clone());
            } else {
                plan.to_create.push(name.clone());
            }
        }
        for name in managed {
            if !desired.contains_key(name) {
                plan.to_remove.push(name.clone());
            }
        }

        plan
    }

    /// True when the cycle has nothing to even look at.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_evaluate.is_empty() && self.to_remove.is_empty()
    }
}
