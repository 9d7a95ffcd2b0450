//! Assignment policy: explicit overrides, forced assignments, and
//! exemptions layered over inferred requirements.
//!
//! The inference engine consults [`AssignmentPolicy::override_for`] before
//! any heuristic. After inference, the index builder runs
//! [`AssignmentPolicy::hard_assign`] and then
//! [`AssignmentPolicy::override_assign`], and both may overwrite inferred
//! entries. The gate consults [`AssignmentPolicy::is_exempt`] per query.
//!
//! [`PolicyTable`] is the data-driven implementation used by the harness
//! and tests. Hosts with bespoke rules implement the trait themselves.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentIndex;
use crate::definitions::{ItemId, RequirementId};

/// Collaborator that shapes item → requirement assignments.
///
/// Every method defaults to "no opinion", so `()` is the empty policy.
pub trait AssignmentPolicy {
    /// `None`: no override. `Some(None)`: explicitly ungated.
    /// `Some(Some(req))`: use `req`.
    fn override_for(&self, _item: ItemId) -> Option<Option<RequirementId>> {
        None
    }

    /// Forced assignments applied after inference.
    fn hard_assign(&self, _index: &mut AssignmentIndex) {}

    /// User-facing override assignments, applied after `hard_assign`.
    fn override_assign(&self, _index: &mut AssignmentIndex) {}

    /// Exempt requirements never lock anything.
    fn is_exempt(&self, _requirement: RequirementId) -> bool {
        false
    }
}

impl AssignmentPolicy for () {}

/// Table-driven policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyTable {
    /// Forced item → requirement pairs, applied in order.
    #[serde(default)]
    pub hard: Vec<(ItemId, RequirementId)>,
    /// Per-item overrides; `None` removes gating from the item.
    #[serde(default)]
    pub overrides: BTreeMap<ItemId, Option<RequirementId>>,
    /// Requirements that never lock.
    #[serde(default)]
    pub exempt: BTreeSet<RequirementId>,
}

impl PolicyTable {
    pub fn with_hard(mut self, item: ItemId, requirement: RequirementId) -> Self {
        self.hard.push((item, requirement));
        self
    }

    pub fn with_override(mut self, item: ItemId, requirement: Option<RequirementId>) -> Self {
        self.overrides.insert(item, requirement);
        self
    }

    pub fn with_exempt(mut self, requirement: RequirementId) -> Self {
        self.exempt.insert(requirement);
        self
    }
}

impl AssignmentPolicy for PolicyTable {
    fn override_for(&self, item: ItemId) -> Option<Option<RequirementId>> {
        self.overrides.get(&item).copied()
    }

    fn hard_assign(&self, index: &mut AssignmentIndex) {
        for &(item, requirement) in &self.hard {
            index.assign(item, requirement);
        }
    }

    fn override_assign(&self, index: &mut AssignmentIndex) {
        for (&item, &choice) in &self.overrides {
            match choice {
                Some(requirement) => index.assign(item, requirement),
                None => {
                    index.unassign(item);
                }
            }
        }
    }

    fn is_exempt(&self, requirement: RequirementId) -> bool {
        self.exempt.contains(&requirement)
    }
}
