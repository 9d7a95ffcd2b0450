//! Bidirectional item ↔ requirement index.
//!
//! Built in one pass over every production rule, then adjusted by the
//! policy's forced and override passes. The index is always rebuilt from
//! scratch, never patched incrementally from outside.
//!
//! Invariants held by every mutation:
//! - each item maps to at most one requirement;
//! - an item appears in its requirement's inverse list exactly once, and in
//!   no other list;
//! - inverse lists are never empty.

use std::collections::{BTreeMap, BTreeSet};

use crate::definitions::{DefinitionSet, ItemId, RequirementId};
use crate::inference::infer_requirement;
use crate::policy::AssignmentPolicy;

/// Resolved gating assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentIndex {
    forward: BTreeMap<ItemId, RequirementId>,
    inverse: BTreeMap<RequirementId, Vec<ItemId>>,
    eligible: BTreeSet<ItemId>,
}

impl AssignmentIndex {
    /// Infer a requirement for every rule's output, then apply the policy's
    /// hard and override passes.
    pub fn rebuild(defs: &DefinitionSet, policy: &dyn AssignmentPolicy) -> Self {
        let mut index = Self::default();

        for rule in defs.rules() {
            let Some(item) = rule.output else {
                continue;
            };
            match infer_requirement(rule, defs, policy) {
                Some(requirement) => {
                    log::debug!(
                        "rule {:?} ({}) gates item {:?} behind {:?}",
                        rule.id,
                        rule.name,
                        item,
                        requirement
                    );
                    index.assign(item, requirement);
                }
                None => log::debug!("rule {:?} ({}) is ungated", rule.id, rule.name),
            }
        }
        let inferred = index.len();

        policy.hard_assign(&mut index);
        policy.override_assign(&mut index);

        log::info!(
            "assignment index built: {} inferred, {} after policy, {} requirements gate items",
            inferred,
            index.len(),
            index.inverse.len()
        );
        index
    }

    /// Gate `item` behind `requirement`, replacing any previous assignment.
    pub fn assign(&mut self, item: ItemId, requirement: RequirementId) {
        self.eligible.insert(item);
        if let Some(previous) = self.forward.insert(item, requirement) {
            if previous != requirement {
                self.detach(previous, item);
            }
        }
        let list = self.inverse.entry(requirement).or_default();
        if !list.contains(&item) {
            list.push(item);
        }
    }

    /// Remove any gating from `item`, returning the requirement it had.
    pub fn unassign(&mut self, item: ItemId) -> Option<RequirementId> {
        let previous = self.forward.remove(&item)?;
        self.detach(previous, item);
        self.eligible.remove(&item);
        Some(previous)
    }

    fn detach(&mut self, requirement: RequirementId, item: ItemId) {
        if let Some(list) = self.inverse.get_mut(&requirement) {
            list.retain(|&i| i != item);
            if list.is_empty() {
                self.inverse.remove(&requirement);
            }
        }
    }

    /// The requirement gating `item`, if any.
    pub fn requirement_for(&self, item: ItemId) -> Option<RequirementId> {
        self.forward.get(&item).copied()
    }

    /// Items gated by `requirement`, in assignment order.
    pub fn items_for(&self, requirement: RequirementId) -> &[ItemId] {
        self.inverse
            .get(&requirement)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `item` has been tagged as gating-eligible.
    pub fn is_gating_eligible(&self, item: ItemId) -> bool {
        self.eligible.contains(&item)
    }

    /// Number of gated items.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// All (item, requirement) pairs in item order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, RequirementId)> + '_ {
        self.forward.iter().map(|(&i, &r)| (i, r))
    }

    /// Requirements that gate at least one item.
    pub fn gating_requirements(&self) -> impl Iterator<Item = RequirementId> + '_ {
        self.inverse.keys().copied()
    }
}
