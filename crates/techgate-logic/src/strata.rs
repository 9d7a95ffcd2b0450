//! Tier classifier: buckets every known requirement by its tier.
//!
//! The progress evaluator scans these buckets from the top tier down.
//! Buckets only grow within a session; a changed definition universe calls
//! for a fresh [`TierTable::classify`].

use std::collections::{BTreeMap, BTreeSet};

use crate::definitions::{DefinitionSet, RequirementId};
use crate::tier::Tier;

/// Tier → requirements observed at that tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierTable {
    strata: BTreeMap<Tier, BTreeSet<RequirementId>>,
}

impl TierTable {
    /// Classify every requirement in the snapshot.
    pub fn classify(defs: &DefinitionSet) -> Self {
        let mut table = Self::default();
        for requirement in defs.requirements() {
            table.insert(requirement.tier, requirement.id);
        }
        log::debug!(
            "tier table: {}",
            table
                .strata
                .iter()
                .map(|(tier, set)| format!("{tier}={}", set.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        table
    }

    /// Record `requirement` at `tier`. Re-inserting is a no-op.
    pub fn insert(&mut self, tier: Tier, requirement: RequirementId) {
        self.strata.entry(tier).or_default().insert(requirement);
    }

    /// Requirements at `tier` (empty if none were seen).
    pub fn requirements_at(&self, tier: Tier) -> impl Iterator<Item = RequirementId> + '_ {
        self.strata.get(&tier).into_iter().flatten().copied()
    }

    pub fn count_at(&self, tier: Tier) -> usize {
        self.strata.get(&tier).map_or(0, |s| s.len())
    }

    /// Tiers that hold at least one requirement, lowest first.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.strata.keys().copied()
    }

    /// Total number of classified requirements.
    pub fn len(&self) -> usize {
        self.strata.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.strata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::RequirementDef;

    fn defs(tiers: &[(u32, Tier)]) -> DefinitionSet {
        let requirements = tiers
            .iter()
            .map(|&(id, tier)| RequirementDef {
                id: RequirementId(id),
                name: format!("req_{id}"),
                tier,
                finished: false,
            })
            .collect();
        DefinitionSet::new(vec![], requirements, vec![], vec![]).unwrap()
    }

    #[test]
    fn groups_by_tier() {
        let table = TierTable::classify(&defs(&[
            (1, Tier::Medieval),
            (2, Tier::Medieval),
            (3, Tier::Spacer),
        ]));
        assert_eq!(table.count_at(Tier::Medieval), 2);
        assert_eq!(table.count_at(Tier::Spacer), 1);
        assert_eq!(table.count_at(Tier::Ultra), 0);
        assert_eq!(table.len(), 3);
        let tiers: Vec<Tier> = table.tiers().collect();
        assert_eq!(tiers, vec![Tier::Medieval, Tier::Spacer]);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut table = TierTable::default();
        table.insert(Tier::Ultra, RequirementId(9));
        table.insert(Tier::Ultra, RequirementId(9));
        assert_eq!(table.count_at(Tier::Ultra), 1);
        let reqs: Vec<_> = table.requirements_at(Tier::Ultra).collect();
        assert_eq!(reqs, vec![RequirementId(9)]);
    }

    #[test]
    fn empty_snapshot_gives_empty_table() {
        let table = TierTable::classify(&defs(&[]));
        assert!(table.is_empty());
        assert_eq!(table.requirements_at(Tier::Animal).count(), 0);
    }
}
