//! Requirement inference: pick the single prerequisite that gates a
//! production rule's output.
//!
//! Checks run in a fixed order and the first hit wins:
//!
//! 1. Policy override for the output item (may explicitly say "ungated").
//! 2. Items excluded from gating (buildings, non-weapon non-apparel).
//! 3. The rule's single canonical requirement.
//! 4. The first entry of the rule's requirement list.
//! 5. Worker-facility fallback: the slowest facility's canonical
//!    requirement, ties broken by cheaper tier, then declaration order.
//!    Any facility with no requirements aborts the fallback entirely.
//!
//! ```
//! use techgate_logic::definitions::*;
//! use techgate_logic::inference::infer_requirement;
//! use techgate_logic::tier::Tier;
//!
//! let defs = DefinitionSet::new(
//!     vec![ItemDef { id: ItemId(1), name: "bow".into(), category: ItemCategory::Item,
//!                    is_weapon: true, is_apparel: false }],
//!     vec![RequirementDef { id: RequirementId(5), name: "archery".into(),
//!                           tier: Tier::Neolithic, finished: false }],
//!     vec![],
//!     vec![ProductionRule { id: RuleId(1), name: "make_bow".into(), output: Some(ItemId(1)),
//!                           requirements: vec![RequirementId(5)], ..Default::default() }],
//! ).unwrap();
//! assert_eq!(infer_requirement(&defs.rules()[0], &defs, &()), Some(RequirementId(5)));
//! ```

use std::cmp::Ordering;

use crate::definitions::{DefinitionSet, ProductionRule, RequirementId};
use crate::policy::AssignmentPolicy;
use crate::tier::Tier;

/// Best-fit gating requirement for `rule`, or `None` if it stays ungated.
pub fn infer_requirement(
    rule: &ProductionRule,
    defs: &DefinitionSet,
    policy: &dyn AssignmentPolicy,
) -> Option<RequirementId> {
    let item = defs.item(rule.output?)?;

    if let Some(choice) = policy.override_for(item.id) {
        return choice;
    }
    if item.excluded_from_gating() {
        return None;
    }
    if let Some(requirement) = rule.requirement {
        return Some(requirement);
    }
    if let Some(&first) = rule.requirements.first() {
        return Some(first);
    }
    facility_fallback(rule, defs)
}

/// Candidate facility during the fallback scan.
struct Candidate {
    work_speed: f32,
    tier: Tier,
    requirement: RequirementId,
}

impl Candidate {
    /// Strictly better: slower bench, or equally slow with a cheaper tier.
    fn beats(&self, other: &Candidate) -> bool {
        match self.work_speed.total_cmp(&other.work_speed) {
            Ordering::Less => true,
            Ordering::Equal => self.tier < other.tier,
            Ordering::Greater => false,
        }
    }
}

fn facility_fallback(rule: &ProductionRule, defs: &DefinitionSet) -> Option<RequirementId> {
    let mut best: Option<Candidate> = None;

    for &facility_id in &rule.workers {
        let Some(facility) = defs.facility(facility_id) else {
            log::warn!(
                "rule {:?} ({}) lists unknown facility {:?}",
                rule.id,
                rule.name,
                facility_id
            );
            return None;
        };
        let Some(requirement) = facility.canonical_requirement() else {
            log::debug!(
                "rule {:?} ({}): facility {} has no requirements, fallback aborted",
                rule.id,
                rule.name,
                facility.name
            );
            return None;
        };
        let tier = defs.requirement(requirement)?.tier;

        let candidate = Candidate {
            work_speed: facility.work_speed,
            tier,
            requirement,
        };
        if best.as_ref().map_or(true, |b| candidate.beats(b)) {
            best = Some(candidate);
        }
    }

    best.map(|c| c.requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{
        FacilityId, ItemCategory, ItemDef, ItemId, RequirementDef, RuleId, WorkerFacility,
    };
    use crate::policy::PolicyTable;

    const SWORD: ItemId = ItemId(1);
    const WALL: ItemId = ItemId(2);
    const MEAL: ItemId = ItemId(3);
    const PARKA: ItemId = ItemId(4);

    fn items() -> Vec<ItemDef> {
        vec![
            ItemDef {
                id: SWORD,
                name: "sword".into(),
                category: ItemCategory::Item,
                is_weapon: true,
                is_apparel: false,
            },
            ItemDef {
                id: WALL,
                name: "wall".into(),
                category: ItemCategory::Building,
                is_weapon: true,
                is_apparel: false,
            },
            ItemDef {
                id: MEAL,
                name: "meal".into(),
                category: ItemCategory::Item,
                is_weapon: false,
                is_apparel: false,
            },
            ItemDef {
                id: PARKA,
                name: "parka".into(),
                category: ItemCategory::Item,
                is_weapon: false,
                is_apparel: true,
            },
        ]
    }

    fn requirements() -> Vec<RequirementDef> {
        [
            (10, Tier::Neolithic),
            (11, Tier::Medieval),
            (12, Tier::Industrial),
            (13, Tier::Spacer),
            (14, Tier::Medieval),
        ]
        .into_iter()
        .map(|(id, tier)| RequirementDef {
            id: RequirementId(id),
            name: format!("req_{id}"),
            tier,
            finished: false,
        })
        .collect()
    }

    fn bench(id: u32, work_speed: f32, requirements: &[u32]) -> WorkerFacility {
        WorkerFacility {
            id: FacilityId(id),
            name: format!("bench_{id}"),
            work_speed,
            requirements: requirements.iter().map(|&r| RequirementId(r)).collect(),
        }
    }

    fn benches() -> Vec<WorkerFacility> {
        vec![
            bench(50, 1.0, &[12]),
            bench(51, 0.5, &[13, 10]),
            bench(52, 0.5, &[11]),
            bench(53, 1.0, &[]),
            bench(55, 0.5, &[14]),
        ]
    }

    fn rule_on(output: ItemId, workers: &[u32]) -> ProductionRule {
        ProductionRule {
            id: RuleId(100),
            name: "rule".into(),
            output: Some(output),
            workers: workers.iter().map(|&f| FacilityId(f)).collect(),
            ..Default::default()
        }
    }

    fn defs_with(rule: ProductionRule) -> DefinitionSet {
        DefinitionSet::new(items(), requirements(), benches(), vec![rule]).unwrap()
    }

    fn infer(rule: ProductionRule, policy: &dyn AssignmentPolicy) -> Option<RequirementId> {
        let defs = defs_with(rule);
        infer_requirement(&defs.rules()[0], &defs, policy)
    }

    #[test]
    fn no_output_yields_none_even_with_override() {
        let mut rule = rule_on(SWORD, &[]);
        rule.output = None;
        rule.requirement = Some(RequirementId(10));
        let policy = PolicyTable::default().with_override(SWORD, Some(RequirementId(11)));
        assert_eq!(infer(rule, &policy), None);
    }

    #[test]
    fn override_beats_everything() {
        let mut rule = rule_on(SWORD, &[50]);
        rule.requirement = Some(RequirementId(10));
        let policy = PolicyTable::default().with_override(SWORD, Some(RequirementId(13)));
        assert_eq!(infer(rule, &policy), Some(RequirementId(13)));
    }

    #[test]
    fn override_to_none_is_respected() {
        let mut rule = rule_on(SWORD, &[]);
        rule.requirement = Some(RequirementId(10));
        let policy = PolicyTable::default().with_override(SWORD, None);
        assert_eq!(infer(rule, &policy), None);
    }

    #[test]
    fn override_applies_before_exclusion() {
        let policy = PolicyTable::default().with_override(MEAL, Some(RequirementId(11)));
        assert_eq!(infer(rule_on(MEAL, &[]), &policy), Some(RequirementId(11)));
    }

    #[test]
    fn excluded_items_are_ungated() {
        let mut building = rule_on(WALL, &[]);
        building.requirement = Some(RequirementId(10));
        assert_eq!(infer(building, &()), None);

        let mut food = rule_on(MEAL, &[]);
        food.requirements = vec![RequirementId(10)];
        assert_eq!(infer(food, &()), None);
    }

    #[test]
    fn canonical_requirement_before_list() {
        let mut rule = rule_on(PARKA, &[50]);
        rule.requirement = Some(RequirementId(11));
        rule.requirements = vec![RequirementId(12), RequirementId(10)];
        assert_eq!(infer(rule, &()), Some(RequirementId(11)));
    }

    #[test]
    fn first_of_list_before_facilities() {
        let mut rule = rule_on(PARKA, &[50]);
        rule.requirements = vec![RequirementId(12), RequirementId(10)];
        assert_eq!(infer(rule, &()), Some(RequirementId(12)));
    }

    #[test]
    fn slowest_facility_wins() {
        assert_eq!(infer(rule_on(SWORD, &[50, 52]), &()), Some(RequirementId(11)));
        assert_eq!(infer(rule_on(SWORD, &[52, 50]), &()), Some(RequirementId(11)));
    }

    #[test]
    fn speed_tie_prefers_cheaper_tier() {
        // 51 is Spacer-gated, 52 Medieval-gated, both at 0.5
        assert_eq!(infer(rule_on(SWORD, &[51, 52]), &()), Some(RequirementId(11)));
        assert_eq!(infer(rule_on(SWORD, &[52, 51]), &()), Some(RequirementId(11)));
    }

    #[test]
    fn full_tie_keeps_first_declared() {
        // 52 and 55 are both 0.5 speed and Medieval-gated
        assert_eq!(infer(rule_on(SWORD, &[55, 52]), &()), Some(RequirementId(14)));
        assert_eq!(infer(rule_on(SWORD, &[52, 55]), &()), Some(RequirementId(11)));
    }

    #[test]
    fn facility_without_requirements_aborts() {
        assert_eq!(infer(rule_on(SWORD, &[52, 53]), &()), None);
        assert_eq!(infer(rule_on(SWORD, &[53, 52]), &()), None);
    }

    #[test]
    fn no_facilities_means_none() {
        assert_eq!(infer(rule_on(SWORD, &[]), &()), None);
    }

    #[test]
    fn canonical_facility_requirement_is_first() {
        assert_eq!(infer(rule_on(PARKA, &[51]), &()), Some(RequirementId(13)));
    }
}
