//! Integration tests for the full gating pipeline.
//!
//! Exercises: DefinitionSet → TierTable → AssignmentIndex → ProgressEvaluator
//! → TechGate decisions.
//!
//! All tests are pure logic: no game engine, no I/O.

use techgate_logic::assignment::AssignmentIndex;
use techgate_logic::definitions::{
    DefinitionSet, FacilityId, ItemCategory, ItemDef, ItemId, ProductionRule, RequirementDef,
    RequirementId, RuleId, WorkerFacility,
};
use techgate_logic::gate::{ActorKind, GateOutcome, TechGate, UnlockReason};
use techgate_logic::inference::infer_requirement;
use techgate_logic::policy::PolicyTable;
use techgate_logic::progress::{highest_finished, percent_finished};
use techgate_logic::settings::GateSettings;
use techgate_logic::strata::TierTable;
use techgate_logic::tier::Tier;

// ── Helpers ────────────────────────────────────────────────────────────

fn weapon(id: u32, name: &str) -> ItemDef {
    ItemDef {
        id: ItemId(id),
        name: name.into(),
        category: ItemCategory::Item,
        is_weapon: true,
        is_apparel: false,
    }
}

fn requirement(id: u32, tier: Tier, finished: bool) -> RequirementDef {
    RequirementDef {
        id: RequirementId(id),
        name: format!("research_{id}"),
        tier,
        finished,
    }
}

fn gated_rule(id: u32, output: u32, req: u32) -> ProductionRule {
    ProductionRule {
        id: RuleId(id),
        name: format!("recipe_{id}"),
        output: Some(ItemId(output)),
        requirement: Some(RequirementId(req)),
        ..Default::default()
    }
}

/// One weapon per ranked tier, each gated by a requirement on that tier.
/// Item and requirement ids equal the tier index.
fn ladder(finished: &[Tier]) -> DefinitionSet {
    let items = Tier::RANKED
        .iter()
        .map(|t| weapon(t.index() as u32, t.label()))
        .collect();
    let requirements = Tier::RANKED
        .iter()
        .map(|&t| requirement(t.index() as u32, t, finished.contains(&t)))
        .collect();
    let rules = Tier::RANKED
        .iter()
        .map(|t| {
            let i = t.index() as u32;
            gated_rule(100 + i, i, i)
        })
        .collect();
    DefinitionSet::new(items, requirements, vec![], rules).unwrap()
}

fn gate_with(settings: GateSettings, faction: Tier, defs: &DefinitionSet) -> TechGate {
    let mut gate = TechGate::new(settings, PolicyTable::default(), faction);
    gate.rebuild(defs);
    gate
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn scenario_a_highest_finished_picks_tier_five() {
    let defs = ladder(&[Tier::Spacer]);
    let mut settings = GateSettings::default();
    settings.use_highest_finished = true;
    let gate = gate_with(settings, Tier::Animal, &defs);
    assert_eq!(gate.current_tier(&defs).unwrap(), Tier::Spacer);
}

#[test]
fn scenario_b_percent_finished_cumulative() {
    let defs = DefinitionSet::new(
        vec![],
        vec![
            requirement(1, Tier::Ultra, true),
            requirement(2, Tier::Ultra, false),
            requirement(3, Tier::Archotech, false),
        ],
        vec![],
        vec![],
    )
    .unwrap();
    let mut settings = GateSettings::default();
    settings.use_percent_finished = true;
    settings.percent_threshold = 0.5;
    let gate = gate_with(settings, Tier::Animal, &defs);
    assert_eq!(gate.current_tier(&defs).unwrap(), Tier::Ultra);
}

#[test]
fn scenario_c_facility_without_requirements_blocks_inference() {
    let defs = DefinitionSet::new(
        vec![weapon(1, "spear")],
        vec![requirement(10, Tier::Neolithic, false)],
        vec![
            WorkerFacility {
                id: FacilityId(1),
                name: "crafting_spot".into(),
                work_speed: 0.5,
                requirements: vec![],
            },
            WorkerFacility {
                id: FacilityId(2),
                name: "smithy".into(),
                work_speed: 1.0,
                requirements: vec![RequirementId(10)],
            },
        ],
        vec![ProductionRule {
            id: RuleId(1),
            name: "make_spear".into(),
            output: Some(ItemId(1)),
            workers: vec![FacilityId(2), FacilityId(1)],
            ..Default::default()
        }],
    )
    .unwrap();
    assert_eq!(infer_requirement(&defs.rules()[0], &defs, &()), None);

    let gate = gate_with(GateSettings::default(), Tier::Animal, &defs);
    let index = gate.index().unwrap();
    assert!(!index.is_gating_eligible(ItemId(1)));
    assert_eq!(
        gate.evaluate(&defs, ItemId(1), None).unwrap(),
        GateOutcome::Unlocked(UnlockReason::Unassigned)
    );
}

#[test]
fn scenario_d_relative_offset_comparison() {
    let defs = ladder(&[]);
    let mut settings = GateSettings::default();
    settings.tier_offset = 1;
    let mut gate = gate_with(settings, Tier::Animal, &defs);
    gate.set_current_tier(Tier::Medieval);

    // Spacer (5) > Medieval (3) + 1
    let spacer_item = ItemId(Tier::Spacer.index() as u32);
    assert!(gate.is_locked(&defs, spacer_item, None).unwrap());
    // Industrial (4) is not > 4
    let industrial_item = ItemId(Tier::Industrial.index() as u32);
    assert!(!gate.is_locked(&defs, industrial_item, None).unwrap());
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn rebuild_twice_gives_identical_index() {
    let defs = ladder(&[Tier::Medieval]);
    let policy = PolicyTable::default()
        .with_hard(ItemId(1), RequirementId(7))
        .with_override(ItemId(2), None);
    assert_eq!(
        AssignmentIndex::rebuild(&defs, &policy),
        AssignmentIndex::rebuild(&defs, &policy)
    );
}

#[test]
fn override_precedence_leaves_no_dangling_inverse() {
    let defs = ladder(&[]);
    let policy = PolicyTable::default().with_override(ItemId(3), Some(RequirementId(7)));
    let index = AssignmentIndex::rebuild(&defs, &policy);

    assert_eq!(index.requirement_for(ItemId(3)), Some(RequirementId(7)));
    assert!(!index.items_for(RequirementId(3)).contains(&ItemId(3)));
    assert!(index.items_for(RequirementId(7)).contains(&ItemId(3)));

    let hard = PolicyTable::default().with_hard(ItemId(4), RequirementId(6));
    let index = AssignmentIndex::rebuild(&defs, &hard);
    assert_eq!(index.requirement_for(ItemId(4)), Some(RequirementId(6)));
    assert!(index.items_for(RequirementId(4)).is_empty());
}

#[test]
fn inverse_lists_hold_unique_items() {
    let mut rules: Vec<ProductionRule> = (0..5).map(|i| gated_rule(i, 1, 10)).collect();
    rules.push(gated_rule(9, 2, 10));
    let defs = DefinitionSet::new(
        vec![weapon(1, "knife"), weapon(2, "axe")],
        vec![requirement(10, Tier::Medieval, false)],
        vec![],
        rules,
    )
    .unwrap();
    let index = AssignmentIndex::rebuild(&defs, &());
    assert_eq!(index.len(), 2);
    assert_eq!(index.items_for(RequirementId(10)), &[ItemId(1), ItemId(2)]);
}

#[test]
fn highest_finished_never_drops_below_finished_tier() {
    for top in Tier::RANKED {
        let finished: Vec<Tier> = Tier::RANKED.iter().copied().filter(|&t| t <= top).collect();
        let defs = ladder(&finished);
        let table = TierTable::classify(&defs);
        assert_eq!(highest_finished(&table, &defs), top);
    }
}

#[test]
fn uncontrolled_actors_never_locked_under_any_config() {
    let defs = ladder(&[]);
    let configs = [
        GateSettings::default(),
        GateSettings {
            restrict_on_tier: false,
            min_tier_to_restrict: Tier::Animal,
            lock_even_if_finished: true,
            ..GateSettings::default()
        },
        GateSettings {
            use_percent_finished: true,
            percent_threshold: 1.0,
            ..GateSettings::default()
        },
    ];
    for settings in configs {
        let gate = gate_with(settings, Tier::Animal, &defs);
        for tier in Tier::RANKED {
            let item = ItemId(tier.index() as u32);
            for actor in [ActorKind::Hostile, ActorKind::Guest, ActorKind::Prisoner] {
                assert!(!gate.is_locked(&defs, item, Some(actor)).unwrap());
            }
        }
    }
}

#[test]
fn finishing_research_unlocks_progressively() {
    let mut defs = ladder(&[]);
    let mut settings = GateSettings::default();
    settings.use_highest_finished = true;
    let mut gate = gate_with(settings, Tier::Animal, &defs);
    let before = gate.locked_items(&defs).unwrap().len();

    defs.set_finished(RequirementId(Tier::Industrial.index() as u32), true);
    gate.start_session();
    let after = gate.locked_items(&defs).unwrap();

    assert!(after.len() < before);
    assert!(!after.contains(&ItemId(Tier::Industrial.index() as u32)));
    assert!(after.contains(&ItemId(Tier::Spacer.index() as u32)));
}

#[test]
fn percent_threshold_one_requires_full_tier() {
    let defs = ladder(&[Tier::Archotech]);
    let table = TierTable::classify(&defs);
    assert_eq!(percent_finished(&table, &defs, 1.0), Tier::Archotech);
}
