//! TechGate Headless Simulation Harness
//!
//! Validates the gating pipeline against a bundled definition snapshot.
//! Runs entirely in-process: no game engine, no mod loader, no UI.
//!
//! Usage:
//!   cargo run -p techgate-simtest
//!   cargo run -p techgate-simtest -- --verbose

use serde::Deserialize;
use techgate_logic::assignment::AssignmentIndex;
use techgate_logic::definitions::{DefinitionSet, ItemId, RequirementId};
use techgate_logic::gate::{ActorKind, GateOutcome, TechGate, UnlockReason};
use techgate_logic::policy::PolicyTable;
use techgate_logic::progress::{self, ProgressStrategy};
use techgate_logic::settings::{validate_settings, GateSettings};
use techgate_logic::storage::{can_store_in, RackSlot};
use techgate_logic::strata::TierTable;
use techgate_logic::tier::Tier;
use tracing_subscriber::{fmt, EnvFilter};

// ── Definition snapshot (stand-in for the game's def database) ─────────
const SNAPSHOT_JSON: &str = include_str!("../../../data/sample_defs.json");

#[derive(Debug, Deserialize)]
struct Snapshot {
    faction_tier: Tier,
    #[serde(default)]
    settings: GateSettings,
    #[serde(default)]
    policy: PolicyTable,
    definitions: DefinitionSet,
}

// ── Logging ─────────────────────────────────────────────────────────────

/// Route the library's `log` records to stderr. `RUST_LOG` overrides the
/// default `debug` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    if verbose {
        init_logging();
    }
    println!("=== TechGate Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Snapshot & settings validation
    let snapshot = match load_snapshot(&mut results) {
        Some(s) => s,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };
    let defs = &snapshot.definitions;

    // 2. Requirement inference sweep
    results.extend(validate_inference(defs, &snapshot.policy, verbose));

    // 3. Progress strategies
    results.extend(validate_progress(defs, snapshot.faction_tier, verbose));

    // 4. Gate decisions
    results.extend(validate_gate(&snapshot, verbose));

    // 5. Storage-rack filter
    results.extend(validate_storage(&snapshot));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary. Returns `true` if everything passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed == 0
}

fn item(defs: &DefinitionSet, name: &str) -> ItemId {
    defs.item_named(name).map_or(ItemId(u32::MAX), |i| i.id)
}

fn requirement(defs: &DefinitionSet, name: &str) -> RequirementId {
    defs.requirement_named(name)
        .map_or(RequirementId(u32::MAX), |r| r.id)
}

fn build_gate(snapshot: &Snapshot, settings: GateSettings) -> TechGate {
    let mut gate = TechGate::new(settings, snapshot.policy.clone(), snapshot.faction_tier);
    gate.rebuild(&snapshot.definitions);
    gate
}

// ── 1. Snapshot ─────────────────────────────────────────────────────────

fn load_snapshot(results: &mut Vec<TestResult>) -> Option<Snapshot> {
    println!("--- Snapshot ---");

    let raw: Snapshot = match serde_json::from_str(SNAPSHOT_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "snapshot_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };
    let definitions = &raw.definitions;
    results.push(TestResult {
        name: "snapshot_references".into(),
        passed: true,
        detail: format!(
            "{} items, {} requirements, {} facilities, {} rules",
            definitions.items().len(),
            definitions.requirements().len(),
            definitions.facilities().len(),
            definitions.rules().len()
        ),
    });

    let errors = validate_settings(&raw.settings);
    results.push(TestResult {
        name: "settings_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("strategy {:?}", raw.settings.strategy())
        } else {
            format!("{:?}", errors)
        },
    });

    Some(raw)
}

// ── 2. Inference ────────────────────────────────────────────────────────

fn validate_inference(
    defs: &DefinitionSet,
    policy: &PolicyTable,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Inference ---");
    let mut results = Vec::new();
    let index = AssignmentIndex::rebuild(defs, policy);

    // (item, expected requirement); None means ungated
    let expectations: [(&str, Option<&str>); 14] = [
        ("mace", Some("smithing")),
        ("longsword", Some("long_blades")),
        ("revolver", Some("gunsmithing")),
        ("bolt_action_rifle", Some("precision_rifling")),
        ("charge_rifle", Some("charged_shot")),
        ("flak_vest", Some("flak_armor")),
        ("parka", Some("complex_clothing")),
        ("plasmasword", Some("charged_shot")),
        ("persona_monosword", Some("persona_weapons")),
        ("tribalwear", None),
        ("simple_meal", None),
        ("sandbags", None),
        ("component_industrial", None),
        ("recurve_bow", None),
    ];

    let mut mismatches = Vec::new();
    for (item_name, expected) in expectations {
        let actual = index.requirement_for(item(defs, item_name));
        let expected = expected.map(|r| requirement(defs, r));
        if actual != expected {
            mismatches.push(format!("{item_name}: {actual:?} != {expected:?}"));
        }
    }
    results.push(TestResult {
        name: "inference_expected_assignments".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            format!("{} items checked", expectations.len())
        } else {
            mismatches.join("; ")
        },
    });

    // Inverse map consistency
    let consistent = index.iter().all(|(i, r)| {
        index.items_for(r).iter().filter(|&&x| x == i).count() == 1
    }) && index.gating_requirements().all(|r| {
        index
            .items_for(r)
            .iter()
            .all(|&i| index.requirement_for(i) == Some(r))
    });
    results.push(TestResult {
        name: "inference_inverse_consistent".into(),
        passed: consistent,
        detail: format!("{} gated items", index.len()),
    });

    // Rebuild determinism
    let again = AssignmentIndex::rebuild(defs, policy);
    results.push(TestResult {
        name: "inference_rebuild_idempotent".into(),
        passed: again == index,
        detail: "two rebuilds from one snapshot".into(),
    });

    if verbose {
        println!("  Assignments:");
        for (item_id, req_id) in index.iter() {
            let item_name = defs.item(item_id).map_or("?", |i| i.name.as_str());
            let req = defs.requirement(req_id);
            println!(
                "    {:24} → {:20} ({})",
                item_name,
                req.map_or("?", |r| r.name.as_str()),
                req.map_or(Tier::Undefined, |r| r.tier)
            );
        }
    }

    results
}

// ── 3. Progress ─────────────────────────────────────────────────────────

fn validate_progress(defs: &DefinitionSet, faction_tier: Tier, verbose: bool) -> Vec<TestResult> {
    println!("--- Progress ---");
    let mut results = Vec::new();
    let table = TierTable::classify(defs);

    results.push(TestResult {
        name: "strata_complete".into(),
        passed: table.len() == defs.requirements().len(),
        detail: format!("{} requirements in {} tiers", table.len(), table.tiers().count()),
    });

    let highest = progress::highest_finished(&table, defs);
    results.push(TestResult {
        name: "progress_highest_finished".into(),
        passed: highest == Tier::Medieval,
        detail: format!("{highest}"),
    });

    let percent = progress::percent_finished(&table, defs, 0.5);
    results.push(TestResult {
        name: "progress_percent_finished".into(),
        passed: percent == Tier::Neolithic,
        detail: format!("{percent} at 50%"),
    });

    let faction = progress::evaluate(ProgressStrategy::FactionDefault, &table, defs, faction_tier);
    results.push(TestResult {
        name: "progress_faction_default".into(),
        passed: faction == faction_tier,
        detail: format!("{faction}"),
    });

    if verbose {
        println!("  Tier table:");
        for tier in Tier::descending() {
            let finished = table
                .requirements_at(tier)
                .filter(|&r| defs.is_finished(r))
                .count();
            println!(
                "    {:12} {}/{} finished",
                tier.label(),
                finished,
                table.count_at(tier)
            );
        }
    }

    results
}

// ── 4. Gate ─────────────────────────────────────────────────────────────

fn validate_gate(snapshot: &Snapshot, verbose: bool) -> Vec<TestResult> {
    println!("--- Gate ---");
    let mut results = Vec::new();
    let defs = &snapshot.definitions;
    let gate = build_gate(snapshot, snapshot.settings.clone());

    let expected_locked: Vec<ItemId> = [
        "revolver",
        "bolt_action_rifle",
        "charge_rifle",
        "flak_vest",
        "power_armor",
        "plasmasword",
    ]
    .iter()
    .map(|n| item(defs, n))
    .collect();
    let mut expected_sorted = expected_locked.clone();
    expected_sorted.sort();

    match gate.locked_items(defs) {
        Ok(locked) => results.push(TestResult {
            name: "gate_locked_set".into(),
            passed: locked == expected_sorted,
            detail: format!("{} locked", locked.len()),
        }),
        Err(e) => results.push(TestResult {
            name: "gate_locked_set".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    let monosword = gate.evaluate(defs, item(defs, "persona_monosword"), None);
    results.push(TestResult {
        name: "gate_exempt".into(),
        passed: monosword == Ok(GateOutcome::Unlocked(UnlockReason::Exempt)),
        detail: format!("{monosword:?}"),
    });

    let raider_ok = expected_locked.iter().all(|&i| {
        gate.is_locked(defs, i, Some(ActorKind::Hostile)) == Ok(false)
    });
    results.push(TestResult {
        name: "gate_uncontrolled_bypass".into(),
        passed: raider_ok,
        detail: "hostile actors never locked".into(),
    });

    // Absolute mode at Spacer: only Spacer+ requirements lock
    let absolute = build_gate(
        snapshot,
        GateSettings {
            restrict_on_tier: false,
            min_tier_to_restrict: Tier::Spacer,
            ..snapshot.settings.clone()
        },
    );
    let absolute_locked = absolute.locked_items(defs).unwrap_or_default();
    let spacer_only = absolute_locked.iter().all(|&i| {
        absolute
            .index()
            .ok()
            .and_then(|idx| idx.requirement_for(i))
            .and_then(|r| defs.requirement(r))
            .is_some_and(|r| r.tier >= Tier::Spacer)
    });
    results.push(TestResult {
        name: "gate_absolute_mode".into(),
        passed: spacer_only && absolute_locked.len() == 3,
        detail: format!("{} locked at Spacer+", absolute_locked.len()),
    });

    // Relative offset widens the usable band
    let generous = build_gate(
        snapshot,
        GateSettings {
            tier_offset: 1,
            ..snapshot.settings.clone()
        },
    );
    let generous_locked = generous.locked_items(defs).unwrap_or_default();
    results.push(TestResult {
        name: "gate_relative_offset".into(),
        passed: generous_locked.len() == 3
            && !generous_locked.contains(&item(defs, "revolver")),
        detail: format!("{} locked with offset 1", generous_locked.len()),
    });

    // Finishing research unlocks
    let mut researched = defs.clone();
    researched.set_finished(requirement(defs, "gunsmithing"), true);
    let mut gate = build_gate(snapshot, snapshot.settings.clone());
    gate.start_session();
    let revolver = gate.evaluate(&researched, item(defs, "revolver"), Some(ActorKind::Colonist));
    results.push(TestResult {
        name: "gate_research_unlocks".into(),
        passed: revolver.as_ref().is_ok_and(|o| !o.is_locked()),
        detail: format!("{revolver:?}"),
    });

    if verbose {
        println!("  Unlocks by requirement:");
        for req in defs.requirements() {
            let items = gate.items_unlocked_by(req.id).unwrap_or(&[]);
            if items.is_empty() {
                continue;
            }
            let names: Vec<&str> = items
                .iter()
                .filter_map(|&i| defs.item(i).map(|d| d.name.as_str()))
                .collect();
            println!("    {:20} → {}", req.name, names.join(", "));
        }
    }

    results
}

// ── 5. Storage ──────────────────────────────────────────────────────────

fn validate_storage(snapshot: &Snapshot) -> Vec<TestResult> {
    println!("--- Storage ---");
    let mut results = Vec::new();
    let defs = &snapshot.definitions;
    let gate = build_gate(snapshot, snapshot.settings.clone());

    let armor = can_store_in(&gate, defs, RackSlot::Apparel, item(defs, "power_armor"), true);
    let parka = can_store_in(&gate, defs, RackSlot::Apparel, item(defs, "parka"), true);
    results.push(TestResult {
        name: "storage_apparel_rack".into(),
        passed: armor == Ok(false) && parka == Ok(true),
        detail: format!("power_armor {armor:?}, parka {parka:?}"),
    });

    let refused = can_store_in(&gate, defs, RackSlot::Weapon, item(defs, "mace"), false);
    results.push(TestResult {
        name: "storage_never_widens".into(),
        passed: refused == Ok(false),
        detail: format!("mace with upstream refusal {refused:?}"),
    });

    results
}
