//! Gate decision: is an item locked for a given actor right now?
//!
//! [`TechGate`] is the session object the host keeps around. It owns the
//! assignment index, the tier table, and the progress cache, and answers
//! [`TechGate::is_locked`] against the current definition snapshot.
//!
//! # Decision order
//!
//! | Step | Check | Outcome when it applies |
//! |------|-------|--------------------------|
//! | 1 | Actor present but not controlled | unlocked |
//! | 2 | Item has no assignment | unlocked |
//! | 3 | Requirement gone from the snapshot | unlocked |
//! | 4 | Requirement exempt by policy | unlocked |
//! | 5 | Requirement tier outside the locked range | unlocked |
//! | 6 | Requirement finished (and not forced) | unlocked |
//! | - | otherwise | locked |
//!
//! ```
//! use techgate_logic::definitions::*;
//! use techgate_logic::gate::{ActorKind, TechGate};
//! use techgate_logic::policy::PolicyTable;
//! use techgate_logic::settings::GateSettings;
//! use techgate_logic::tier::Tier;
//!
//! let defs = DefinitionSet::new(
//!     vec![ItemDef { id: ItemId(1), name: "charge_rifle".into(), category: ItemCategory::Item,
//!                    is_weapon: true, is_apparel: false }],
//!     vec![RequirementDef { id: RequirementId(9), name: "charged_shot".into(),
//!                           tier: Tier::Spacer, finished: false }],
//!     vec![],
//!     vec![ProductionRule { id: RuleId(1), name: "make_charge_rifle".into(),
//!                           output: Some(ItemId(1)), requirement: Some(RequirementId(9)),
//!                           ..Default::default() }],
//! ).unwrap();
//!
//! let mut gate = TechGate::new(GateSettings::default(), PolicyTable::default(), Tier::Industrial);
//! gate.rebuild(&defs);
//! assert!(gate.is_locked(&defs, ItemId(1), Some(ActorKind::Colonist)).unwrap());
//! assert!(!gate.is_locked(&defs, ItemId(1), Some(ActorKind::Hostile)).unwrap());
//! ```

use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentIndex;
use crate::definitions::{DefinitionSet, ItemId, RequirementId};
use crate::error::GateError;
use crate::policy::{AssignmentPolicy, PolicyTable};
use crate::progress::ProgressEvaluator;
use crate::settings::GateSettings;
use crate::strata::TierTable;
use crate::tier::Tier;

/// Who is trying to use an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Colonist,
    Slave,
    Prisoner,
    Guest,
    Hostile,
    Animal,
}

impl ActorKind {
    /// Only actors under the player's control are ever gated.
    pub fn is_controlled(self) -> bool {
        matches!(self, ActorKind::Colonist | ActorKind::Slave)
    }
}

/// Why an item is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockReason {
    UncontrolledActor,
    Unassigned,
    StaleRequirement,
    Exempt,
    BelowRestrictedTier,
    AlreadyFinished,
}

/// Result of a gate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateOutcome {
    Locked {
        requirement: RequirementId,
        tier: Tier,
    },
    Unlocked(UnlockReason),
}

impl GateOutcome {
    pub fn is_locked(&self) -> bool {
        matches!(self, GateOutcome::Locked { .. })
    }
}

/// Structures produced by a rebuild.
#[derive(Debug)]
struct Built {
    index: AssignmentIndex,
    tiers: TierTable,
}

/// Session-scoped gating state.
#[derive(Debug)]
pub struct TechGate<P: AssignmentPolicy = PolicyTable> {
    settings: GateSettings,
    policy: P,
    faction_tier: Tier,
    built: Option<Built>,
    progress: ProgressEvaluator,
}

impl<P: AssignmentPolicy> TechGate<P> {
    /// Create an unbuilt gate. Call [`TechGate::rebuild`] before querying.
    pub fn new(settings: GateSettings, policy: P, faction_tier: Tier) -> Self {
        Self {
            settings,
            policy,
            faction_tier,
            built: None,
            progress: ProgressEvaluator::new(),
        }
    }

    /// Rebuild the tier table and assignment index from scratch.
    pub fn rebuild(&mut self, defs: &DefinitionSet) {
        let tiers = TierTable::classify(defs);
        let index = AssignmentIndex::rebuild(defs, &self.policy);
        log::info!(
            "tech gate rebuilt: {} requirements classified, {} items gated",
            tiers.len(),
            index.len()
        );
        self.built = Some(Built { index, tiers });
        self.progress.invalidate();
    }

    /// New session (e.g. a save was loaded): forget the cached tier.
    pub fn start_session(&mut self) {
        self.progress.invalidate();
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    fn built(&self) -> Result<&Built, GateError> {
        self.built.as_ref().ok_or(GateError::NotBuilt)
    }

    pub fn index(&self) -> Result<&AssignmentIndex, GateError> {
        Ok(&self.built()?.index)
    }

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// Replace settings. The strategy may have changed, so the cached tier
    /// is dropped.
    pub fn set_settings(&mut self, settings: GateSettings) {
        self.settings = settings;
        self.progress.invalidate();
    }

    pub fn faction_tier(&self) -> Tier {
        self.faction_tier
    }

    pub fn set_faction_tier(&mut self, tier: Tier) {
        self.faction_tier = tier;
        self.progress.invalidate();
    }

    /// The operator's aggregate tier, cached until the next invalidation.
    pub fn current_tier(&self, defs: &DefinitionSet) -> Result<Tier, GateError> {
        let built = self.built()?;
        Ok(self.progress.current_tier(
            self.settings.strategy(),
            &built.tiers,
            defs,
            self.faction_tier,
        ))
    }

    /// Pin the aggregate tier; honoured until the next invalidation.
    pub fn set_current_tier(&mut self, tier: Tier) {
        self.progress.set(tier);
    }

    /// Whether a requirement at `tier` falls in the locked range.
    pub fn in_locked_range(&self, defs: &DefinitionSet, tier: Tier) -> Result<bool, GateError> {
        if self.settings.restrict_on_tier {
            let ceiling = self.current_tier(defs)?.offset(self.settings.tier_offset);
            Ok(tier > ceiling)
        } else {
            self.built()?;
            Ok(tier >= self.settings.min_tier_to_restrict)
        }
    }

    /// Full decision for `item`, with the reason when it is usable.
    pub fn evaluate(
        &self,
        defs: &DefinitionSet,
        item: ItemId,
        actor: Option<ActorKind>,
    ) -> Result<GateOutcome, GateError> {
        let built = self.built()?;

        if actor.is_some_and(|a| !a.is_controlled()) {
            return Ok(GateOutcome::Unlocked(UnlockReason::UncontrolledActor));
        }
        let Some(requirement_id) = built.index.requirement_for(item) else {
            return Ok(GateOutcome::Unlocked(UnlockReason::Unassigned));
        };
        let Some(requirement) = defs.requirement(requirement_id) else {
            log::debug!(
                "item {:?} points at stale requirement {:?}",
                item,
                requirement_id
            );
            return Ok(GateOutcome::Unlocked(UnlockReason::StaleRequirement));
        };
        if self.policy.is_exempt(requirement_id) {
            return Ok(GateOutcome::Unlocked(UnlockReason::Exempt));
        }
        if !self.in_locked_range(defs, requirement.tier)? {
            return Ok(GateOutcome::Unlocked(UnlockReason::BelowRestrictedTier));
        }
        if requirement.finished && !self.settings.lock_even_if_finished {
            return Ok(GateOutcome::Unlocked(UnlockReason::AlreadyFinished));
        }

        Ok(GateOutcome::Locked {
            requirement: requirement_id,
            tier: requirement.tier,
        })
    }

    /// Whether `item` is locked. `actor = None` means "no specific actor".
    pub fn is_locked(
        &self,
        defs: &DefinitionSet,
        item: ItemId,
        actor: Option<ActorKind>,
    ) -> Result<bool, GateError> {
        Ok(self.evaluate(defs, item, actor)?.is_locked())
    }

    /// Items that finishing `requirement` would unlock.
    pub fn items_unlocked_by(&self, requirement: RequirementId) -> Result<&[ItemId], GateError> {
        Ok(self.built()?.index.items_for(requirement))
    }

    /// Every gated item that is currently locked, in item order.
    pub fn locked_items(&self, defs: &DefinitionSet) -> Result<Vec<ItemId>, GateError> {
        let built = self.built()?;
        let mut locked = Vec::new();
        for (item, _) in built.index.iter() {
            if self.is_locked(defs, item, None)? {
                locked.push(item);
            }
        }
        Ok(locked)
    }
}
