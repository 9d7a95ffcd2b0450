//! Progress evaluation: the operator's aggregate tier.
//!
//! Three interchangeable strategies:
//!
//! | Strategy | Result |
//! |----------|--------|
//! | `HighestFinished` | Highest tier holding any finished requirement |
//! | `PercentFinished` | Highest tier where the cumulative finished count, divided by that tier's size, meets the threshold |
//! | `FactionDefault` | The faction's starting tier, regardless of research |
//!
//! Both scanning strategies fall back to [`Tier::FLOOR`] when no tier
//! qualifies. [`ProgressEvaluator`] caches the result until invalidated.
//!
//! ```
//! use techgate_logic::definitions::{DefinitionSet, RequirementDef, RequirementId};
//! use techgate_logic::progress::highest_finished;
//! use techgate_logic::strata::TierTable;
//! use techgate_logic::tier::Tier;
//!
//! let defs = DefinitionSet::new(vec![], vec![
//!     RequirementDef { id: RequirementId(1), name: "stonecutting".into(), tier: Tier::Neolithic, finished: true },
//!     RequirementDef { id: RequirementId(2), name: "electricity".into(), tier: Tier::Industrial, finished: false },
//! ], vec![], vec![]).unwrap();
//! let table = TierTable::classify(&defs);
//! assert_eq!(highest_finished(&table, &defs), Tier::Neolithic);
//! ```

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::definitions::DefinitionSet;
use crate::strata::TierTable;
use crate::tier::Tier;

/// How the aggregate tier is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProgressStrategy {
    HighestFinished,
    PercentFinished { threshold: f32 },
    FactionDefault,
}

/// Highest tier with at least one finished requirement.
pub fn highest_finished(table: &TierTable, defs: &DefinitionSet) -> Tier {
    Tier::descending()
        .find(|&tier| table.requirements_at(tier).any(|r| defs.is_finished(r)))
        .unwrap_or(Tier::FLOOR)
}

/// Scan from the top tier down, carrying the finished count across tiers.
/// Tiers with no requirements are skipped.
pub fn percent_finished(table: &TierTable, defs: &DefinitionSet, threshold: f32) -> Tier {
    let mut running = 0usize;
    for tier in Tier::descending() {
        let count = table.count_at(tier);
        if count == 0 {
            continue;
        }
        running += table
            .requirements_at(tier)
            .filter(|&r| defs.is_finished(r))
            .count();
        if running as f32 / count as f32 >= threshold {
            return tier;
        }
    }
    Tier::FLOOR
}

/// Compute the aggregate tier without caching.
pub fn evaluate(
    strategy: ProgressStrategy,
    table: &TierTable,
    defs: &DefinitionSet,
    faction_tier: Tier,
) -> Tier {
    match strategy {
        ProgressStrategy::HighestFinished => highest_finished(table, defs),
        ProgressStrategy::PercentFinished { threshold } => {
            percent_finished(table, defs, threshold)
        }
        ProgressStrategy::FactionDefault => faction_tier,
    }
}

/// Session-scoped cache of the aggregate tier.
///
/// `Tier::Undefined` means "recompute on next query".
#[derive(Debug, Default)]
pub struct ProgressEvaluator {
    cached: Cell<Tier>,
}

impl ProgressEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tier, computing it first if the cache is empty.
    pub fn current_tier(
        &self,
        strategy: ProgressStrategy,
        table: &TierTable,
        defs: &DefinitionSet,
        faction_tier: Tier,
    ) -> Tier {
        let cached = self.cached.get();
        if !cached.is_undefined() {
            return cached;
        }
        let tier = evaluate(strategy, table, defs, faction_tier);
        log::debug!("progress recomputed with {:?}: {}", strategy, tier);
        self.cached.set(tier);
        tier
    }

    /// Force the cached tier; honoured until the next invalidation.
    pub fn set(&mut self, tier: Tier) {
        self.cached.set(tier);
    }

    /// Drop the cached tier.
    pub fn invalidate(&mut self) {
        self.cached.set(Tier::Undefined);
    }

    /// Peek at the cache without computing.
    pub fn cached(&self) -> Option<Tier> {
        Some(self.cached.get()).filter(|t| !t.is_undefined())
    }
}
