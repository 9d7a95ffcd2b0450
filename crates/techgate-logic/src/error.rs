//! Error types for snapshot loading and gate queries.

use thiserror::Error;

use crate::definitions::{FacilityId, ItemId, RequirementId, RuleId};

/// Querying the gate before it was built.
///
/// Without an index every item would silently read as unlocked, so this is
/// surfaced instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("tech gate queried before rebuild()")]
    NotBuilt,
}

/// Problems found while loading a definition snapshot.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate item id {0:?}")]
    DuplicateItem(ItemId),
    #[error("duplicate requirement id {0:?}")]
    DuplicateRequirement(RequirementId),
    #[error("duplicate facility id {0:?}")]
    DuplicateFacility(FacilityId),
    #[error("duplicate rule id {0:?}")]
    DuplicateRule(RuleId),
    #[error("rule {rule:?} outputs unknown item {item:?}")]
    UnknownOutput { rule: RuleId, item: ItemId },
    #[error("rule {rule:?} references unknown requirement {requirement:?}")]
    UnknownRuleRequirement {
        rule: RuleId,
        requirement: RequirementId,
    },
    #[error("rule {rule:?} references unknown facility {facility:?}")]
    UnknownWorker { rule: RuleId, facility: FacilityId },
    #[error("facility {facility:?} references unknown requirement {requirement:?}")]
    UnknownFacilityRequirement {
        facility: FacilityId,
        requirement: RequirementId,
    },
}
