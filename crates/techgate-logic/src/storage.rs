//! Storage-rack compatibility filter.
//!
//! Third-party armor and weapon racks decide on their own whether an item
//! fits. The host runs that check first and passes the verdict here; a
//! locked item is then refused even if the rack would take it. The filter
//! only ever narrows the upstream answer.

use crate::definitions::{DefinitionSet, ItemId};
use crate::error::GateError;
use crate::gate::TechGate;
use crate::policy::AssignmentPolicy;

/// Which rack slot is being filled. Both follow the same rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RackSlot {
    Apparel,
    Weapon,
}

/// Combine the rack's own verdict with the gate.
pub fn can_store<P: AssignmentPolicy>(
    gate: &TechGate<P>,
    defs: &DefinitionSet,
    item: ItemId,
    upstream_allowed: bool,
) -> Result<bool, GateError> {
    if !upstream_allowed {
        return Ok(false);
    }
    Ok(!gate.is_locked(defs, item, None)?)
}

/// [`can_store`] with the slot recorded for diagnostics.
pub fn can_store_in<P: AssignmentPolicy>(
    gate: &TechGate<P>,
    defs: &DefinitionSet,
    slot: RackSlot,
    item: ItemId,
    upstream_allowed: bool,
) -> Result<bool, GateError> {
    let allowed = can_store(gate, defs, item, upstream_allowed)?;
    if upstream_allowed && !allowed {
        log::debug!("{:?} rack refuses locked item {:?}", slot, item);
    }
    Ok(allowed)
}
