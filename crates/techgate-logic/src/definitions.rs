//! Definition snapshot: items, requirements, worker facilities, and
//! production rules.
//!
//! The host game owns the real definition database. It hands this crate a
//! [`DefinitionSet`] snapshot, either built in code or loaded from JSON.
//! The snapshot is read-only to the gating engine except for each
//! requirement's `finished` flag, which the host flips as research
//! completes.
//!
//! ```
//! use techgate_logic::definitions::DefinitionSet;
//!
//! let defs = DefinitionSet::from_json(r#"{
//!     "items": [{ "id": 1, "name": "longsword", "category": "Item", "is_weapon": true }],
//!     "requirements": [{ "id": 10, "name": "smithing", "tier": "Medieval" }],
//!     "rules": [{ "id": 100, "name": "make_longsword", "output": 1, "requirement": 10 }]
//! }"#).unwrap();
//! assert_eq!(defs.rules().len(), 1);
//! assert!(defs.requirement(techgate_logic::definitions::RequirementId(10)).is_some());
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::tier::Tier;

/// Identifies a producible item definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Identifies a requirement (research project).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementId(pub u32);

/// Identifies a worker facility (workbench).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u32);

/// Identifies a production rule (recipe).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RuleId(pub u32);

/// Structural category of an item definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemCategory {
    #[default]
    Item,
    Building,
    Plant,
    Pawn,
    Filth,
    Projectile,
    Ethereal,
}

/// A producible item definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default)]
    pub is_weapon: bool,
    #[serde(default)]
    pub is_apparel: bool,
}

impl ItemDef {
    /// Buildings and anything that is neither a weapon nor apparel are never
    /// gated by inference.
    pub fn excluded_from_gating(&self) -> bool {
        self.category == ItemCategory::Building || (!self.is_weapon && !self.is_apparel)
    }
}

/// A gating prerequisite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementDef {
    pub id: RequirementId,
    pub name: String,
    pub tier: Tier,
    /// Completion state, owned by the host.
    #[serde(default)]
    pub finished: bool,
}

/// A workbench-like facility that can run production rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerFacility {
    pub id: FacilityId,
    pub name: String,
    /// Work-speed factor. Lower means a more primitive bench.
    #[serde(default = "default_work_speed")]
    pub work_speed: f32,
    /// Declared requirements; the first is canonical.
    #[serde(default)]
    pub requirements: Vec<RequirementId>,
}

fn default_work_speed() -> f32 {
    1.0
}

impl WorkerFacility {
    /// The facility's canonical requirement, if it declares any.
    pub fn canonical_requirement(&self) -> Option<RequirementId> {
        self.requirements.first().copied()
    }
}

/// A recipe: which facilities produce which item, behind which prerequisites.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionRule {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub output: Option<ItemId>,
    /// Single canonical prerequisite.
    #[serde(default)]
    pub requirement: Option<RequirementId>,
    /// Ordered prerequisite list; the first is canonical.
    #[serde(default)]
    pub requirements: Vec<RequirementId>,
    /// Candidate worker facilities, in declaration order.
    #[serde(default)]
    pub workers: Vec<FacilityId>,
}

/// Read-only snapshot of the definition universe.
///
/// Deserializing goes through the same validation as [`DefinitionSet::new`],
/// so a set nested in a larger document is indexed on arrival.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDefinitionSet")]
pub struct DefinitionSet {
    items: Vec<ItemDef>,
    requirements: Vec<RequirementDef>,
    facilities: Vec<WorkerFacility>,
    rules: Vec<ProductionRule>,

    #[serde(skip)]
    item_index: HashMap<ItemId, usize>,
    #[serde(skip)]
    requirement_index: HashMap<RequirementId, usize>,
    #[serde(skip)]
    facility_index: HashMap<FacilityId, usize>,
}

/// Wire shape of a [`DefinitionSet`], before indexing.
#[derive(Deserialize)]
struct RawDefinitionSet {
    #[serde(default)]
    items: Vec<ItemDef>,
    #[serde(default)]
    requirements: Vec<RequirementDef>,
    #[serde(default)]
    facilities: Vec<WorkerFacility>,
    #[serde(default)]
    rules: Vec<ProductionRule>,
}

impl TryFrom<RawDefinitionSet> for DefinitionSet {
    type Error = DefinitionError;

    fn try_from(raw: RawDefinitionSet) -> Result<Self, Self::Error> {
        DefinitionSet::new(raw.items, raw.requirements, raw.facilities, raw.rules)
    }
}

impl DefinitionSet {
    /// Build a snapshot, validating ids and cross-references.
    pub fn new(
        items: Vec<ItemDef>,
        requirements: Vec<RequirementDef>,
        facilities: Vec<WorkerFacility>,
        rules: Vec<ProductionRule>,
    ) -> Result<Self, DefinitionError> {
        let mut set = Self {
            items,
            requirements,
            facilities,
            rules,
            ..Default::default()
        };
        set.reindex()?;
        Ok(set)
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let raw: RawDefinitionSet = serde_json::from_str(json)?;
        raw.try_into()
    }

    fn reindex(&mut self) -> Result<(), DefinitionError> {
        self.item_index.clear();
        self.requirement_index.clear();
        self.facility_index.clear();

        for (i, item) in self.items.iter().enumerate() {
            if self.item_index.insert(item.id, i).is_some() {
                return Err(DefinitionError::DuplicateItem(item.id));
            }
        }
        for (i, req) in self.requirements.iter().enumerate() {
            if self.requirement_index.insert(req.id, i).is_some() {
                return Err(DefinitionError::DuplicateRequirement(req.id));
            }
        }
        for (i, facility) in self.facilities.iter().enumerate() {
            if self.facility_index.insert(facility.id, i).is_some() {
                return Err(DefinitionError::DuplicateFacility(facility.id));
            }
            for &requirement in &facility.requirements {
                if !self.requirement_index.contains_key(&requirement) {
                    return Err(DefinitionError::UnknownFacilityRequirement {
                        facility: facility.id,
                        requirement,
                    });
                }
            }
        }

        let mut seen_rules = std::collections::HashSet::new();
        for rule in &self.rules {
            if !seen_rules.insert(rule.id) {
                return Err(DefinitionError::DuplicateRule(rule.id));
            }
            if let Some(item) = rule.output {
                if !self.item_index.contains_key(&item) {
                    return Err(DefinitionError::UnknownOutput {
                        rule: rule.id,
                        item,
                    });
                }
            }
            for &requirement in rule.requirement.iter().chain(&rule.requirements) {
                if !self.requirement_index.contains_key(&requirement) {
                    return Err(DefinitionError::UnknownRuleRequirement {
                        rule: rule.id,
                        requirement,
                    });
                }
            }
            for &facility in &rule.workers {
                if !self.facility_index.contains_key(&facility) {
                    return Err(DefinitionError::UnknownWorker {
                        rule: rule.id,
                        facility,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    pub fn requirements(&self) -> &[RequirementDef] {
        &self.requirements
    }

    pub fn facilities(&self) -> &[WorkerFacility] {
        &self.facilities
    }

    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.item_index.get(&id).map(|&i| &self.items[i])
    }

    pub fn requirement(&self, id: RequirementId) -> Option<&RequirementDef> {
        self.requirement_index.get(&id).map(|&i| &self.requirements[i])
    }

    pub fn facility(&self, id: FacilityId) -> Option<&WorkerFacility> {
        self.facility_index.get(&id).map(|&i| &self.facilities[i])
    }

    /// Whether the requirement exists and is finished.
    pub fn is_finished(&self, id: RequirementId) -> bool {
        self.requirement(id).is_some_and(|r| r.finished)
    }

    /// Update a requirement's completion flag. Returns `false` if unknown.
    pub fn set_finished(&mut self, id: RequirementId, finished: bool) -> bool {
        match self.requirement_index.get(&id) {
            Some(&i) => {
                self.requirements[i].finished = finished;
                true
            }
            None => false,
        }
    }

    /// Look up a requirement by name.
    pub fn requirement_named(&self, name: &str) -> Option<&RequirementDef> {
        self.requirements.iter().find(|r| r.name == name)
    }

    /// Look up an item by name.
    pub fn item_named(&self, name: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.name == name)
    }
}
