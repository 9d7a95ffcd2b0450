//! Ordered technology tiers.
//!
//! Every requirement sits on exactly one tier, and the operator's
//! aggregate progress is expressed as a tier too. Tiers compare by rank,
//! so `Tier::Spacer > Tier::Industrial`.
//!
//! | Index | Tier | Notes |
//! |-------|------|-------|
//! | 0 | `Undefined` | Sentinel: "not yet computed", or no restriction |
//! | 1 | `Animal` | Lowest ranked tier, fallback for progress scans |
//! | 2 | `Neolithic` | |
//! | 3 | `Medieval` | |
//! | 4 | `Industrial` | |
//! | 5 | `Spacer` | |
//! | 6 | `Ultra` | |
//! | 7 | `Archotech` | Highest ranked tier |
//!
//! ```
//! use techgate_logic::tier::Tier;
//!
//! assert_eq!(Tier::Medieval.offset(1), Tier::Industrial);
//! assert_eq!(Tier::Ultra.offset(5), Tier::Archotech);
//! assert!(Tier::Spacer > Tier::Industrial);
//! ```

use serde::{Deserialize, Serialize};

/// Technology tier, totally ordered by its numeric index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Tier {
    #[default]
    Undefined = 0,
    Animal = 1,
    Neolithic = 2,
    Medieval = 3,
    Industrial = 4,
    Spacer = 5,
    Ultra = 6,
    Archotech = 7,
}

impl Tier {
    /// All tiers, lowest first, including the sentinel.
    pub const ALL: [Tier; 8] = [
        Tier::Undefined,
        Tier::Animal,
        Tier::Neolithic,
        Tier::Medieval,
        Tier::Industrial,
        Tier::Spacer,
        Tier::Ultra,
        Tier::Archotech,
    ];

    /// Ranked tiers (everything except `Undefined`), lowest first.
    pub const RANKED: [Tier; 7] = [
        Tier::Animal,
        Tier::Neolithic,
        Tier::Medieval,
        Tier::Industrial,
        Tier::Spacer,
        Tier::Ultra,
        Tier::Archotech,
    ];

    /// Lowest ranked tier. Progress scans that find nothing land here.
    pub const FLOOR: Tier = Tier::Animal;

    /// Highest ranked tier.
    pub const CEILING: Tier = Tier::Archotech;

    /// Numeric index (0–7).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Tier for a numeric index, or `None` if out of range.
    pub fn from_index(index: u8) -> Option<Tier> {
        Tier::ALL.get(index as usize).copied()
    }

    /// Shift by `steps` tiers, saturating at `Undefined` and `Archotech`.
    pub fn offset(self, steps: i8) -> Tier {
        let shifted = (self.index() as i16 + steps as i16).clamp(0, Tier::CEILING.index() as i16);
        Tier::ALL[shifted as usize]
    }

    /// Ranked tiers from highest to lowest.
    pub fn descending() -> impl Iterator<Item = Tier> {
        Tier::RANKED.into_iter().rev()
    }

    /// Whether this is the "not computed" sentinel.
    pub fn is_undefined(self) -> bool {
        self == Tier::Undefined
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Undefined => "undefined",
            Tier::Animal => "animal",
            Tier::Neolithic => "neolithic",
            Tier::Medieval => "medieval",
            Tier::Industrial => "industrial",
            Tier::Spacer => "spacer",
            Tier::Ultra => "ultra",
            Tier::Archotech => "archotech",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
