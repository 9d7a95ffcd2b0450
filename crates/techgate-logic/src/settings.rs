//! Gating settings, as exposed on the host's mod-settings screen.
//!
//! The host owns the UI; this module owns the data model, its defaults,
//! validation, and how the two strategy toggles collapse into a single
//! [`ProgressStrategy`].
//!
//! ```
//! use techgate_logic::settings::{GateSettings, validate_settings};
//! use techgate_logic::progress::ProgressStrategy;
//!
//! let mut settings = GateSettings::default();
//! settings.use_percent_finished = true;
//! settings.percent_threshold = 0.6;
//! assert!(validate_settings(&settings).is_empty());
//! assert_eq!(settings.strategy(), ProgressStrategy::PercentFinished { threshold: 0.6 });
//! ```

use serde::{Deserialize, Serialize};

use crate::progress::ProgressStrategy;
use crate::tier::Tier;

/// Player-editable gating configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Relative mode: lock anything more than `tier_offset` tiers above the
    /// operator. When false, absolute mode uses `min_tier_to_restrict`.
    pub restrict_on_tier: bool,
    /// How many tiers ahead of the operator stay usable (relative mode).
    pub tier_offset: i8,
    /// Lowest tier that is locked (absolute mode).
    pub min_tier_to_restrict: Tier,
    /// Derive progress from the highest tier with finished research.
    pub use_highest_finished: bool,
    /// Derive progress from the share of finished research per tier.
    pub use_percent_finished: bool,
    /// Share (0.0–1.0) needed by the percent strategy.
    pub percent_threshold: f32,
    /// Keep items locked even after their requirement is finished.
    pub lock_even_if_finished: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            restrict_on_tier: true,
            tier_offset: 0,
            min_tier_to_restrict: Tier::Spacer,
            use_highest_finished: false,
            use_percent_finished: false,
            percent_threshold: 0.5,
            lock_even_if_finished: false,
        }
    }
}

impl GateSettings {
    /// Collapse the two toggles into a strategy.
    ///
    /// Highest-finished wins if both are set; neither means faction default.
    pub fn strategy(&self) -> ProgressStrategy {
        match (self.use_highest_finished, self.use_percent_finished) {
            (true, percent) => {
                if percent {
                    log::warn!("both progress strategies enabled; using highest-finished");
                }
                ProgressStrategy::HighestFinished
            }
            (false, true) => ProgressStrategy::PercentFinished {
                threshold: self.percent_threshold,
            },
            (false, false) => ProgressStrategy::FactionDefault,
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Threshold outside 0.0–1.0 or not finite.
    ThresholdOutOfRange(f32),
    /// Both strategy toggles are on.
    ConflictingStrategies,
    /// Absolute mode with the sentinel tier would lock everything.
    UndefinedMinTier,
}

/// Validate settings, returning all errors found.
pub fn validate_settings(settings: &GateSettings) -> Vec<SettingsError> {
    let mut errors = Vec::new();

    if !settings.percent_threshold.is_finite()
        || !(0.0..=1.0).contains(&settings.percent_threshold)
    {
        errors.push(SettingsError::ThresholdOutOfRange(
            settings.percent_threshold,
        ));
    }
    if settings.use_highest_finished && settings.use_percent_finished {
        errors.push(SettingsError::ConflictingStrategies);
    }
    if !settings.restrict_on_tier && settings.min_tier_to_restrict.is_undefined() {
        errors.push(SettingsError::UndefinedMinTier);
    }

    errors
}
