//! Pure research-gating logic for TechGate.
//!
//! This crate decides which research requirement gates each craftable item
//! and whether that item is usable at the operator's current tech level.
//! It is independent of any game engine: the host supplies a definition
//! snapshot and asks yes/no questions, making everything unit-testable
//! and portable across mod loaders, headless harnesses, and tools.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assignment`] | Bidirectional item ↔ requirement index, built from inference + policy |
//! | [`definitions`] | Definition snapshot: items, requirements, facilities, production rules |
//! | [`error`] | Snapshot loading and gate query errors |
//! | [`gate`] | Session gate: locked / unlocked decisions per item and actor |
//! | [`inference`] | Cascading heuristics that pick one requirement per rule |
//! | [`policy`] | Overrides, forced assignments, and exemptions |
//! | [`progress`] | Aggregate tier strategies and the session cache |
//! | [`settings`] | Player-facing gating settings and validation |
//! | [`storage`] | Storage-rack compatibility filter |
//! | [`strata`] | Tier classifier for all known requirements |
//! | [`tier`] | Ordered tech tiers with saturating offsets |

pub mod assignment;
pub mod definitions;
pub mod error;
pub mod gate;
pub mod inference;
pub mod policy;
pub mod progress;
pub mod settings;
pub mod storage;
pub mod strata;
pub mod tier;
