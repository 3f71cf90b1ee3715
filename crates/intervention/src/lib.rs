//! Adaptive Intervention Engine
//!
//! Given a fatigue event and the driver's learned profile, picks the
//! response most likely to work: escalation-level computation over
//! occurrence history and severity, then a per-driver effectiveness
//! lookup across the eligible catalog entries. Observed recoveries
//! feed back into the effectiveness scores.

mod catalog;
mod engine;
mod profile;

pub use catalog::{Catalog, InterventionDef, InterventionType};
pub use engine::{escalation_level, InterventionEngine, SelectedIntervention};
pub use profile::{DriverProfile, InterventionRecord, RecoveryStats};

/// Effectiveness scores are clamped to this range.
pub const SCORE_MIN: f64 = 0.1;
pub const SCORE_MAX: f64 = 0.9;
