//! Per-driver learned profile
//!
//! The persistence unit handed to the external store: occurrence
//! counts, per-intervention effectiveness scores, the append-only
//! intervention history, and recovery-time statistics. One document
//! per driver id, written wholesale after every mutation.

use crate::catalog::InterventionType;
use chrono::{DateTime, Utc};
use dms::FatigueKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One delivered intervention. Append-only except for the two
/// late-bound outcome fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionRecord {
    pub event_kind: FatigueKind,
    pub intervention: InterventionType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Severity of the triggering event, in [0, 1].
    pub severity: f32,
    /// Seconds from delivery to resolution. Filled when resolved.
    pub response_secs: Option<f32>,
    /// Whether the driver's corrective response was observed.
    pub effective: Option<bool>,
    pub session_id: Uuid,
}

/// Aggregate recovery timing over effective resolutions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryStats {
    pub count: u32,
    pub total_secs: f32,
    pub fastest_secs: Option<f32>,
    pub slowest_secs: Option<f32>,
}

impl RecoveryStats {
    pub fn observe(&mut self, response_secs: f32) {
        self.count += 1;
        self.total_secs += response_secs;
        self.fastest_secs = Some(
            self.fastest_secs
                .map_or(response_secs, |f| f.min(response_secs)),
        );
        self.slowest_secs = Some(
            self.slowest_secs
                .map_or(response_secs, |s| s.max(response_secs)),
        );
    }

    pub fn mean_secs(&self) -> Option<f32> {
        (self.count > 0).then(|| self.total_secs / self.count as f32)
    }
}

/// Per-driver profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    pub driver_id: String,
    /// Lifetime occurrence count per event kind.
    pub event_counts: HashMap<FatigueKind, u32>,
    /// Learned effectiveness per intervention type, in [0.1, 0.9].
    pub scores: HashMap<InterventionType, f64>,
    /// Append-only intervention log.
    pub history: Vec<InterventionRecord>,
    pub recovery: RecoveryStats,
}

impl DriverProfile {
    /// Fresh profile with defaults, created on first reference.
    pub fn new(driver_id: impl Into<String>) -> Self {
        Self {
            driver_id: driver_id.into(),
            event_counts: HashMap::new(),
            scores: HashMap::new(),
            history: Vec::new(),
            recovery: RecoveryStats::default(),
        }
    }

    /// Count this occurrence and return the new lifetime total.
    pub fn record_event(&mut self, kind: FatigueKind) -> u32 {
        let count = self.event_counts.entry(kind).or_insert(0);
        *count += 1;
        *count
    }

    pub fn event_count(&self, kind: FatigueKind) -> u32 {
        self.event_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Learned score for a type, or the supplied catalog default.
    pub fn score_or(&self, itype: InterventionType, default: f64) -> f64 {
        self.scores.get(&itype).copied().unwrap_or(default)
    }

    pub fn set_score(&mut self, itype: InterventionType, score: f64) {
        self.scores.insert(itype, score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_event_accumulates() {
        let mut profile = DriverProfile::new("driver-1");
        assert_eq!(profile.record_event(FatigueKind::Yawn), 1);
        assert_eq!(profile.record_event(FatigueKind::Yawn), 2);
        assert_eq!(profile.event_count(FatigueKind::Yawn), 2);
        assert_eq!(profile.event_count(FatigueKind::Sleepy), 0);
    }

    #[test]
    fn score_falls_back_to_default() {
        let mut profile = DriverProfile::new("driver-1");
        assert_eq!(profile.score_or(InterventionType::AudioMild, 0.5), 0.5);
        profile.set_score(InterventionType::AudioMild, 0.7);
        assert_eq!(profile.score_or(InterventionType::AudioMild, 0.5), 0.7);
    }

    #[test]
    fn recovery_stats_track_extremes() {
        let mut stats = RecoveryStats::default();
        stats.observe(4.0);
        stats.observe(1.0);
        stats.observe(7.0);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.fastest_secs, Some(1.0));
        assert_eq!(stats.slowest_secs, Some(7.0));
        assert!((stats.mean_secs().unwrap() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn profile_round_trips_through_json() {
        let mut profile = DriverProfile::new("driver-42");
        profile.record_event(FatigueKind::Sleepy);
        profile.record_event(FatigueKind::HeadTurn);
        profile.set_score(InterventionType::AudioModerate, 0.65);
        profile.history.push(InterventionRecord {
            event_kind: FatigueKind::Sleepy,
            intervention: InterventionType::AudioMild,
            message: "test".into(),
            timestamp: Utc::now(),
            severity: 0.4,
            response_secs: Some(1.2),
            effective: Some(true),
            session_id: Uuid::new_v4(),
        });
        profile.recovery.observe(1.2);

        let json = serde_json::to_string(&profile).unwrap();
        let restored: DriverProfile = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.driver_id, profile.driver_id);
        assert_eq!(restored.event_counts, profile.event_counts);
        assert_eq!(restored.scores, profile.scores);
        assert_eq!(restored.history.len(), profile.history.len());
        assert_eq!(restored.recovery.count, 1);
    }
}
