//! Selection and effectiveness scoring

use crate::catalog::{Catalog, InterventionDef, InterventionType};
use crate::profile::{DriverProfile, InterventionRecord};
use crate::{SCORE_MAX, SCORE_MIN};
use clock::Clock;
use dms::FatigueKind;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Base score adjustment per resolution.
const BASE_ADJUST: f64 = 0.1;
/// Extra credit for recoveries faster than this (seconds).
const FAST_RESPONSE_SECS: f32 = 2.0;
const FAST_BONUS: f64 = 0.05;
/// Deduction for recoveries slower than this (seconds).
const SLOW_RESPONSE_SECS: f32 = 5.0;
const SLOW_PENALTY: f64 = 0.03;

/// Occurrence-count escalation breakpoints.
const COUNT_RAISE_AT: u32 = 3;
const COUNT_FORCE_AT: u32 = 7;
/// Severity escalation breakpoints.
const SEVERITY_RAISE_AT: f32 = 0.6;
const SEVERITY_FORCE_AT: f32 = 0.8;

/// Compute the escalation level (1-3) for an event.
///
/// Occurrence count raises the floor; severity can force the top tier
/// outright.
pub fn escalation_level(occurrences: u32, severity: f32) -> u8 {
    let mut level = 1u8;

    if occurrences >= COUNT_FORCE_AT {
        level = 3;
    } else if occurrences >= COUNT_RAISE_AT {
        level = level.max(2);
    }

    if severity >= SEVERITY_FORCE_AT {
        level = 3;
    } else if severity >= SEVERITY_RAISE_AT {
        level = level.max(2);
    }

    level
}

/// The engine's answer: what to deliver. Delivery itself is the
/// caller's job.
#[derive(Debug, Clone)]
pub struct SelectedIntervention {
    pub intervention: InterventionType,
    pub level: u8,
    pub message: String,
}

struct OpenIntervention {
    kind: FatigueKind,
    intervention: InterventionType,
    history_index: usize,
    delivered_at: Instant,
}

/// Intervention selection plus effectiveness learning.
///
/// Logically single-threaded per driver: the orchestrator owns it and
/// the profile together.
pub struct InterventionEngine {
    catalog: Catalog,
    clock: Arc<dyn Clock>,
    session_id: Uuid,
    open: Vec<OpenIntervention>,
}

impl InterventionEngine {
    pub fn new(catalog: Catalog, clock: Arc<dyn Clock>, session_id: Uuid) -> Self {
        Self {
            catalog,
            clock,
            session_id,
            open: Vec::new(),
        }
    }

    /// Pick an intervention for an event and append the open record to
    /// the profile history.
    ///
    /// `preauthored` carries externally generated advisory text and is
    /// used verbatim when present.
    pub fn select(
        &mut self,
        profile: &mut DriverProfile,
        kind: FatigueKind,
        severity: f32,
        preauthored: Option<&str>,
    ) -> SelectedIntervention {
        let occurrences = profile.record_event(kind);

        let def = match kind {
            // Single-purpose kinds map straight to their catalog entry.
            FatigueKind::NoFace => self.dedicated(InterventionType::NoFaceAlert),
            FatigueKind::Coaching => self.dedicated(InterventionType::Coaching),
            _ => {
                let level = escalation_level(occurrences, severity);
                self.best_for_level(profile, level)
            }
        };

        let message = match preauthored {
            Some(text) => text.to_string(),
            None => def
                .messages
                .choose(&mut rand::thread_rng())
                .map(|m| (*m).to_string())
                .unwrap_or_default(),
        };

        let record = InterventionRecord {
            event_kind: kind,
            intervention: def.itype,
            message: message.clone(),
            timestamp: self.clock.wall_now(),
            severity,
            response_secs: None,
            effective: None,
            session_id: self.session_id,
        };

        let selected = SelectedIntervention {
            intervention: def.itype,
            level: def.level,
            message,
        };

        self.open.push(OpenIntervention {
            kind,
            intervention: def.itype,
            history_index: profile.history.len(),
            delivered_at: self.clock.now(),
        });
        profile.history.push(record);

        info!(
            event = %kind,
            intervention = %selected.intervention,
            level = selected.level,
            occurrences,
            severity,
            "intervention selected"
        );
        selected
    }

    /// Resolve every open intervention of the given event kind against
    /// an observed outcome, updating effectiveness scores and the
    /// late-bound record fields. Returns how many records resolved.
    pub fn resolve(&mut self, profile: &mut DriverProfile, kind: FatigueKind, effective: bool) -> usize {
        let now = self.clock.now();
        let mut resolved = 0;

        let mut remaining = Vec::with_capacity(self.open.len());
        for open in self.open.drain(..) {
            if open.kind != kind {
                remaining.push(open);
                continue;
            }

            let response_secs = (now - open.delivered_at).as_secs_f32();
            let mut adjust = if effective { BASE_ADJUST } else { -BASE_ADJUST };
            if effective && response_secs < FAST_RESPONSE_SECS {
                adjust += FAST_BONUS;
            }
            if effective && response_secs > SLOW_RESPONSE_SECS {
                adjust -= SLOW_PENALTY;
            }

            let previous = profile.score_or(
                open.intervention,
                self.catalog.default_score(open.intervention),
            );
            let score = (previous + adjust).clamp(SCORE_MIN, SCORE_MAX);
            profile.set_score(open.intervention, score);

            if let Some(record) = profile.history.get_mut(open.history_index) {
                record.response_secs = Some(response_secs);
                record.effective = Some(effective);
            }
            if effective {
                profile.recovery.observe(response_secs);
            }

            debug!(
                event = %kind,
                intervention = %open.intervention,
                effective,
                response_secs,
                score,
                "intervention resolved"
            );
            resolved += 1;
        }
        self.open = remaining;

        resolved
    }

    /// Open (unresolved) intervention count.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    fn dedicated(&self, itype: InterventionType) -> InterventionDef {
        // The built-in catalog always carries both dedicated entries; a
        // custom catalog without them degrades to the level-1 fallback.
        self.catalog
            .by_type(itype)
            .cloned()
            .unwrap_or_else(|| InterventionDef {
                itype,
                level: 1,
                messages: &[],
                default_score: 0.5,
            })
    }

    /// Highest-scoring entry among the eligible set for a level.
    fn best_for_level(&self, profile: &DriverProfile, level: u8) -> InterventionDef {
        let exact = self.catalog.at_level(level);
        let eligible = if exact.is_empty() {
            self.catalog.up_to_level(level)
        } else {
            exact
        };

        let mut best: Option<(&InterventionDef, f64)> = None;
        for def in eligible {
            // Dedicated single-purpose entries never compete in
            // escalation-based selection.
            if matches!(
                def.itype,
                InterventionType::NoFaceAlert | InterventionType::Coaching
            ) {
                continue;
            }
            let score = profile.score_or(def.itype, def.default_score);
            // Strict comparison keeps catalog order on ties.
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((def, score));
            }
        }

        match best {
            Some((def, _)) => def.clone(),
            // Empty catalog: synthesize a mild default so selection
            // still answers.
            None => InterventionDef {
                itype: InterventionType::AudioMild,
                level: 1,
                messages: &[],
                default_score: 0.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;
    use proptest::prelude::*;

    fn engine_with_clock() -> (InterventionEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let engine = InterventionEngine::new(
            Catalog::builtin(),
            clock.clone() as Arc<dyn Clock>,
            Uuid::new_v4(),
        );
        (engine, clock)
    }

    #[test]
    fn level_computation_follows_count_and_severity() {
        assert_eq!(escalation_level(1, 0.3), 1);
        assert_eq!(escalation_level(3, 0.3), 2);
        assert_eq!(escalation_level(6, 0.3), 2);
        assert_eq!(escalation_level(7, 0.3), 3);
        assert_eq!(escalation_level(1, 0.6), 2);
        assert_eq!(escalation_level(1, 0.85), 3);
        // Severity forces the top tier regardless of count.
        assert_eq!(escalation_level(1, 0.8), 3);
    }

    #[test]
    fn level_two_picks_highest_scoring_eligible() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");
        profile.set_score(InterventionType::AudioMild, 0.5);
        profile.set_score(InterventionType::AudioModerate, 0.6);

        // Severity 0.6 raises to level 2; only AudioModerate sits there.
        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.6, None);
        assert_eq!(selected.intervention, InterventionType::AudioModerate);
        assert_eq!(selected.level, 2);
    }

    #[test]
    fn high_severity_forces_level_three() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.85, None);
        assert_eq!(selected.intervention, InterventionType::AudioUrgent);
        assert_eq!(selected.level, 3);
    }

    #[test]
    fn repeat_occurrences_escalate() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let mut last = None;
        for _ in 0..7 {
            last = Some(engine.select(&mut profile, FatigueKind::Yawn, 0.3, None));
        }
        // Seventh lifetime occurrence forces level 3.
        assert_eq!(last.unwrap().level, 3);
    }

    #[test]
    fn missing_level_falls_back_to_lower_tiers() {
        let defs = vec![
            InterventionDef {
                itype: InterventionType::AudioMild,
                level: 1,
                messages: &["m"],
                default_score: 0.5,
            },
            InterventionDef {
                itype: InterventionType::VisualCue,
                level: 1,
                messages: &["v"],
                default_score: 0.5,
            },
        ];
        let clock = Arc::new(ManualClock::new());
        let mut engine =
            InterventionEngine::new(Catalog::new(defs), clock as Arc<dyn Clock>, Uuid::new_v4());
        let mut profile = DriverProfile::new("d1");
        profile.set_score(InterventionType::VisualCue, 0.8);

        // Level 2 computed, nothing at level 2: both level-1 entries
        // are eligible and the higher-scoring one wins.
        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.6, None);
        assert_eq!(selected.intervention, InterventionType::VisualCue);
    }

    #[test]
    fn ties_break_by_catalog_order() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");
        // AudioMild and VisualCue both default to 0.5 at level 1.
        let selected = engine.select(&mut profile, FatigueKind::Yawn, 0.3, None);
        assert_eq!(selected.intervention, InterventionType::AudioMild);
    }

    #[test]
    fn no_face_uses_the_dedicated_entry() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        // Severity high enough to escalate, but dedicated kinds bypass.
        let selected = engine.select(&mut profile, FatigueKind::NoFace, 0.9, None);
        assert_eq!(selected.intervention, InterventionType::NoFaceAlert);
    }

    #[test]
    fn coaching_uses_preauthored_text_verbatim() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(
            &mut profile,
            FatigueKind::Coaching,
            0.6,
            Some("Take a ten-minute break at the next stop."),
        );
        assert_eq!(selected.intervention, InterventionType::Coaching);
        assert_eq!(selected.message, "Take a ten-minute break at the next stop.");
        assert_eq!(profile.history[0].message, selected.message);
    }

    #[test]
    fn chosen_message_comes_from_the_catalog_set() {
        let (mut engine, _clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        let def = Catalog::builtin();
        let def = def.by_type(selected.intervention).unwrap();
        assert!(def.messages.contains(&selected.message.as_str()));
    }

    #[test]
    fn effective_resolution_raises_the_score() {
        let (mut engine, clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        clock.advance_secs(3.0);
        let resolved = engine.resolve(&mut profile, FatigueKind::Sleepy, true);

        assert_eq!(resolved, 1);
        let score = profile.score_or(selected.intervention, 0.0);
        assert!((score - 0.6).abs() < 1e-9, "0.5 + 0.1 expected, got {score}");

        let record = &profile.history[0];
        assert_eq!(record.effective, Some(true));
        assert!((record.response_secs.unwrap() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn fast_recovery_earns_a_bonus() {
        let (mut engine, clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        clock.advance_secs(1.0);
        engine.resolve(&mut profile, FatigueKind::Sleepy, true);

        let score = profile.score_or(selected.intervention, 0.0);
        assert!((score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn slow_recovery_pays_a_penalty() {
        let (mut engine, clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        clock.advance_secs(8.0);
        engine.resolve(&mut profile, FatigueKind::Sleepy, true);

        let score = profile.score_or(selected.intervention, 0.0);
        assert!((score - 0.57).abs() < 1e-9, "0.5 + 0.1 - 0.03 expected");
    }

    #[test]
    fn ineffective_resolution_lowers_the_score() {
        let (mut engine, clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        let selected = engine.select(&mut profile, FatigueKind::HeadTurn, 0.3, None);
        clock.advance_secs(1.0);
        engine.resolve(&mut profile, FatigueKind::HeadTurn, false);

        // No fast bonus on ineffective outcomes.
        let score = profile.score_or(selected.intervention, 0.0);
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn one_recovery_resolves_all_open_records_of_the_kind() {
        let (mut engine, clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        clock.advance_secs(4.0);
        engine.select(&mut profile, FatigueKind::Sleepy, 0.5, None);
        engine.select(&mut profile, FatigueKind::Yawn, 0.4, None);
        clock.advance_secs(1.0);

        let resolved = engine.resolve(&mut profile, FatigueKind::Sleepy, true);
        assert_eq!(resolved, 2);
        assert_eq!(engine.open_count(), 1, "yawn record must stay open");
        assert!(profile.history[0].effective.is_some());
        assert!(profile.history[1].effective.is_some());
        assert!(profile.history[2].effective.is_none());
    }

    #[test]
    fn recovery_stats_only_count_effective_outcomes() {
        let (mut engine, clock) = engine_with_clock();
        let mut profile = DriverProfile::new("d1");

        engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        clock.advance_secs(1.0);
        engine.resolve(&mut profile, FatigueKind::Sleepy, false);
        assert_eq!(profile.recovery.count, 0);

        engine.select(&mut profile, FatigueKind::Sleepy, 0.3, None);
        clock.advance_secs(1.5);
        engine.resolve(&mut profile, FatigueKind::Sleepy, true);
        assert_eq!(profile.recovery.count, 1);
    }

    proptest! {
        #[test]
        fn scores_stay_clamped_under_any_outcome_sequence(
            outcomes in proptest::collection::vec(any::<bool>(), 1..60),
            delays in proptest::collection::vec(0.1f64..10.0, 1..60),
        ) {
            let (mut engine, clock) = engine_with_clock();
            let mut profile = DriverProfile::new("d1");

            for (outcome, delay) in outcomes.iter().zip(delays.iter().cycle()) {
                engine.select(&mut profile, FatigueKind::Sleepy, 0.5, None);
                clock.advance_secs(*delay);
                engine.resolve(&mut profile, FatigueKind::Sleepy, *outcome);
            }

            for score in profile.scores.values() {
                prop_assert!(*score >= SCORE_MIN && *score <= SCORE_MAX);
            }
        }
    }
}
