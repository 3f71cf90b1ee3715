//! Face-presence tracking
//!
//! Driven once per detection cycle with an authoritative "any face
//! seen" flag. Alerting is gated both by a continuous-absence
//! threshold and by a cooldown that deliberately survives brief
//! reappearances: the last-alert timestamp is never cleared on
//! reacquisition, only the loss timer and the alerted flag are.

use crate::{DetectorSignal, DmsConfig, DriverMetrics, FatigueEvent, FatigueKind};
use clock::Clock;
use tracing::debug;

/// Severity reaches 1.0 at this multiple of the absence threshold.
const SEVERITY_SPAN_FACTOR: f32 = 1.5;

pub struct PresenceTracker {
    config: DmsConfig,
}

impl PresenceTracker {
    pub fn new(config: DmsConfig) -> Self {
        Self { config }
    }

    pub fn process(
        &self,
        metrics: &mut DriverMetrics,
        face_present: bool,
        clock: &dyn Clock,
    ) -> Vec<DetectorSignal> {
        let now = clock.now();
        let mut signals = Vec::new();

        if !face_present {
            match metrics.face_lost_at {
                None => metrics.face_lost_at = Some(now),
                Some(lost_at) => {
                    let duration = (now - lost_at).as_secs_f32();
                    if duration >= self.config.face_lost_secs && self.cooled_down(metrics, now) {
                        let severity = (duration
                            / (self.config.face_lost_secs * SEVERITY_SPAN_FACTOR))
                            .min(1.0);
                        metrics.no_face_alerted = true;
                        metrics.last_no_face_alert = Some(now);

                        debug!(duration_secs = duration, severity, "face absent");
                        signals.push(DetectorSignal::Event(FatigueEvent {
                            kind: FatigueKind::NoFace,
                            severity,
                            forward: true,
                        }));
                    }
                }
            }
        } else {
            if metrics.no_face_alerted {
                signals.push(DetectorSignal::Recovery {
                    kind: FatigueKind::NoFace,
                });
            }
            metrics.face_lost_at = None;
            metrics.no_face_alerted = false;
        }

        signals
    }

    fn cooled_down(&self, metrics: &DriverMetrics, now: std::time::Instant) -> bool {
        metrics
            .last_no_face_alert
            .map_or(true, |t| (now - t).as_secs_f32() >= self.config.no_face_cooldown_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;

    fn no_face_events(signals: &[DetectorSignal]) -> usize {
        signals
            .iter()
            .filter(|s| {
                matches!(
                    s,
                    DetectorSignal::Event(FatigueEvent { kind: FatigueKind::NoFace, .. })
                )
            })
            .count()
    }

    /// Drive the tracker once per second for `secs` cycles.
    fn run(
        tracker: &PresenceTracker,
        metrics: &mut DriverMetrics,
        clock: &ManualClock,
        present: bool,
        secs: usize,
    ) -> usize {
        let mut fired = 0;
        for _ in 0..secs {
            clock.advance_secs(1.0);
            fired += no_face_events(&tracker.process(metrics, present, clock));
        }
        fired
    }

    #[test]
    fn short_absence_stays_silent() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        assert_eq!(run(&tracker, &mut metrics, &clock, false, 14), 0);
    }

    #[test]
    fn sustained_absence_fires_after_threshold() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        let fired = run(&tracker, &mut metrics, &clock, false, 16);
        assert_eq!(fired, 1);
        assert!(metrics.no_face_alerted);
    }

    #[test]
    fn refire_waits_out_the_cooldown() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        // Continuous absence: first alert at 15s, next no earlier
        // than 10s later.
        let mut times = Vec::new();
        for _ in 0..40 {
            clock.advance_secs(1.0);
            if no_face_events(&tracker.process(&mut metrics, false, &clock)) > 0 {
                times.push(clock.now());
            }
        }

        assert!(times.len() >= 2);
        for pair in times.windows(2) {
            assert!((pair[1] - pair[0]).as_secs_f32() >= 10.0);
        }
    }

    #[test]
    fn cooldown_survives_brief_reappearance() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        assert_eq!(run(&tracker, &mut metrics, &clock, false, 16), 1);

        // Face flickers back for one cycle; alerted flag clears but
        // the cooldown timestamp must not.
        run(&tracker, &mut metrics, &clock, true, 1);
        assert!(!metrics.no_face_alerted);
        assert!(metrics.last_no_face_alert.is_some());
        assert!(metrics.face_lost_at.is_none());
    }

    #[test]
    fn reacquisition_after_alert_reports_recovery() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        run(&tracker, &mut metrics, &clock, false, 16);

        clock.advance_secs(1.0);
        let signals = tracker.process(&mut metrics, true, &clock);
        assert!(signals
            .iter()
            .any(|s| matches!(s, DetectorSignal::Recovery { kind: FatigueKind::NoFace })));
    }

    #[test]
    fn reacquisition_without_alert_is_silent() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        run(&tracker, &mut metrics, &clock, false, 5);
        clock.advance_secs(1.0);
        let signals = tracker.process(&mut metrics, true, &clock);
        assert!(signals.is_empty());
    }

    #[test]
    fn severity_scales_with_absence_duration() {
        let tracker = PresenceTracker::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        let mut severities = Vec::new();
        for _ in 0..40 {
            clock.advance_secs(1.0);
            for signal in tracker.process(&mut metrics, false, &clock) {
                if let DetectorSignal::Event(e) = signal {
                    severities.push(e.severity);
                }
            }
        }

        assert!(severities.len() >= 2);
        assert!(severities[0] < severities[1]);
        assert!(severities.iter().all(|s| *s <= 1.0));
    }
}
