//! Yawn detection
//!
//! A yawn is a mouth-open ratio (lip gap over face box height) held
//! above threshold for the hold time. One event fires per episode;
//! isolated yawns are recorded but only forwarded to the intervention
//! engine once the cumulative count reaches the forwarding threshold.

use crate::{DetectorSignal, DmsConfig, DriverMetrics, FatigueEvent, FatigueKind};
use clock::Clock;
use face_geometry::{mouth_open_ratio, FaceObservation};
use tracing::debug;

pub struct YawnDetector {
    config: DmsConfig,
}

impl YawnDetector {
    pub fn new(config: DmsConfig) -> Self {
        Self { config }
    }

    pub fn process(
        &self,
        metrics: &mut DriverMetrics,
        face: &FaceObservation,
        clock: &dyn Clock,
    ) -> Vec<DetectorSignal> {
        let Some(mouth) = face.mouth.as_ref() else {
            return Vec::new();
        };
        let Some(ratio) = mouth_open_ratio(mouth, face.bbox.height) else {
            return Vec::new();
        };

        let now = clock.now();
        let mut signals = Vec::new();

        if ratio > self.config.mouth_open_ratio {
            if !metrics.mouth_open {
                metrics.mouth_open = true;
                metrics.mouth_open_start = Some(now);
                metrics.yawn_flagged = false;
            } else if !metrics.yawn_flagged {
                if let Some(start) = metrics.mouth_open_start {
                    let elapsed = (now - start).as_secs_f32();
                    if elapsed >= self.config.yawn_hold_secs {
                        metrics.yawn_flagged = true;
                        metrics.yawn_count += 1;

                        let severity = (0.4 + metrics.yawn_count as f32 * 0.1).min(0.9);
                        let forward = metrics.yawn_count >= self.config.yawn_forward_threshold;
                        if !forward {
                            debug!(count = metrics.yawn_count, "isolated yawn, not forwarding");
                        }

                        signals.push(DetectorSignal::Event(FatigueEvent {
                            kind: FatigueKind::Yawn,
                            severity,
                            forward,
                        }));
                    }
                }
            }
        } else if metrics.mouth_open {
            metrics.mouth_open = false;
            metrics.mouth_open_start = None;
            if metrics.yawn_flagged {
                signals.push(DetectorSignal::Recovery {
                    kind: FatigueKind::Yawn,
                });
            }
            metrics.yawn_flagged = false;
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;
    use face_geometry::{FaceBox, MouthLandmarks, Point};

    /// Face box height 300; a 45 px lip gap gives ratio 0.15.
    fn face_with_lip_gap(gap: f32) -> FaceObservation {
        FaceObservation {
            bbox: FaceBox { x: 0.0, y: 0.0, width: 240.0, height: 300.0 },
            left_eye: None,
            right_eye: None,
            mouth: Some(MouthLandmarks {
                top: Point::new(120.0, 150.0),
                bottom: Point::new(120.0, 150.0 + gap),
            }),
            yaw_degrees: None,
        }
    }

    fn yawn_events(signals: &[DetectorSignal]) -> Vec<FatigueEvent> {
        signals
            .iter()
            .filter_map(|s| match s {
                DetectorSignal::Event(e) if e.kind == FatigueKind::Yawn => Some(*e),
                _ => None,
            })
            .collect()
    }

    fn run_episode(
        detector: &YawnDetector,
        metrics: &mut DriverMetrics,
        clock: &ManualClock,
        open_frames: usize,
    ) -> Vec<DetectorSignal> {
        let mut all = Vec::new();
        for _ in 0..open_frames {
            clock.advance_secs(0.1);
            all.extend(detector.process(metrics, &face_with_lip_gap(45.0), clock));
        }
        clock.advance_secs(0.1);
        all.extend(detector.process(metrics, &face_with_lip_gap(5.0), clock));
        all
    }

    #[test]
    fn held_open_mouth_emits_one_yawn() {
        let detector = YawnDetector::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        // 1.6 s above threshold, then close.
        let signals = run_episode(&detector, &mut metrics, &clock, 16);
        let events = yawn_events(&signals);

        assert_eq!(events.len(), 1);
        assert_eq!(metrics.yawn_count, 1);
        assert!((events[0].severity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn first_two_yawns_are_not_forwarded() {
        let detector = YawnDetector::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        let first = yawn_events(&run_episode(&detector, &mut metrics, &clock, 16));
        let second = yawn_events(&run_episode(&detector, &mut metrics, &clock, 16));
        let third = yawn_events(&run_episode(&detector, &mut metrics, &clock, 16));

        assert!(!first[0].forward);
        assert!(!second[0].forward);
        assert!(third[0].forward, "third cumulative yawn must be forwarded");
        assert_eq!(metrics.yawn_count, 3);
    }

    #[test]
    fn short_opening_is_not_a_yawn() {
        let detector = YawnDetector::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        let signals = run_episode(&detector, &mut metrics, &clock, 5);
        assert!(yawn_events(&signals).is_empty());
        assert_eq!(metrics.yawn_count, 0);
        // No recovery either: nothing was flagged.
        assert!(!signals
            .iter()
            .any(|s| matches!(s, DetectorSignal::Recovery { .. })));
    }

    #[test]
    fn closing_after_flagged_yawn_reports_recovery() {
        let detector = YawnDetector::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        let signals = run_episode(&detector, &mut metrics, &clock, 20);
        assert!(signals
            .iter()
            .any(|s| matches!(s, DetectorSignal::Recovery { kind: FatigueKind::Yawn })));
        assert!(!metrics.mouth_open);
    }

    #[test]
    fn one_event_per_episode_even_when_held_long() {
        let detector = YawnDetector::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        // 6 s of continuous opening is still a single yawn.
        let signals = run_episode(&detector, &mut metrics, &clock, 60);
        assert_eq!(yawn_events(&signals).len(), 1);
    }

    #[test]
    fn severity_grows_with_count_and_caps() {
        let detector = YawnDetector::new(DmsConfig::default());
        let mut metrics = DriverMetrics::default();
        let clock = ManualClock::new();

        let mut last_severity = 0.0;
        for _ in 0..8 {
            let events = yawn_events(&run_episode(&detector, &mut metrics, &clock, 16));
            last_severity = events[0].severity;
        }
        assert!((last_severity - 0.9).abs() < 1e-6, "severity must cap at 0.9");
    }
}
