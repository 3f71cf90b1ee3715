//! Eye-closure / blink / sleepy detection
//!
//! Works on the Eye Aspect Ratio averaged across both eyes, smoothed
//! over a short window. The first window of samples calibrates the
//! subject's resting EAR; afterwards the baseline drifts slowly so the
//! closed threshold follows the subject rather than a fixed constant.

use crate::{DetectorSignal, DmsConfig, DriverMetrics, FatigueEvent, FatigueKind};
use clock::Clock;
use face_geometry::{average_ear, FaceObservation};
use tracing::debug;

/// Closed-duration scale for severity (seconds).
const SEVERITY_DURATION_SCALE: f32 = 5.0;
/// Episode-count scale for the severity boost.
const SEVERITY_COUNT_SCALE: f32 = 10.0;

pub struct EyeClosureDetector {
    config: DmsConfig,
}

impl EyeClosureDetector {
    pub fn new(config: DmsConfig) -> Self {
        Self { config }
    }

    /// Process one frame's eye landmarks.
    ///
    /// Emits at most one `Sleepy` event per frame; blink counting and
    /// sleepy recovery happen on the closed-to-open transition.
    pub fn process(
        &self,
        metrics: &mut DriverMetrics,
        face: &FaceObservation,
        clock: &dyn Clock,
    ) -> Vec<DetectorSignal> {
        let (Some(left), Some(right)) = (face.left_eye.as_ref(), face.right_eye.as_ref()) else {
            return Vec::new();
        };
        let Some(sample) = average_ear(left, right) else {
            return Vec::new();
        };

        let working = metrics.push_ear_sample(sample, self.config.baseline_alpha);
        if !metrics.calibrated {
            return Vec::new();
        }

        let now = clock.now();
        let closed = working < metrics.baseline_ear * self.config.ear_closed_fraction;
        let mut signals = Vec::new();

        if closed {
            if !metrics.eyes_closed {
                metrics.eyes_closed = true;
                metrics.closure_start = Some(now);
            } else if let Some(start) = metrics.closure_start {
                let elapsed = (now - start).as_secs_f32();
                if elapsed >= self.config.sleepy_hold_secs && self.debounced(metrics, now) {
                    metrics.sleepy_count += 1;
                    metrics.last_sleepy = Some(now);

                    let severity = ((elapsed / SEVERITY_DURATION_SCALE).min(1.0)
                        + (metrics.sleepy_count as f32 / SEVERITY_COUNT_SCALE).min(1.0))
                    .min(1.0);

                    debug!(
                        elapsed_secs = elapsed,
                        count = metrics.sleepy_count,
                        severity,
                        "sleepy episode detected"
                    );
                    signals.push(DetectorSignal::Event(FatigueEvent {
                        kind: FatigueKind::Sleepy,
                        severity,
                        forward: true,
                    }));
                }
            }
        } else if metrics.eyes_closed {
            metrics.eyes_closed = false;
            if let Some(start) = metrics.closure_start.take() {
                let duration = (now - start).as_secs_f32();
                if duration < self.config.sleepy_hold_secs {
                    metrics.blink_count += 1;
                } else {
                    // Reopening after a sleepy-length closure counts as
                    // recovery for any open sleepy interventions.
                    signals.push(DetectorSignal::Recovery {
                        kind: FatigueKind::Sleepy,
                    });
                }
            }
        }

        signals
    }

    fn debounced(&self, metrics: &DriverMetrics, now: std::time::Instant) -> bool {
        metrics
            .last_sleepy
            .map_or(true, |t| (now - t).as_secs_f32() >= self.config.sleepy_debounce_secs)
    }
}
