//! Head-turn distraction detection
//!
//! Driven by the provider's head yaw estimate. A sustained turn
//! re-fires on a fixed period for as long as it lasts; the internal
//! timer resets on every emission.

use crate::{DetectorSignal, DmsConfig, DriverMetrics, FatigueEvent, FatigueKind};
use clock::Clock;
use face_geometry::FaceObservation;
use tracing::debug;

pub struct HeadTurnDetector {
    config: DmsConfig,
}

impl HeadTurnDetector {
    pub fn new(config: DmsConfig) -> Self {
        Self { config }
    }

    pub fn process(
        &self,
        metrics: &mut DriverMetrics,
        face: &FaceObservation,
        clock: &dyn Clock,
    ) -> Vec<DetectorSignal> {
        let Some(yaw) = face.yaw_degrees else {
            return Vec::new();
        };

        let now = clock.now();
        let turned = yaw.abs() > self.config.head_yaw_degrees;
        let mut signals = Vec::new();

        if turned {
            if !metrics.head_turned {
                metrics.head_turned = true;
                metrics.head_turn_start = Some(now);
            } else if let Some(start) = metrics.head_turn_start {
                let elapsed = (now - start).as_secs_f32();
                if elapsed >= self.config.head_refire_secs {
                    let severity = (elapsed / self.config.head_refire_secs).min(1.0);
                    debug!(yaw, elapsed_secs = elapsed, "sustained head turn");
                    signals.push(DetectorSignal::Event(FatigueEvent {
                        kind: FatigueKind::HeadTurn,
                        severity,
                        forward: true,
                    }));
                    // Restart the period so a continuous turn re-fires.
                    metrics.head_turn_start = Some(now);
                }
            }
        } else if metrics.head_turned {
            metrics.head_turned = false;
            metrics.head_turn_start = None;
            signals.push(DetectorSignal::Recovery {
                kind: FatigueKind::HeadTurn,
            });
        }

        signals
    }
}
