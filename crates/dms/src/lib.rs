//! Driver Monitoring System (DMS)
//!
//! Real-time fatigue-signal detection over per-frame facial geometry:
//! - Eye closure / blink / sleepy detection (EAR with calibration)
//! - Yawn detection (mouth-open ratio)
//! - Head-turn distraction detection (yaw angle)
//! - Face-presence tracking
//!
//! Detectors are pure decision logic over [`DriverMetrics`] plus one
//! frame's landmark data; each emits zero or more signals per frame
//! and never performs I/O. The orchestrator decides what to do with
//! the emitted events.

pub mod config;
pub mod eyes;
pub mod head;
pub mod metrics;
pub mod presence;
pub mod yawn;

pub use config::DmsConfig;
pub use eyes::EyeClosureDetector;
pub use head::HeadTurnDetector;
pub use metrics::DriverMetrics;
pub use presence::PresenceTracker;
pub use yawn::YawnDetector;

use clock::Clock;
use face_geometry::FaceObservation;
use serde::{Deserialize, Serialize};

/// Semantic fatigue/distraction signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FatigueKind {
    /// Prolonged eye closure.
    Sleepy,
    /// Sustained mouth opening.
    Yawn,
    /// Head turned away from the road.
    HeadTurn,
    /// No face visible to the camera.
    NoFace,
    /// Advisory text produced from the rolling event summary.
    Coaching,
}

impl FatigueKind {
    /// Stable identifier used in profiles and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueKind::Sleepy => "Sleepy",
            FatigueKind::Yawn => "Yawn",
            FatigueKind::HeadTurn => "HeadTurn",
            FatigueKind::NoFace => "NoFaceDetected",
            FatigueKind::Coaching => "Coaching",
        }
    }
}

impl std::fmt::Display for FatigueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected fatigue event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueEvent {
    pub kind: FatigueKind,
    /// Severity in [0, 1].
    pub severity: f32,
    /// Whether the event should reach the intervention engine.
    /// False only for isolated yawns below the forwarding threshold.
    pub forward: bool,
}

/// Signal emitted by a detector for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorSignal {
    /// A fatigue event was detected.
    Event(FatigueEvent),
    /// The driver recovered from the named condition; open
    /// interventions of this kind resolve as effective.
    Recovery { kind: FatigueKind },
}

/// Composed per-frame analyzer over the four detectors.
///
/// The eye, yawn, and head detectors run on landmark frames; the
/// presence tracker is driven separately by whichever loop knows
/// authoritatively whether a face was seen this cycle.
pub struct FatigueAnalyzer {
    eyes: EyeClosureDetector,
    yawn: YawnDetector,
    head: HeadTurnDetector,
    presence: PresenceTracker,
}

impl FatigueAnalyzer {
    pub fn new(config: DmsConfig) -> Self {
        Self {
            eyes: EyeClosureDetector::new(config.clone()),
            yawn: YawnDetector::new(config.clone()),
            head: HeadTurnDetector::new(config.clone()),
            presence: PresenceTracker::new(config),
        }
    }

    /// Run the landmark-driven detectors against one face observation.
    pub fn analyze_face(
        &self,
        metrics: &mut DriverMetrics,
        face: &FaceObservation,
        clock: &dyn Clock,
    ) -> Vec<DetectorSignal> {
        let mut signals = Vec::new();
        signals.extend(self.eyes.process(metrics, face, clock));
        signals.extend(self.yawn.process(metrics, face, clock));
        signals.extend(self.head.process(metrics, face, clock));
        signals
    }

    /// Feed one detection-cycle presence observation.
    pub fn observe_presence(
        &self,
        metrics: &mut DriverMetrics,
        face_present: bool,
        clock: &dyn Clock,
    ) -> Vec<DetectorSignal> {
        self.presence.process(metrics, face_present, clock)
    }
}
