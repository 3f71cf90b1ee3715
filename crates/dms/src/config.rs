//! DMS configuration

use serde::{Deserialize, Serialize};

/// Detector thresholds and timing windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmsConfig {
    /// Number of EAR samples used for smoothing and calibration.
    pub ear_window: usize,

    /// EMA weight for baseline EAR adaptation after calibration.
    pub baseline_alpha: f32,

    /// Eyes count as closed below baseline * this fraction.
    pub ear_closed_fraction: f32,

    /// Continuous closure required before a sleepy event (seconds).
    pub sleepy_hold_secs: f32,

    /// Minimum gap between sleepy events (seconds).
    pub sleepy_debounce_secs: f32,

    /// Mouth-open ratio threshold (lip gap / face height).
    pub mouth_open_ratio: f32,

    /// Continuous mouth opening required before a yawn event (seconds).
    pub yawn_hold_secs: f32,

    /// Cumulative yawns before yawn events reach the intervention engine.
    pub yawn_forward_threshold: u32,

    /// Head counts as turned beyond this |yaw| (degrees).
    pub head_yaw_degrees: f32,

    /// Continuous-turn re-fire period (seconds).
    pub head_refire_secs: f32,

    /// Continuous absence required before a no-face event (seconds).
    pub face_lost_secs: f32,

    /// Re-alert suppression window after a no-face event (seconds).
    pub no_face_cooldown_secs: f32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            ear_window: 5,
            baseline_alpha: 0.01,
            ear_closed_fraction: 0.7,
            sleepy_hold_secs: 1.5,
            sleepy_debounce_secs: 3.0,
            mouth_open_ratio: 0.11,
            yawn_hold_secs: 1.5,
            yawn_forward_threshold: 3,
            head_yaw_degrees: 20.0,
            head_refire_secs: 5.0,
            face_lost_secs: 15.0,
            no_face_cooldown_secs: 10.0,
        }
    }
}

impl DmsConfig {
    /// Stricter thresholds for high-risk duty cycles.
    pub fn strict() -> Self {
        Self {
            sleepy_hold_secs: 1.0,
            head_yaw_degrees: 15.0,
            face_lost_secs: 10.0,
            ..Default::default()
        }
    }

    /// Looser thresholds for low-speed or off-road operation.
    pub fn lenient() -> Self {
        Self {
            sleepy_hold_secs: 2.5,
            head_yaw_degrees: 30.0,
            face_lost_secs: 20.0,
            ..Default::default()
        }
    }
}
