//! Published monitoring state and one-shot events

use serde::Serialize;

/// Maximum entries in the recent-events list.
pub const RECENT_EVENTS_CAP: usize = 10;

/// Push-style snapshot for presentation layers.
///
/// Rebuilt from [`dms::DriverMetrics`] every capture cycle and
/// published on a watch channel; never a source of truth. Frame bytes
/// travel out of band, only their presence is flagged here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitoringState {
    pub blink_count: u32,
    pub sleepy_count: u32,
    pub yawn_count: u32,

    pub calibrated: bool,
    pub calibration_message: String,

    pub face_visible: bool,
    /// A sleepy episode is currently in progress.
    pub sleepy: bool,
    pub head_turned: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_advisory: Option<String>,

    /// Human-readable recent events, newest first, capped.
    pub recent_events: Vec<String>,

    pub has_frame: bool,
}

/// One-shot presentation notifications. Not queryable state.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    FaceLost,
    FaceRegained,
    SleepyDetected { severity: f32 },
    YawnDetected { severity: f32 },
    HeadTurnDetected { severity: f32 },
    CoachingReceived(String),
}
