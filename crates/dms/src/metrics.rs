//! Per-session driver metrics
//!
//! Mutable numeric state shared by the detectors. Owned by the
//! orchestrator; detectors receive it by mutable reference for one
//! frame at a time, so no synchronization happens at this level.

use std::collections::VecDeque;
use std::time::Instant;

/// Session-scoped driver state.
///
/// Timers are `Instant`s captured through the injected clock; counters
/// are cumulative for the session and only reset with [`reset`].
///
/// [`reset`]: DriverMetrics::reset
#[derive(Debug)]
pub struct DriverMetrics {
    /// Recent EAR samples, newest last. Capacity-bounded FIFO.
    ear_window: VecDeque<f32>,
    window_capacity: usize,

    /// Calibrated resting EAR, adapted slowly after calibration.
    pub baseline_ear: f32,
    /// Samples consumed toward calibration.
    pub calibration_samples: usize,
    /// Set exactly once, after the calibration window fills.
    pub calibrated: bool,

    pub eyes_closed: bool,
    pub closure_start: Option<Instant>,
    pub last_sleepy: Option<Instant>,

    pub mouth_open: bool,
    pub mouth_open_start: Option<Instant>,
    /// A yawn event was already emitted for the current episode.
    pub yawn_flagged: bool,

    pub head_turned: bool,
    pub head_turn_start: Option<Instant>,

    pub face_lost_at: Option<Instant>,
    pub no_face_alerted: bool,
    /// Persists across brief reappearances so cooldown holds.
    pub last_no_face_alert: Option<Instant>,

    pub blink_count: u32,
    pub sleepy_count: u32,
    pub yawn_count: u32,
}

impl DriverMetrics {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            ear_window: VecDeque::with_capacity(window_capacity),
            window_capacity,
            baseline_ear: 0.0,
            calibration_samples: 0,
            calibrated: false,
            eyes_closed: false,
            closure_start: None,
            last_sleepy: None,
            mouth_open: false,
            mouth_open_start: None,
            yawn_flagged: false,
            head_turned: false,
            head_turn_start: None,
            face_lost_at: None,
            no_face_alerted: false,
            last_no_face_alert: None,
            blink_count: 0,
            sleepy_count: 0,
            yawn_count: 0,
        }
    }

    /// Push one raw EAR sample and return the smoothed working EAR
    /// (mean of the window).
    ///
    /// The first `window_capacity` samples establish the baseline as
    /// their exact mean; calibration latches permanently for the
    /// session. Afterwards the baseline drifts toward the working EAR
    /// by `alpha` per sample.
    pub fn push_ear_sample(&mut self, sample: f32, alpha: f32) -> f32 {
        if self.ear_window.len() >= self.window_capacity {
            self.ear_window.pop_front();
        }
        self.ear_window.push_back(sample);

        let working = self.working_ear();

        if !self.calibrated {
            self.calibration_samples += 1;
            if self.calibration_samples >= self.window_capacity {
                self.baseline_ear = working;
                self.calibrated = true;
            }
        } else {
            self.baseline_ear = self.baseline_ear * (1.0 - alpha) + working * alpha;
        }

        working
    }

    /// Mean of the current EAR window.
    pub fn working_ear(&self) -> f32 {
        if self.ear_window.is_empty() {
            return 0.0;
        }
        self.ear_window.iter().sum::<f32>() / self.ear_window.len() as f32
    }

    /// Restore session defaults (driver change).
    pub fn reset(&mut self) {
        *self = Self::new(self.window_capacity);
    }
}

impl Default for DriverMetrics {
    fn default() -> Self {
        Self::new(crate::DmsConfig::default().ear_window)
    }
}
