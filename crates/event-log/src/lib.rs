//! Rolling Event Log
//!
//! Append-only queue of timestamped fatigue events, pruned to the
//! last minute. Its only consumer is the advisory loop, which turns
//! the tally into the status summary handed to the external
//! text-advice collaborator. An empty summary means no advisory is
//! needed.

use clock::Clock;
use dms::FatigueKind;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default summary window.
const WINDOW: Duration = Duration::from_secs(60);

/// Rolling log of recent fatigue events.
pub struct EventTracker {
    events: VecDeque<(Instant, FatigueKind)>,
    window: Duration,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::with_window(WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            events: VecDeque::new(),
            window,
        }
    }

    /// Append one event at the current time.
    pub fn record(&mut self, kind: FatigueKind, clock: &dyn Clock) {
        self.events.push_back((clock.now(), kind));
    }

    /// Drop entries older than the window.
    pub fn prune(&mut self, clock: &dyn Clock) {
        let now = clock.now();
        while let Some((ts, _)) = self.events.front() {
            if now.duration_since(*ts) > self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// Events currently inside the window.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Build the advisory summary for the last minute.
    ///
    /// Returns `None` when no events remain after pruning, meaning no
    /// advisory is needed this period.
    pub fn summary(&mut self, clock: &dyn Clock) -> Option<String> {
        self.prune(clock);
        if self.events.is_empty() {
            return None;
        }

        let mut yawns = 0u32;
        let mut head_turns = 0u32;
        let mut sleepy = 0u32;
        let mut no_face = 0u32;
        for (_, kind) in &self.events {
            match kind {
                FatigueKind::Yawn => yawns += 1,
                FatigueKind::HeadTurn => head_turns += 1,
                FatigueKind::Sleepy => sleepy += 1,
                FatigueKind::NoFace => no_face += 1,
                FatigueKind::Coaching => {}
            }
        }

        Some(format!(
            "Driver status over the last minute: {yawns} yawn(s), \
             {head_turns} head turn(s), {sleepy} sleepy episode(s), \
             {no_face} camera-loss episode(s)."
        ))
    }

    /// Discard all entries.
    pub fn reset(&mut self) {
        self.events.clear();
    }
}

impl Default for EventTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;

    #[test]
    fn empty_tracker_yields_no_summary() {
        let mut tracker = EventTracker::new();
        let clock = ManualClock::new();
        assert!(tracker.summary(&clock).is_none());
    }

    #[test]
    fn summary_tallies_event_kinds() {
        let mut tracker = EventTracker::new();
        let clock = ManualClock::new();

        tracker.record(FatigueKind::Yawn, &clock);
        tracker.record(FatigueKind::Yawn, &clock);
        tracker.record(FatigueKind::HeadTurn, &clock);
        tracker.record(FatigueKind::Sleepy, &clock);

        let summary = tracker.summary(&clock).unwrap();
        assert!(summary.contains("2 yawn(s)"));
        assert!(summary.contains("1 head turn(s)"));
        assert!(summary.contains("1 sleepy episode(s)"));
        assert!(summary.contains("0 camera-loss episode(s)"));
    }

    #[test]
    fn old_events_are_pruned() {
        let mut tracker = EventTracker::new();
        let clock = ManualClock::new();

        tracker.record(FatigueKind::Yawn, &clock);
        clock.advance(Duration::from_secs(61));
        assert!(tracker.summary(&clock).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn recent_events_survive_pruning() {
        let mut tracker = EventTracker::new();
        let clock = ManualClock::new();

        tracker.record(FatigueKind::Sleepy, &clock);
        clock.advance(Duration::from_secs(50));
        tracker.record(FatigueKind::Yawn, &clock);
        clock.advance(Duration::from_secs(20));

        // First event fell out of the window, second did not.
        let summary = tracker.summary(&clock).unwrap();
        assert_eq!(tracker.len(), 1);
        assert!(summary.contains("1 yawn(s)"));
        assert!(summary.contains("0 sleepy episode(s)"));
    }

    #[test]
    fn coaching_events_do_not_feed_the_tally() {
        let mut tracker = EventTracker::new();
        let clock = ManualClock::new();

        tracker.record(FatigueKind::Coaching, &clock);
        let summary = tracker.summary(&clock).unwrap();
        assert!(summary.contains("0 yawn(s)"));
    }
}
