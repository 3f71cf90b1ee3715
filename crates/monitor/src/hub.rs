//! Response hub
//!
//! Single owner of the intervention engine, the driver profile, the
//! event tracker, and the delivery channel. All detector signals and
//! advisory text funnel through here, which keeps profile access
//! logically single-threaded per driver.

use crate::state::{MonitorEvent, RECENT_EVENTS_CAP};
use clock::Clock;
use dms::{DetectorSignal, FatigueEvent, FatigueKind};
use event_log::EventTracker;
use intervention::{DriverProfile, InterventionEngine};
use providers::Notifier;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info};

/// Fixed severity for synthetic coaching events.
const COACHING_SEVERITY: f32 = 0.6;

pub struct ResponseHub {
    engine: InterventionEngine,
    profile: DriverProfile,
    store: Arc<dyn storage::ProfileStore>,
    notifier: Arc<dyn Notifier>,
    tracker: EventTracker,
    clock: Arc<dyn Clock>,
    recent: VecDeque<String>,
    last_advisory: Option<String>,
}

impl ResponseHub {
    pub fn new(
        engine: InterventionEngine,
        profile: DriverProfile,
        store: Arc<dyn storage::ProfileStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine,
            profile,
            store,
            notifier,
            tracker: EventTracker::new(),
            clock,
            recent: VecDeque::new(),
            last_advisory: None,
        }
    }

    /// Process one batch of detector signals; returns the one-shot
    /// notifications to broadcast.
    pub fn handle_signals(&mut self, signals: &[DetectorSignal]) -> Vec<MonitorEvent> {
        let mut notifications = Vec::new();
        for signal in signals {
            match signal {
                DetectorSignal::Event(event) => {
                    if let Some(notification) = self.handle_event(*event) {
                        notifications.push(notification);
                    }
                }
                DetectorSignal::Recovery { kind } => self.handle_recovery(*kind),
            }
        }
        notifications
    }

    fn handle_event(&mut self, event: FatigueEvent) -> Option<MonitorEvent> {
        self.tracker.record(event.kind, self.clock.as_ref());
        self.push_recent(describe(&event));

        if event.forward {
            let selected =
                self.engine
                    .select(&mut self.profile, event.kind, event.severity, None);
            if let Err(e) = self.notifier.deliver(&selected.message) {
                error!(error = %e, "intervention delivery failed");
            }
            self.persist();
        }

        match event.kind {
            FatigueKind::Sleepy => Some(MonitorEvent::SleepyDetected {
                severity: event.severity,
            }),
            FatigueKind::Yawn => Some(MonitorEvent::YawnDetected {
                severity: event.severity,
            }),
            FatigueKind::HeadTurn => Some(MonitorEvent::HeadTurnDetected {
                severity: event.severity,
            }),
            // Presence transitions already produce FaceLost/FaceRegained.
            FatigueKind::NoFace | FatigueKind::Coaching => None,
        }
    }

    fn handle_recovery(&mut self, kind: FatigueKind) {
        let resolved = self.engine.resolve(&mut self.profile, kind, true);
        if resolved > 0 {
            info!(kind = %kind, resolved, "driver recovered");
            self.persist();
        }
    }

    /// Thread externally generated advisory text through the engine as
    /// a synthetic coaching event.
    pub fn handle_coaching(&mut self, advice: &str) -> MonitorEvent {
        self.last_advisory = Some(advice.to_string());
        self.push_recent(format!("Coaching: {advice}"));

        let selected = self.engine.select(
            &mut self.profile,
            FatigueKind::Coaching,
            COACHING_SEVERITY,
            Some(advice),
        );
        if let Err(e) = self.notifier.deliver(&selected.message) {
            error!(error = %e, "coaching delivery failed");
        }
        self.persist();

        MonitorEvent::CoachingReceived(advice.to_string())
    }

    /// One-minute status summary, or `None` when nothing happened.
    pub fn summary(&mut self) -> Option<String> {
        self.tracker.summary(self.clock.as_ref())
    }

    pub fn last_advisory(&self) -> Option<&str> {
        self.last_advisory.as_deref()
    }

    /// Recent event descriptions, newest first.
    pub fn recent_events(&self) -> Vec<String> {
        self.recent.iter().cloned().collect()
    }

    pub fn profile(&self) -> &DriverProfile {
        &self.profile
    }

    fn push_recent(&mut self, description: String) {
        self.recent.push_front(description);
        self.recent.truncate(RECENT_EVENTS_CAP);
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.profile) {
            error!(error = %e, "profile save failed");
        }
    }
}

fn describe(event: &FatigueEvent) -> String {
    match event.kind {
        FatigueKind::Sleepy => {
            format!("Sleepy episode detected (severity {:.2})", event.severity)
        }
        FatigueKind::Yawn => "Yawn detected".to_string(),
        FatigueKind::HeadTurn => "Head turned away from the road".to_string(),
        FatigueKind::NoFace => "Driver face not visible".to_string(),
        FatigueKind::Coaching => "Coaching advice received".to_string(),
    }
}
