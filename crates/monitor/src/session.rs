//! The three session loops

use crate::buffer::SharedSlot;
use crate::hub::ResponseHub;
use crate::state::{MonitorEvent, MonitoringState};
use crate::MonitorError;
use capture::{CameraFrame, FrameSource};
use clock::Clock;
use dms::{DetectorSignal, DmsConfig, DriverMetrics, FatigueAnalyzer};
use face_geometry::{nearest_face, FaceObservation};
use intervention::{Catalog, DriverProfile, InterventionEngine};
use providers::{AdvisoryProvider, LandmarkProvider, Notifier, ADVICE_FALLBACK};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// JPEG quality for landmark-provider requests.
const DETECTION_JPEG_QUALITY: u8 = 80;
/// Frames wider than this are downscaled before transmission.
const DETECTION_MAX_WIDTH: u32 = 640;

/// Session timing and detector configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub driver_id: String,
    /// Capture loop rate.
    pub capture_fps: u32,
    /// Minimum seconds between external landmark requests.
    pub detection_interval_secs: f64,
    /// Advisory period.
    pub advisory_interval_secs: f64,
    pub dms: DmsConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            driver_id: "default".to_string(),
            capture_fps: 30,
            detection_interval_secs: 1.0,
            advisory_interval_secs: 60.0,
            dms: DmsConfig::default(),
        }
    }
}

/// External collaborators injected at session start.
pub struct SessionDeps {
    pub source: Box<dyn FrameSource>,
    pub landmarks: Arc<dyn LandmarkProvider>,
    pub advisor: Arc<dyn AdvisoryProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn storage::ProfileStore>,
    pub clock: Arc<dyn Clock>,
}

/// Result of one detection cycle, exchanged through the face buffer.
pub struct DetectionCycle {
    /// Nearest face this cycle, if any.
    pub face: Option<FaceObservation>,
    /// Presence-tracker signals produced by the detection loop.
    pub signals: Vec<DetectorSignal>,
}

/// Running monitoring session.
pub struct MonitorSession;

/// Handle over a spawned session: state subscription, event
/// subscription, cooperative cancellation.
pub struct MonitorHandle {
    cancel_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<MonitoringState>,
    event_tx: broadcast::Sender<MonitorEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Latest published snapshot.
    pub fn state(&self) -> watch::Receiver<MonitoringState> {
        self.state_rx.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Signal all loops to stop. In-flight external calls are
    /// discarded on completion.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Wait for all loops to exit.
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

struct Shared {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    analyzer: FatigueAnalyzer,
    metrics: Mutex<DriverMetrics>,
    frame_slot: SharedSlot<CameraFrame>,
    cycle_slot: SharedSlot<DetectionCycle>,
    hub: Mutex<ResponseHub>,
    state_tx: watch::Sender<MonitoringState>,
    event_tx: broadcast::Sender<MonitorEvent>,
    has_frame: AtomicBool,
}

impl Shared {
    /// Rebuild and publish the state snapshot from current metrics.
    fn publish_state(&self) {
        let snapshot = {
            let metrics = self.metrics.lock().unwrap();
            let hub = self.hub.lock().unwrap();
            let now = self.clock.now();

            let sleepy_in_progress = metrics.eyes_closed
                && metrics.closure_start.map_or(false, |start| {
                    (now - start).as_secs_f32() >= self.config.dms.sleepy_hold_secs
                });

            MonitoringState {
                blink_count: metrics.blink_count,
                sleepy_count: metrics.sleepy_count,
                yawn_count: metrics.yawn_count,
                calibrated: metrics.calibrated,
                calibration_message: if metrics.calibrated {
                    "Calibration complete".to_string()
                } else {
                    format!(
                        "Calibrating ({}/{})...",
                        metrics.calibration_samples, self.config.dms.ear_window
                    )
                },
                face_visible: metrics.face_lost_at.is_none(),
                sleepy: sleepy_in_progress,
                head_turned: metrics.head_turned,
                last_advisory: hub.last_advisory().map(str::to_string),
                recent_events: hub.recent_events(),
                has_frame: self.has_frame.load(Ordering::Relaxed),
            }
        };
        self.state_tx.send_replace(snapshot);
    }
}

impl MonitorSession {
    /// Load the driver profile and spawn the three loops.
    pub fn spawn(config: SessionConfig, deps: SessionDeps) -> Result<MonitorHandle, MonitorError> {
        let profile = match deps.store.load(&config.driver_id)? {
            Some(profile) => {
                info!(driver_id = %config.driver_id, "loaded existing driver profile");
                profile
            }
            None => {
                info!(driver_id = %config.driver_id, "starting fresh driver profile");
                DriverProfile::new(config.driver_id.clone())
            }
        };

        let session_id = Uuid::new_v4();
        info!(%session_id, driver_id = %config.driver_id, "monitoring session starting");

        let engine = InterventionEngine::new(Catalog::builtin(), deps.clock.clone(), session_id);
        let hub = ResponseHub::new(
            engine,
            profile,
            deps.store,
            deps.notifier,
            deps.clock.clone(),
        );

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(MonitoringState::default());
        let (event_tx, _) = broadcast::channel(64);

        let shared = Arc::new(Shared {
            analyzer: FatigueAnalyzer::new(config.dms.clone()),
            metrics: Mutex::new(DriverMetrics::new(config.dms.ear_window)),
            frame_slot: SharedSlot::new(),
            cycle_slot: SharedSlot::new(),
            hub: Mutex::new(hub),
            state_tx,
            event_tx: event_tx.clone(),
            has_frame: AtomicBool::new(false),
            clock: deps.clock,
            config,
        });

        let tasks = vec![
            tokio::spawn(capture_loop(shared.clone(), deps.source, cancel_rx.clone())),
            tokio::spawn(detection_loop(
                shared.clone(),
                deps.landmarks,
                cancel_rx.clone(),
            )),
            tokio::spawn(advisory_loop(shared, deps.advisor, cancel_rx)),
        ];

        Ok(MonitorHandle {
            cancel_tx,
            state_rx,
            event_tx,
            tasks,
        })
    }
}

/// Capture loop: frames in, detectors run, state published. Never
/// awaits an external provider.
async fn capture_loop(
    shared: Arc<Shared>,
    mut source: Box<dyn FrameSource>,
    mut cancel: watch::Receiver<bool>,
) {
    let period = Duration::from_secs_f64(1.0 / shared.config.capture_fps.max(1) as f64);
    let mut ticker = interval(period);
    info!("capture loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel.changed() => {
                // A closed channel means the session was abandoned.
                if changed.is_err() {
                    break;
                }
            }
        }
        if *cancel.borrow() {
            break;
        }

        match source.next_frame() {
            Ok(frame) => {
                shared.has_frame.store(true, Ordering::Relaxed);
                shared.frame_slot.publish(frame);
            }
            Err(e) => warn!(error = %e, "frame capture failed"),
        }

        // Consume whatever the detection loop last deposited.
        if let Some(cycle) = shared.cycle_slot.take() {
            let mut signals = cycle.signals;
            if let Some(face) = cycle.face.as_ref() {
                let mut metrics = shared.metrics.lock().unwrap();
                signals.extend(shared.analyzer.analyze_face(
                    &mut metrics,
                    face,
                    shared.clock.as_ref(),
                ));
            }

            if !signals.is_empty() {
                let notifications = {
                    let mut hub = shared.hub.lock().unwrap();
                    hub.handle_signals(&signals)
                };
                for notification in notifications {
                    let _ = shared.event_tx.send(notification);
                }
            }
        }

        shared.publish_state();
    }

    info!("capture loop stopped");
}

/// Detection loop: serializes the current frame, awaits the external
/// landmark provider, swaps the result into the face buffer. Drives
/// the presence tracker since it alone knows "no face this cycle".
async fn detection_loop(
    shared: Arc<Shared>,
    provider: Arc<dyn LandmarkProvider>,
    mut cancel: watch::Receiver<bool>,
) {
    let period = Duration::from_secs_f64(shared.config.detection_interval_secs.max(0.01));
    let mut ticker = interval(period);
    let mut was_present = true;
    info!("detection loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel.changed() => {
                // A closed channel means the session was abandoned.
                if changed.is_err() {
                    break;
                }
            }
        }
        if *cancel.borrow() {
            break;
        }

        let Some(frame) = shared.frame_slot.take() else {
            continue;
        };

        let frame = if frame.width > DETECTION_MAX_WIDTH {
            let scale = DETECTION_MAX_WIDTH as f32 / frame.width as f32;
            frame.resize(
                DETECTION_MAX_WIDTH,
                (frame.height as f32 * scale).max(1.0) as u32,
            )
        } else {
            frame
        };
        let jpeg = match frame.encode_jpeg(DETECTION_JPEG_QUALITY) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(error = %e, "frame encoding failed");
                continue;
            }
        };

        // The only awaited external call on this loop.
        let result = provider.detect_faces(&jpeg).await;
        if *cancel.borrow() {
            // Session ended while the request was in flight.
            break;
        }

        let faces = match result {
            Ok(faces) => faces,
            Err(e) => {
                error!(error = %e, "landmark detection failed");
                continue;
            }
        };

        let face = nearest_face(&faces).cloned();
        let present = face.is_some();

        let signals = {
            let mut metrics = shared.metrics.lock().unwrap();
            shared
                .analyzer
                .observe_presence(&mut metrics, present, shared.clock.as_ref())
        };

        if present != was_present {
            was_present = present;
            let _ = shared.event_tx.send(if present {
                MonitorEvent::FaceRegained
            } else {
                MonitorEvent::FaceLost
            });
        }

        shared.cycle_slot.publish(DetectionCycle { face, signals });
    }

    info!("detection loop stopped");
}

/// Advisory loop: periodic summary to the text provider; non-empty
/// answers come back as synthetic coaching events.
async fn advisory_loop(
    shared: Arc<Shared>,
    advisor: Arc<dyn AdvisoryProvider>,
    mut cancel: watch::Receiver<bool>,
) {
    let period = Duration::from_secs_f64(shared.config.advisory_interval_secs.max(0.01));
    let mut ticker = interval(period);
    // The first tick fires immediately; the first summary should wait
    // out a full period.
    ticker.tick().await;
    info!("advisory loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel.changed() => {
                // A closed channel means the session was abandoned.
                if changed.is_err() {
                    break;
                }
            }
        }
        if *cancel.borrow() {
            break;
        }

        let summary = {
            let mut hub = shared.hub.lock().unwrap();
            hub.summary()
        };
        let Some(summary) = summary else {
            debug!("no recent events, skipping advisory");
            continue;
        };

        let advice = match advisor.advise(&summary).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "advisory provider failed");
                ADVICE_FALLBACK.to_string()
            }
        };
        if *cancel.borrow() {
            break;
        }
        if advice.is_empty() {
            continue;
        }

        let notification = {
            let mut hub = shared.hub.lock().unwrap();
            hub.handle_coaching(&advice)
        };
        let _ = shared.event_tx.send(notification);
    }

    info!("advisory loop stopped");
}
