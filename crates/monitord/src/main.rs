//! Driver Vigilance Daemon - Main Entry Point

mod settings;

use capture::SyntheticSource;
use clock::SystemClock;
use face_geometry::{EyeLandmarks, FaceBox, FaceObservation, MouthLandmarks, Point};
use monitor::{MonitorSession, SessionDeps};
use providers::{FallbackNotifier, LogNotifier, SilentAdvisor, StaticFaceProvider};
use settings::Settings;
use std::sync::Arc;
use storage::JsonFileStore;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Driver Vigilance Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    info!(?settings, "configuration loaded");

    let store = Arc::new(JsonFileStore::new(&settings.profile_dir)?);
    let notifier = Arc::new(FallbackNotifier::new(
        Arc::new(LogNotifier::new("audio")),
        Arc::new(LogNotifier::new("push")),
    ));

    // Offline collaborators: a synthetic camera and a static landmark
    // result stand in for the remote device and detection service.
    let deps = SessionDeps {
        source: Box::new(SyntheticSource::new(640, 480, settings.capture_fps)),
        landmarks: Arc::new(StaticFaceProvider::new(Some(demo_face()))),
        advisor: Arc::new(SilentAdvisor),
        notifier,
        store,
        clock: Arc::new(SystemClock),
    };

    let handle = MonitorSession::spawn(settings.session_config(), deps)?;
    let mut events = handle.subscribe_events();

    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "monitor event");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    handle.cancel();
    handle.join().await;
    event_task.abort();

    info!("monitoring session ended");
    Ok(())
}

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Neutral, forward-facing face observation for offline runs.
fn demo_face() -> FaceObservation {
    let eye = EyeLandmarks {
        inner: Point::new(0.0, 0.0),
        outer: Point::new(30.0, 0.0),
        top: Point::new(15.0, -4.5),
        bottom: Point::new(15.0, 4.5),
    };
    FaceObservation {
        bbox: FaceBox { x: 200.0, y: 120.0, width: 240.0, height: 300.0 },
        left_eye: Some(eye),
        right_eye: Some(eye),
        mouth: Some(MouthLandmarks {
            top: Point::new(320.0, 330.0),
            bottom: Point::new(320.0, 338.0),
        }),
        yaw_degrees: Some(0.0),
    }
}
