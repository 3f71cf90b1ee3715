//! Monitoring Session Orchestrator
//!
//! Composes the capture, detection, and advisory loops around the
//! detector core and the intervention engine:
//! - capture loop (~30 fps): frames in, detectors run, state out
//! - detection loop (1/s): external landmark requests, face buffer
//! - advisory loop (60 s): summary out, coaching text back in
//!
//! Cross-loop mutable state is limited to the two most-recent-wins
//! buffers, the driver metrics, and the response hub, each behind its
//! own short-held lock. A single watch flag cancels all loops
//! cooperatively.

mod buffer;
mod hub;
mod session;
mod state;

pub use buffer::SharedSlot;
pub use hub::ResponseHub;
pub use session::{DetectionCycle, MonitorHandle, MonitorSession, SessionConfig, SessionDeps};
pub use state::{MonitorEvent, MonitoringState, RECENT_EVENTS_CAP};

use thiserror::Error;

/// Orchestrator error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Profile storage error: {0}")]
    Storage(#[from] storage::StorageError),
}
