//! External Collaborator Boundaries
//!
//! The monitoring core consumes three remote capabilities: landmark
//! detection over an encoded frame, advisory text generation over a
//! status summary, and message delivery toward the driver. Each is a
//! trait here; production transports live outside this repository and
//! the mocks below drive offline runs and tests.

mod mock;
mod notify;

pub use mock::{ScriptedAdvisor, SilentAdvisor, StaticFaceProvider};
pub use notify::{FallbackNotifier, LogNotifier, Notifier};

use async_trait::async_trait;
use face_geometry::FaceObservation;
use thiserror::Error;

/// Fixed advisory text used when the text provider fails.
pub const ADVICE_FALLBACK: &str = "unable to provide coaching advice";

/// Provider error types
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed provider response: {0}")]
    Decode(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Remote face-detection/landmark provider.
///
/// Given an encoded frame, returns zero or more face observations.
/// Multiple faces are resolved downstream to the largest bounding box.
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    async fn detect_faces(&self, jpeg: &[u8]) -> Result<Vec<FaceObservation>, ProviderError>;
}

/// Remote text-advice provider.
///
/// Takes the one-minute status summary; an empty reply means no
/// advice is needed.
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    async fn advise(&self, summary: &str) -> Result<String, ProviderError>;
}
