//! Camera Capture
//!
//! Frame type and frame-source abstraction for the cabin camera. The
//! monitoring core never interprets pixel content; frames exist to be
//! resized and encoded for the external landmark provider and to be
//! forwarded out of band to presentation layers.

pub mod frame;
pub mod source;

pub use frame::CameraFrame;
pub use source::{FrameSource, SyntheticSource};

use thiserror::Error;

/// Capture error types
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open capture device: {0}")]
    Open(String),

    #[error("Capture stream ended")]
    StreamEnded,

    #[error("Frame encoding failed: {0}")]
    Encode(String),
}
