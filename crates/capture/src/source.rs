//! Frame sources

use crate::{CameraFrame, CaptureError};

/// Produces the next frame from a capture device.
///
/// Implementations are expected to be non-blocking at camera frame
/// rate; the capture loop calls this once per tick.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<CameraFrame, CaptureError>;
}

/// Deterministic flat-gray frame generator for offline runs and tests.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_interval_ms: u64,
    sequence: u32,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            frame_interval_ms: 1000 / fps.max(1) as u64,
            sequence: 0,
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(640, 480, 30)
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<CameraFrame, CaptureError> {
        let data = vec![96u8; (self.width * self.height * 3) as usize];
        let frame = CameraFrame::new(
            data,
            self.width,
            self.height,
            self.sequence as u64 * self.frame_interval_ms,
            self.sequence,
        );
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }
}
