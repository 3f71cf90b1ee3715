//! Video frame type and transmission helpers

use crate::CaptureError;
use image::ImageEncoder;

/// Decoded RGB video frame.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (milliseconds since session start)
    pub timestamp_ms: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl CameraFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ms: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ms,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Downscale for transmission (nearest neighbor).
    pub fn resize(&self, new_width: u32, new_height: u32) -> CameraFrame {
        let mut resized = Vec::with_capacity((new_width * new_height * 3) as usize);

        let x_ratio = self.width as f32 / new_width as f32;
        let y_ratio = self.height as f32 / new_height as f32;

        for y in 0..new_height {
            for x in 0..new_width {
                let src_x = ((x as f32 * x_ratio) as u32).min(self.width.saturating_sub(1));
                let src_y = ((y as f32 * y_ratio) as u32).min(self.height.saturating_sub(1));

                match self.get_pixel(src_x, src_y) {
                    Some(pixel) => resized.extend_from_slice(&pixel),
                    None => resized.extend_from_slice(&[0, 0, 0]),
                }
            }
        }

        CameraFrame {
            data: resized,
            width: new_width,
            height: new_height,
            timestamp_ms: self.timestamp_ms,
            sequence: self.sequence,
        }
    }

    /// Encode as JPEG for the landmark-provider request.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CaptureError> {
        let mut out = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .write_image(
                &self.data,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(out)
    }
}
