//! Facial Landmark Geometry
//!
//! Shared geometric types for the per-frame landmark results handed
//! over by the external face provider, plus the two aspect-ratio
//! measures the detectors run on:
//! - EAR (Eye Aspect Ratio): vertical eye opening / horizontal width
//! - mouth-open ratio: lip gap / face box height

use serde::{Deserialize, Serialize};

/// 2D landmark point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Face bounding box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Landmark points for one eye.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EyeLandmarks {
    /// Corner nearest the nose.
    pub inner: Point,
    /// Corner nearest the temple.
    pub outer: Point,
    pub top: Point,
    pub bottom: Point,
}

/// Upper/lower lip landmark points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MouthLandmarks {
    /// Upper lip top.
    pub top: Point,
    /// Lower lip bottom.
    pub bottom: Point,
}

/// One detected face for one detection cycle.
///
/// Landmark members are optional: the provider may return a box with
/// partial landmarks, and detectors skip the frame for whatever is
/// missing rather than guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bbox: FaceBox,
    pub left_eye: Option<EyeLandmarks>,
    pub right_eye: Option<EyeLandmarks>,
    pub mouth: Option<MouthLandmarks>,
    /// Head yaw in degrees, negative = left.
    pub yaw_degrees: Option<f32>,
}

/// Eye Aspect Ratio: vertical opening over horizontal width.
///
/// Returns `None` when the eye width is degenerate.
pub fn eye_aspect_ratio(eye: &EyeLandmarks) -> Option<f32> {
    let horizontal = eye.inner.distance(&eye.outer);
    if horizontal < f32::EPSILON {
        return None;
    }
    Some(eye.top.distance(&eye.bottom) / horizontal)
}

/// EAR averaged across both eyes.
pub fn average_ear(left: &EyeLandmarks, right: &EyeLandmarks) -> Option<f32> {
    match (eye_aspect_ratio(left), eye_aspect_ratio(right)) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        _ => None,
    }
}

/// Mouth-open ratio: lip gap relative to face box height.
pub fn mouth_open_ratio(mouth: &MouthLandmarks, face_height: f32) -> Option<f32> {
    if face_height < f32::EPSILON {
        return None;
    }
    Some((mouth.bottom.y - mouth.top.y).abs() / face_height)
}

/// Resolve multiple provider results to the single nearest face,
/// taken as the one with the largest bounding-box area.
pub fn nearest_face(observations: &[FaceObservation]) -> Option<&FaceObservation> {
    observations.iter().max_by(|a, b| {
        a.bbox
            .area()
            .partial_cmp(&b.bbox.area())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
