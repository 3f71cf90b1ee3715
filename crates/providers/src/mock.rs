//! Mock providers for offline runs and tests

use crate::{AdvisoryProvider, LandmarkProvider, ProviderError};
use async_trait::async_trait;
use face_geometry::FaceObservation;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Always returns the same face observation (or none).
pub struct StaticFaceProvider {
    face: Option<FaceObservation>,
}

impl StaticFaceProvider {
    pub fn new(face: Option<FaceObservation>) -> Self {
        Self { face }
    }
}

#[async_trait]
impl LandmarkProvider for StaticFaceProvider {
    async fn detect_faces(&self, _jpeg: &[u8]) -> Result<Vec<FaceObservation>, ProviderError> {
        Ok(self.face.clone().into_iter().collect())
    }
}

/// Replays a fixed sequence of advisory replies, then empty strings.
pub struct ScriptedAdvisor {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedAdvisor {
    pub fn new(replies: impl IntoIterator<Item = String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }
}

#[async_trait]
impl AdvisoryProvider for ScriptedAdvisor {
    async fn advise(&self, _summary: &str) -> Result<String, ProviderError> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Never has advice to offer.
#[derive(Debug, Default)]
pub struct SilentAdvisor;

#[async_trait]
impl AdvisoryProvider for SilentAdvisor {
    async fn advise(&self, _summary: &str) -> Result<String, ProviderError> {
        Ok(String::new())
    }
}
