//! Notification delivery with channel fallback

use crate::ProviderError;
use std::sync::Arc;
use tracing::{info, warn};

/// Delivery channel toward the driver (audio, visual, push).
pub trait Notifier: Send + Sync {
    fn deliver(&self, message: &str) -> Result<(), ProviderError>;
}

/// Tries the primary channel first; on failure re-sends the same
/// message over the secondary channel, tagged as a fallback.
pub struct FallbackNotifier {
    primary: Arc<dyn Notifier>,
    secondary: Arc<dyn Notifier>,
}

impl FallbackNotifier {
    pub fn new(primary: Arc<dyn Notifier>, secondary: Arc<dyn Notifier>) -> Self {
        Self { primary, secondary }
    }
}

impl Notifier for FallbackNotifier {
    fn deliver(&self, message: &str) -> Result<(), ProviderError> {
        match self.primary.deliver(message) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "primary delivery channel failed, using fallback");
                self.secondary.deliver(&format!("[fallback] {message}"))
            }
        }
    }
}

/// Log-only delivery for offline runs.
#[derive(Debug, Default)]
pub struct LogNotifier {
    pub channel: &'static str,
}

impl LogNotifier {
    pub fn new(channel: &'static str) -> Self {
        Self { channel }
    }
}

impl Notifier for LogNotifier {
    fn deliver(&self, message: &str) -> Result<(), ProviderError> {
        info!(channel = self.channel, message, "intervention delivered");
        Ok(())
    }
}
