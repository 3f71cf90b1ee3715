//! Daemon configuration
//!
//! Layered from `monitord.toml` (optional) and `MONITORD_*`
//! environment variables over built-in defaults.

use dms::DmsConfig;
use monitor::SessionConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Driver identifier for profile lookup.
    pub driver_id: String,

    /// Directory for persisted driver profiles.
    pub profile_dir: String,

    /// Capture loop rate.
    pub capture_fps: u32,

    /// Minimum seconds between landmark-provider requests.
    pub detection_interval_secs: f64,

    /// Advisory period in seconds.
    pub advisory_interval_secs: f64,

    /// Detector preset: "default", "strict", or "lenient".
    pub strictness: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            driver_id: "default".to_string(),
            profile_dir: "profiles".to_string(),
            capture_fps: 30,
            detection_interval_secs: 1.0,
            advisory_interval_secs: 60.0,
            strictness: "default".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("monitord").required(false))
            .add_source(config::Environment::with_prefix("MONITORD"))
            .build()?
            .try_deserialize()
    }

    pub fn session_config(&self) -> SessionConfig {
        let dms = match self.strictness.as_str() {
            "strict" => DmsConfig::strict(),
            "lenient" => DmsConfig::lenient(),
            _ => DmsConfig::default(),
        };

        SessionConfig {
            driver_id: self.driver_id.clone(),
            capture_fps: self.capture_fps,
            detection_interval_secs: self.detection_interval_secs,
            advisory_interval_secs: self.advisory_interval_secs,
            dms,
        }
    }
}
