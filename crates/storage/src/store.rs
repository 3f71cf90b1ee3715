//! Store Implementations

use crate::StorageError;
use intervention::DriverProfile;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Persistence boundary for driver profiles.
///
/// Assumes a single active session per driver id; concurrent writers
/// need an external locking discipline this layer does not provide.
pub trait ProfileStore: Send + Sync {
    /// Load a profile. `Ok(None)` when absent or unreadable.
    fn load(&self, driver_id: &str) -> Result<Option<DriverProfile>, StorageError>;

    /// Write the whole document.
    fn save(&self, profile: &DriverProfile) -> Result<(), StorageError>;

    /// Remove a profile (explicit reset).
    fn delete(&self, driver_id: &str) -> Result<(), StorageError>;
}

/// One `<driver_id>.json` per profile under a base directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, driver_id: &str) -> PathBuf {
        self.dir.join(format!("{driver_id}.json"))
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self, driver_id: &str) -> Result<Option<DriverProfile>, StorageError> {
        let path = self.path_for(driver_id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        match serde_json::from_slice(&bytes) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                // Corruption is recoverable: the caller starts fresh
                // and the next save replaces the document.
                warn!(driver_id, error = %e, "unreadable profile, treating as absent");
                Ok(None)
            }
        }
    }

    fn save(&self, profile: &DriverProfile) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(profile)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(self.path_for(&profile.driver_id), json)?;
        debug!(driver_id = %profile.driver_id, "profile saved");
        Ok(())
    }

    fn delete(&self, driver_id: &str) -> Result<(), StorageError> {
        let path = self.path_for(driver_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<String, DriverProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self, driver_id: &str) -> Result<Option<DriverProfile>, StorageError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(driver_id).cloned())
    }

    fn save(&self, profile: &DriverProfile) -> Result<(), StorageError> {
        let mut profiles = self.profiles.lock().unwrap();
        profiles.insert(profile.driver_id.clone(), profile.clone());
        Ok(())
    }

    fn delete(&self, driver_id: &str) -> Result<(), StorageError> {
        let mut profiles = self.profiles.lock().unwrap();
        profiles.remove(driver_id);
        Ok(())
    }
}
