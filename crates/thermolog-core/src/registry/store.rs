use crate::error::ThermologError;
use crate::registry::DiscoveredLocation;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub type RegistryEntries = BTreeMap<String, DiscoveredLocation>;

/// Persistence for the location registry.
///
/// The registry loads everything once when opened and saves a full
/// snapshot on flush; stores never see partial updates.
pub trait RegistryStore: Send + Sync {
    fn load(&self) -> Result<RegistryEntries, ThermologError>;

    fn save(&self, entries: &RegistryEntries) -> Result<(), ThermologError>;
}

/// Pretty-printed JSON object keyed by location key.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_error(&self, reason: impl ToString) -> ThermologError {
        ThermologError::RegistryLoad {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn save_error(&self, reason: impl ToString) -> ThermologError {
        ThermologError::RegistrySave {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl RegistryStore for JsonFileStore {
    /// A missing file is an empty registry.
    fn load(&self) -> Result<RegistryEntries, ThermologError> {
        if !self.path.exists() {
            return Ok(RegistryEntries::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.load_error(e))?;
        if content.trim().is_empty() {
            return Ok(RegistryEntries::new());
        }

        let mut entries: RegistryEntries =
            serde_json::from_str(&content).map_err(|e| self.load_error(e))?;

        // The map key is the identity, whatever the entry says.
        for (key, entry) in entries.iter_mut() {
            entry.key.clone_from(key);
        }
        Ok(entries)
    }

    /// Written to a sibling temp file and renamed into place.
    fn save(&self, entries: &RegistryEntries) -> Result<(), ThermologError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.save_error(e))?;

        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.save_error(e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.save_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.save_error(e.error))?;
        Ok(())
    }
}

/// In-process store, for tests and callers that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<RegistryEntries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: RegistryEntries) -> Self {
        MemoryStore {
            entries: Mutex::new(entries),
        }
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<RegistryEntries, ThermologError> {
        let guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, entries: &RegistryEntries) -> Result<(), ThermologError> {
        let mut guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        *guard = entries.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Confidence, LocationType};
    use chrono::{TimeZone, Utc};

    fn entry(key: &str) -> DiscoveredLocation {
        let at = Utc.with_ymd_and_hms(2025, 8, 14, 18, 0, 0).unwrap();
        DiscoveredLocation::new(key, Confidence::Medium, LocationType::Fridge, Some(2.0), Some(8.0), at)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("locations.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/locations.json"));

        let mut entries = RegistryEntries::new();
        entries.insert("Fridge A".into(), entry("Fridge A"));
        store.save(&entries).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_map_key_wins_over_stored_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.json");
        std::fs::write(
            &path,
            r#"{"Room 1": {"key": "stale", "name": "Room 1", "confidence": "low",
                "type": "room", "first_seen": "2025-08-14T18:00:00Z",
                "last_seen": "2025-08-14T18:00:00Z"}}"#,
        )
        .unwrap();

        let loaded = JsonFileStore::new(&path).load().unwrap();
        let room = &loaded["Room 1"];
        assert_eq!(room.key, "Room 1");
        assert_eq!(room.source_count, 1);
        assert!(!room.configured);
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ThermologError::RegistryLoad { .. }));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        let mut entries = RegistryEntries::new();
        entries.insert("Fridge A".into(), entry("Fridge A"));
        store.save(&entries).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
