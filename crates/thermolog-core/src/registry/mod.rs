//! Durable identity store for discovered monitoring locations.
//!
//! Ingestion only ever adds or refreshes entries. Keys disappear through an
//! operator merge and nothing else.

pub mod similarity;
pub mod store;

use crate::error::ThermologError;
use crate::locations::{candidates_from_blocks, DiscoveredCandidate};
use crate::model::{Confidence, LocationType, ParseOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use similarity::similarity;
use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use store::{RegistryEntries, RegistryStore};
use tracing::{debug, info};

/// Lower bound of the "worth reviewing" similarity band.
pub const DEFAULT_SUGGEST_THRESHOLD: f64 = 70.0;

/// At or above this, two names are the same location spelled slightly
/// differently rather than a merge decision.
pub const NEAR_EXACT_THRESHOLD: f64 = 95.0;

/// Candidates considered per suggestion request.
pub const MAX_SUGGESTIONS: usize = 3;

/// A location the registry has seen at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredLocation {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub configured: bool,
    #[serde(rename = "type", default = "default_location_type")]
    pub location_type: LocationType,
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub max_temp: Option<f64>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default = "default_source_count")]
    pub source_count: u32,
}

fn default_location_type() -> LocationType {
    LocationType::Custom
}

fn default_source_count() -> u32 {
    1
}

impl DiscoveredLocation {
    pub fn new(
        key: &str,
        confidence: Confidence,
        location_type: LocationType,
        min_temp: Option<f64>,
        max_temp: Option<f64>,
        seen_at: DateTime<Utc>,
    ) -> Self {
        DiscoveredLocation {
            key: key.to_string(),
            display_name: key.to_string(),
            confidence,
            configured: false,
            location_type,
            min_temp,
            max_temp,
            first_seen: seen_at,
            last_seen: seen_at,
            source_count: 1,
        }
    }
}

/// Whether an observation created an entry or refreshed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    New,
    Existing,
}

/// An existing key an operator may want to merge a name into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSuggestion {
    pub key: String,
    pub name: String,
    pub similarity: f64,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverySummary {
    pub total_discovered: usize,
    pub total_unconfigured: usize,
    pub unconfigured: Vec<DiscoveredLocation>,
}

/// Thread-safe registry of discovered locations.
///
/// All mutations go through one write lock over the key map, so concurrent
/// observations of the same key are serialized.
pub struct LocationRegistry {
    entries: RwLock<RegistryEntries>,
    store: Option<Box<dyn RegistryStore>>,
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationRegistry {
    /// Empty registry with nowhere to flush to.
    pub fn new() -> Self {
        LocationRegistry {
            entries: RwLock::new(RegistryEntries::new()),
            store: None,
        }
    }

    /// Load every entry from `store`; later flushes write back to it.
    pub fn open(store: Box<dyn RegistryStore>) -> Result<Self, ThermologError> {
        let entries = store.load()?;
        info!(count = entries.len(), "location registry loaded");
        Ok(LocationRegistry {
            entries: RwLock::new(entries),
            store: Some(store),
        })
    }

    /// Save a snapshot of all entries to the backing store.
    pub fn flush(&self) -> Result<(), ThermologError> {
        let Some(store) = &self.store else {
            debug!("registry has no store, skipping flush");
            return Ok(());
        };
        let snapshot = self.snapshot();
        store.save(&snapshot)?;
        info!(count = snapshot.len(), "location registry saved");
        Ok(())
    }

    // A panic while holding the lock leaves the map itself intact.
    fn read(&self) -> RwLockReadGuard<'_, RegistryEntries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryEntries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn observe(
        &self,
        name: &str,
        confidence: Confidence,
        location_type: LocationType,
        min_temp: Option<f64>,
        max_temp: Option<f64>,
    ) -> Observed {
        self.observe_at(name, confidence, location_type, min_temp, max_temp, Utc::now())
    }

    /// Record a sighting of `name` at `seen_at`.
    ///
    /// An existing entry gets its count bumped, `last_seen` moved forward
    /// (never back) and its confidence upgraded if the new one outranks it.
    /// Type, thresholds and the configured flag are left alone.
    pub fn observe_at(
        &self,
        name: &str,
        confidence: Confidence,
        location_type: LocationType,
        min_temp: Option<f64>,
        max_temp: Option<f64>,
        seen_at: DateTime<Utc>,
    ) -> Observed {
        let mut entries = self.write();

        if let Some(existing) = entries.get_mut(name) {
            existing.source_count += 1;
            existing.last_seen = existing.last_seen.max(seen_at);
            existing.confidence = existing.confidence.upgraded(confidence);
            info!(
                key = name,
                source_count = existing.source_count,
                confidence = %existing.confidence,
                "updated existing location"
            );
            return Observed::Existing;
        }

        entries.insert(
            name.to_string(),
            DiscoveredLocation::new(name, confidence, location_type, min_temp, max_temp, seen_at),
        );
        info!(key = name, %confidence, %location_type, "registered new location");
        Observed::New
    }

    pub fn observe_candidate(&self, candidate: &DiscoveredCandidate) -> Observed {
        self.observe_candidate_at(candidate, Utc::now())
    }

    fn observe_candidate_at(&self, candidate: &DiscoveredCandidate, seen_at: DateTime<Utc>) -> Observed {
        self.observe_at(
            &candidate.name,
            candidate.confidence,
            candidate.location_type,
            candidate.min_temp,
            candidate.max_temp,
            seen_at,
        )
    }

    /// Forward every location of a parsed report. Returns how many were new.
    ///
    /// Failed parses contribute nothing.
    pub fn ingest(&self, outcome: &ParseOutcome) -> usize {
        if !outcome.success {
            debug!(source = %outcome.source, "skipping failed parse");
            return 0;
        }

        let seen_at = Utc::now();
        let mut new = 0;
        for candidate in candidates_from_blocks(&outcome.locations, &outcome.source) {
            if self.observe_candidate_at(&candidate, seen_at) == Observed::New {
                new += 1;
            }
        }

        info!(source = %outcome.source, new, "report ingested");
        new
    }

    /// Existing keys similar enough to `name` to ask an operator about.
    ///
    /// The [`MAX_SUGGESTIONS`] most similar keys are taken, then only those
    /// in `[threshold, exclude_above)` are kept. Nothing is merged.
    pub fn suggest_merges(&self, name: &str, threshold: f64, exclude_above: f64) -> Vec<MergeSuggestion> {
        let entries = self.read();

        let mut scored: Vec<(f64, &DiscoveredLocation)> = entries
            .values()
            .map(|loc| (similarity(name, &loc.key), loc))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.key.cmp(&b.1.key))
        });

        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .filter(|(score, _)| *score >= threshold && *score < exclude_above)
            .map(|(score, loc)| MergeSuggestion {
                key: loc.key.clone(),
                name: loc.display_name.clone(),
                similarity: score,
                location_type: loc.location_type,
                configured: loc.configured,
            })
            .collect()
    }

    /// The most similar existing key, if it scores at least `threshold`.
    pub fn find_near_exact(&self, name: &str, threshold: f64) -> Option<String> {
        let entries = self.read();
        entries
            .keys()
            .map(|key| (similarity(name, key), key))
            .filter(|(score, _)| *score >= threshold)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then_with(|| b.1.cmp(a.1)))
            .map(|(_, key)| key.clone())
    }

    /// Fold `source_key` into `target_key` and delete the source.
    ///
    /// Returns `false` if either key is missing or they are the same key.
    pub fn merge_by_operator_choice(&self, source_key: &str, target_key: &str) -> bool {
        self.merge_strict(source_key, target_key).is_ok()
    }

    pub fn merge_strict(&self, source_key: &str, target_key: &str) -> Result<(), ThermologError> {
        if source_key == target_key {
            return Err(ThermologError::SelfMerge(source_key.to_string()));
        }

        let mut entries = self.write();
        if !entries.contains_key(target_key) {
            return Err(ThermologError::UnknownLocation(target_key.to_string()));
        }
        let source = entries
            .remove(source_key)
            .ok_or_else(|| ThermologError::UnknownLocation(source_key.to_string()))?;

        if let Some(target) = entries.get_mut(target_key) {
            target.source_count += source.source_count;
            target.last_seen = target.last_seen.max(source.last_seen);
            target.confidence = target.confidence.upgraded(source.confidence);
            info!(
                source = source_key,
                target = target_key,
                source_count = target.source_count,
                "merged location by operator choice"
            );
        }
        Ok(())
    }

    /// Mark `key` as reviewed, applying any overrides given.
    ///
    /// Returns `false` if the key is unknown.
    pub fn mark_configured(
        &self,
        key: &str,
        location_type: Option<LocationType>,
        min_temp: Option<f64>,
        max_temp: Option<f64>,
    ) -> bool {
        let mut entries = self.write();
        let Some(location) = entries.get_mut(key) else {
            debug!(key, "cannot configure unknown location");
            return false;
        };

        location.configured = true;
        if let Some(t) = location_type {
            location.location_type = t;
        }
        if min_temp.is_some() {
            location.min_temp = min_temp;
        }
        if max_temp.is_some() {
            location.max_temp = max_temp;
        }
        info!(key, "marked location as configured");
        true
    }

    /// Unreviewed entries, most credible and most frequently seen first.
    pub fn list_unconfigured(&self) -> Vec<DiscoveredLocation> {
        let mut unconfigured: Vec<DiscoveredLocation> =
            self.read().values().filter(|l| !l.configured).cloned().collect();
        unconfigured.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| b.source_count.cmp(&a.source_count))
                .then_with(|| a.key.cmp(&b.key))
        });
        unconfigured
    }

    pub fn get(&self, key: &str) -> Option<DiscoveredLocation> {
        self.read().get(key).cloned()
    }

    pub fn snapshot(&self) -> RegistryEntries {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn discovery_summary(&self) -> DiscoverySummary {
        let unconfigured = self.list_unconfigured();
        DiscoverySummary {
            total_discovered: self.len(),
            total_unconfigured: unconfigured.len(),
            unconfigured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationBlock;
    use chrono::{Duration, TimeZone};
    use store::MemoryStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 14, 18, 0, 0).unwrap()
    }

    fn seen(registry: &LocationRegistry, name: &str, confidence: Confidence) -> Observed {
        registry.observe_at(name, confidence, LocationType::Fridge, None, None, t0())
    }

    #[test]
    fn test_first_observation_creates_unconfigured_entry() {
        let registry = LocationRegistry::new();
        assert_eq!(seen(&registry, "Fridge A", Confidence::Low), Observed::New);

        let entry = registry.get("Fridge A").unwrap();
        assert_eq!(entry.display_name, "Fridge A");
        assert_eq!(entry.source_count, 1);
        assert!(!entry.configured);
        assert_eq!(entry.first_seen, entry.last_seen);
    }

    #[test]
    fn test_confidence_never_downgrades() {
        let registry = LocationRegistry::new();
        seen(&registry, "Fridge A", Confidence::Medium);
        assert_eq!(seen(&registry, "Fridge A", Confidence::Low), Observed::Existing);

        let entry = registry.get("Fridge A").unwrap();
        assert_eq!(entry.confidence, Confidence::Medium);
        assert_eq!(entry.source_count, 2);

        seen(&registry, "Fridge A", Confidence::High);
        assert_eq!(registry.get("Fridge A").unwrap().confidence, Confidence::High);
    }

    #[test]
    fn test_last_seen_never_moves_back() {
        let registry = LocationRegistry::new();
        let later = t0() + Duration::hours(2);
        registry.observe_at("Room", Confidence::Low, LocationType::Room, None, None, later);
        registry.observe_at("Room", Confidence::Low, LocationType::Room, None, None, t0());

        let entry = registry.get("Room").unwrap();
        assert_eq!(entry.last_seen, later);
        assert_eq!(entry.first_seen, later);
    }

    #[test]
    fn test_keys_are_case_preserving() {
        let registry = LocationRegistry::new();
        seen(&registry, "Fridge A", Confidence::Low);
        seen(&registry, "fridge a", Confidence::Low);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_merge_folds_source_into_target() {
        let registry = LocationRegistry::new();
        seen(&registry, "Fridge A", Confidence::Low);
        seen(&registry, "Fridge A", Confidence::Low);
        registry.observe_at(
            "Fridge A1",
            Confidence::High,
            LocationType::Fridge,
            None,
            None,
            t0() + Duration::days(1),
        );

        assert!(registry.merge_by_operator_choice("Fridge A1", "Fridge A"));

        let unconfigured = registry.list_unconfigured();
        assert!(unconfigured.iter().all(|l| l.key != "Fridge A1"));
        let target = unconfigured.iter().find(|l| l.key == "Fridge A").unwrap();
        assert_eq!(target.source_count, 3);
        assert_eq!(target.confidence, Confidence::High);
        assert_eq!(target.last_seen, t0() + Duration::days(1));
    }

    #[test]
    fn test_merge_with_missing_key_fails_without_change() {
        let registry = LocationRegistry::new();
        seen(&registry, "Fridge A", Confidence::Low);

        assert!(!registry.merge_by_operator_choice("Ghost", "Fridge A"));
        assert!(!registry.merge_by_operator_choice("Fridge A", "Ghost"));
        assert!(!registry.merge_by_operator_choice("Fridge A", "Fridge A"));
        assert_eq!(registry.get("Fridge A").unwrap().source_count, 1);

        let err = registry.merge_strict("Fridge A", "Ghost").unwrap_err();
        assert!(matches!(err, ThermologError::UnknownLocation(k) if k == "Ghost"));
    }

    #[test]
    fn test_configured_is_sticky_across_ingestion() {
        let registry = LocationRegistry::new();
        seen(&registry, "Fridge A", Confidence::Low);
        assert!(registry.mark_configured("Fridge A", Some(LocationType::Vaccine), None, Some(7.0)));
        seen(&registry, "Fridge A", Confidence::High);

        let entry = registry.get("Fridge A").unwrap();
        assert!(entry.configured);
        assert_eq!(entry.location_type, LocationType::Vaccine);
        assert_eq!(entry.max_temp, Some(7.0));
        assert!(registry.list_unconfigured().is_empty());
    }

    #[test]
    fn test_mark_configured_unknown_key() {
        let registry = LocationRegistry::new();
        assert!(!registry.mark_configured("Ghost", None, None, None));
    }

    #[test]
    fn test_unconfigured_ordering() {
        let registry = LocationRegistry::new();
        seen(&registry, "Low Busy", Confidence::Low);
        seen(&registry, "Low Busy", Confidence::Low);
        seen(&registry, "Low Busy", Confidence::Low);
        seen(&registry, "High Once", Confidence::High);
        seen(&registry, "Medium Twice", Confidence::Medium);
        seen(&registry, "Medium Twice", Confidence::Medium);
        seen(&registry, "Medium Once", Confidence::Medium);

        let keys: Vec<String> = registry.list_unconfigured().into_iter().map(|l| l.key).collect();
        assert_eq!(keys, ["High Once", "Medium Twice", "Medium Once", "Low Busy"]);
    }

    #[test]
    fn test_suggestions_exclude_near_exact_and_dissimilar() {
        let registry = LocationRegistry::new();
        for name in ["Fridge A", "Fridge B", "Dispensary", "fridge a1"] {
            seen(&registry, name, Confidence::Medium);
        }

        let suggestions =
            registry.suggest_merges("Fridge A1", DEFAULT_SUGGEST_THRESHOLD, NEAR_EXACT_THRESHOLD);
        let keys: Vec<&str> = suggestions.iter().map(|s| s.key.as_str()).collect();
        // "fridge a1" is an exact match ignoring case, "Dispensary" too far off
        assert_eq!(keys, ["Fridge A", "Fridge B"]);
        assert!(suggestions[0].similarity > suggestions[1].similarity);
    }

    #[test]
    fn test_find_near_exact() {
        let registry = LocationRegistry::new();
        seen(&registry, "Vaccine Fridge", Confidence::High);

        assert_eq!(
            registry.find_near_exact("vaccine fridge", NEAR_EXACT_THRESHOLD),
            Some("Vaccine Fridge".to_string())
        );
        assert_eq!(registry.find_near_exact("Fridge", NEAR_EXACT_THRESHOLD), None);
    }

    #[test]
    fn test_suffixed_name_suggested_not_merged() {
        let registry = LocationRegistry::new();
        seen(&registry, "Vaccine Fridge", Confidence::High);
        seen(&registry, "Main Fridge", Confidence::High);

        let name = "Vaccine Fridge (CL-01 Ward 3)";
        assert_eq!(registry.find_near_exact(name, NEAR_EXACT_THRESHOLD), None);
        let suggestions = registry.suggest_merges(name, DEFAULT_SUGGEST_THRESHOLD, NEAR_EXACT_THRESHOLD);
        let keys: Vec<&str> = suggestions.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["Vaccine Fridge", "Main Fridge"]);
        assert_eq!(suggestions[0].similarity, 90.0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reordered_name_is_near_exact() {
        let registry = LocationRegistry::new();
        seen(&registry, "Vaccine Fridge", Confidence::High);
        seen(&registry, "Main Fridge", Confidence::High);

        assert_eq!(
            registry.find_near_exact("Fridge Main", NEAR_EXACT_THRESHOLD),
            Some("Main Fridge".to_string())
        );
        let suggestions =
            registry.suggest_merges("Fridge Main", DEFAULT_SUGGEST_THRESHOLD, NEAR_EXACT_THRESHOLD);
        let keys: Vec<&str> = suggestions.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["Vaccine Fridge"]);
    }

    #[test]
    fn test_ingest_uses_structured_blocks() {
        let registry = LocationRegistry::new();
        let mut outcome = ParseOutcome::failed("report.pdf", "unused");
        outcome.success = true;
        outcome.error = None;
        outcome.locations = vec![LocationBlock {
            name: "Vaccine Fridge".into(),
            raw_name: "Vaccine Fridge".into(),
            description: None,
            device_serial: None,
            device_model: None,
            log_interval: None,
            min_threshold: None,
            max_threshold: None,
            header_line: 0,
        }];

        assert_eq!(registry.ingest(&outcome), 1);
        assert_eq!(registry.ingest(&outcome), 0);

        let entry = registry.get("Vaccine Fridge").unwrap();
        assert_eq!(entry.confidence, Confidence::High);
        assert_eq!(entry.location_type, LocationType::Vaccine);
        assert_eq!(entry.source_count, 2);
    }

    #[test]
    fn test_failed_outcome_not_ingested() {
        let registry = LocationRegistry::new();
        assert_eq!(registry.ingest(&ParseOutcome::failed("x.pdf", "boom")), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_open_and_flush_round_trip() {
        let registry = LocationRegistry::open(Box::new(MemoryStore::new())).unwrap();
        seen(&registry, "Fridge A", Confidence::Low);
        registry.flush().unwrap();

        let snapshot = registry.snapshot();
        let reopened = LocationRegistry::open(Box::new(MemoryStore::with_entries(snapshot))).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_concurrent_observations_all_counted() {
        let registry = LocationRegistry::new();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..25 {
                        seen(&registry, "Fridge A", Confidence::Low);
                    }
                });
            }
        });
        assert_eq!(registry.get("Fridge A").unwrap().source_count, 200);
    }

    #[test]
    fn test_discovery_summary() {
        let registry = LocationRegistry::new();
        seen(&registry, "Fridge A", Confidence::Low);
        seen(&registry, "Room", Confidence::Low);
        registry.mark_configured("Room", None, None, None);

        let summary = registry.discovery_summary();
        assert_eq!(summary.total_discovered, 2);
        assert_eq!(summary.total_unconfigured, 1);
        assert_eq!(summary.unconfigured[0].key, "Fridge A");
    }
}
