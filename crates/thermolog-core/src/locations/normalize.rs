use std::collections::HashMap;
use std::sync::LazyLock;

const FILLER_WORDS: &[&str] = &["the", "a", "an", "of", "for", "at", "in", "on"];

/// Normalize a heuristically matched location name for display and dedup.
///
/// Steps:
/// 1. Lowercase and split on whitespace
/// 2. Drop filler words ("the", "of", ...)
/// 3. Map known terms to their standard spelling ("ref" -> "Fridge")
/// 4. Title-case everything else
///
/// Returns an empty string when nothing meaningful is left.
pub fn normalize_location_name(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();

    lower
        .split_whitespace()
        .filter(|w| !FILLER_WORDS.contains(w))
        .map(|w| match STANDARD_TERMS.get(w) {
            Some(standard) => standard.to_string(),
            None => title_case(w),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether a normalized name is too generic to identify a location alone.
pub fn is_generic_name(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "fridge" | "room" | "area" | "storage"
    )
}

static STANDARD_TERMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Equipment
    m.insert("fridge", "Fridge");
    m.insert("refrigerator", "Fridge");
    m.insert("ref", "Fridge");
    m.insert("freezer", "Freezer");

    // Areas
    m.insert("room", "Room");
    m.insert("area", "Area");
    m.insert("zone", "Zone");
    m.insert("storage", "Storage");

    // Pharmacy
    m.insert("vaccine", "Vaccine");
    m.insert("medicine", "Medicine");
    m.insert("drug", "Drug");
    m.insert("pharmacy", "Pharmacy");

    // Qualifiers
    m.insert("main", "Main");
    m.insert("primary", "Primary");
    m.insert("central", "Central");
    m.insert("backup", "Backup");

    m
});
