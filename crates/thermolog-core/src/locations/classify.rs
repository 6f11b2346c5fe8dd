use crate::model::LocationType;

const COLD_CHAIN_TERMS: &[&str] = &["vaccine", "immunization", "immunisation", "insulin"];
const FRIDGE_TERMS: &[&str] = &["fridge", "refrigerator", "medicine", "drug"];
const FREEZER_TERMS: &[&str] = &["freezer", "frozen"];
const ROOM_TERMS: &[&str] = &["room", "dispensary", "pharmacy", "office", "storage"];

/// Infer the type of a structured location from its name and description.
///
/// Vaccine and insulin terms outrank generic fridge terms; insulin storage
/// shares the vaccine cold-chain range, so both classify as `Vaccine`.
pub fn classify_location(name: &str, description: Option<&str>) -> LocationType {
    let combined = format!(
        "{} {}",
        name.to_lowercase(),
        description.unwrap_or("").to_lowercase()
    );
    let has = |terms: &[&str]| terms.iter().any(|t| combined.contains(t));

    if has(COLD_CHAIN_TERMS) {
        LocationType::Vaccine
    } else if has(FRIDGE_TERMS) {
        LocationType::Fridge
    } else if has(FREEZER_TERMS) {
        LocationType::Freezer
    } else if has(ROOM_TERMS) {
        LocationType::Room
    } else {
        LocationType::Custom
    }
}

/// Infer a type from free text around a heuristic match.
///
/// Wider than [`classify_location`]: also yields insulin and controlled-drug
/// storage, which only show up in unstructured text.
pub fn infer_type_from_context(line: &str, name: &str) -> LocationType {
    let line = line.to_lowercase();
    let name = name.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|t| line.contains(t) || name.contains(t));

    if has(&["fridge", "refrigerator"]) {
        if has(&["vaccine", "insulin"]) {
            return LocationType::Vaccine;
        }
        return LocationType::Fridge;
    }
    if has(&["freezer"]) {
        return LocationType::Freezer;
    }
    if has(&["room", "area", "zone"]) {
        return LocationType::Room;
    }
    if has(&["vaccine"]) {
        return LocationType::Vaccine;
    }
    if has(&["insulin"]) {
        return LocationType::Insulin;
    }
    if has(&["controlled", "schedule"]) {
        return LocationType::Controlled;
    }
    LocationType::Custom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vaccine_outranks_fridge() {
        assert_eq!(classify_location("Vaccine Fridge", None), LocationType::Vaccine);
        assert_eq!(
            classify_location("Fridge 2", Some("Insulin stock")),
            LocationType::Vaccine
        );
    }

    #[test]
    fn test_fridge_terms() {
        assert_eq!(classify_location("Main Refrigerator", None), LocationType::Fridge);
        assert_eq!(classify_location("Drug Store", None), LocationType::Fridge);
    }

    #[test]
    fn test_freezer_terms() {
        assert_eq!(classify_location("Freezer 1", None), LocationType::Freezer);
        assert_eq!(
            classify_location("Unit 7", Some("frozen goods")),
            LocationType::Freezer
        );
    }

    #[test]
    fn test_room_terms() {
        assert_eq!(classify_location("Dispensary", None), LocationType::Room);
        assert_eq!(classify_location("Back Office", None), LocationType::Room);
    }

    #[test]
    fn test_custom_default() {
        assert_eq!(classify_location("Probe 12", None), LocationType::Custom);
    }

    #[test]
    fn test_context_inference() {
        assert_eq!(
            infer_type_from_context("insulin cabinet 4.0c", "Insulin"),
            LocationType::Insulin
        );
        assert_eq!(
            infer_type_from_context("controlled drug storage cabinet", "Controlled"),
            LocationType::Controlled
        );
        assert_eq!(
            infer_type_from_context("storage area", "Storage Area"),
            LocationType::Room
        );
    }
}
