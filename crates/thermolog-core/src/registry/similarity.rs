use rapidfuzz::fuzz;
use std::collections::BTreeSet;

/// Penalty on the word-order-insensitive scores.
const UNBASE_SCALE: f64 = 0.95;

/// Length ratio from which substring matches are considered.
const PARTIAL_MIN_LEN_RATIO: f64 = 1.5;

/// Length ratio past which substring matches are weighted down hard.
const PARTIAL_WIDE_LEN_RATIO: f64 = 8.0;

/// Similarity of two names on a 0-100 scale, rounded to a whole number.
///
/// A weighted ratio: names are lowercased and stripped of punctuation, then
/// the best of several scores wins. Names of similar length are compared
/// whole and with their words sorted, so "Fridge Main" matches "Main
/// Fridge". When one name is much longer, its best-matching substring is
/// used instead, so a vendor suffix like "Vaccine Fridge (CL-01)" still
/// matches "Vaccine Fridge". An empty name matches nothing.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let base = ratio(&a, &b);
    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if len_ratio < PARTIAL_MIN_LEN_RATIO {
        base.max(token_sort_ratio(&a, &b, ratio) * UNBASE_SCALE)
            .max(token_set_ratio(&a, &b, ratio) * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio > PARTIAL_WIDE_LEN_RATIO { 0.6 } else { 0.9 };
        base.max(partial_ratio(&a, &b) * partial_scale)
            .max(token_sort_ratio(&a, &b, partial_ratio) * UNBASE_SCALE * partial_scale)
            .max(token_set_ratio(&a, &b, partial_ratio) * UNBASE_SCALE * partial_scale)
    };

    best.round()
}

/// Lowercase, punctuation to spaces, whitespace collapsed.
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Best [`ratio`] of the shorter string against every same-length window
/// of the longer one.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }

    let mut best: f64 = 0.0;
    for window in long.windows(short.len()) {
        let score = fuzz::ratio(short.iter().copied(), window.iter().copied()) * 100.0;
        best = best.max(score);
        if best >= 99.5 {
            break;
        }
    }
    best
}

fn sorted_words(s: &str) -> String {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

fn token_sort_ratio(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    scorer(&sorted_words(a), &sorted_words(b))
}

/// Scores the shared words against each side's shared-plus-remaining words.
fn token_set_ratio(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let words_a: BTreeSet<&str> = a.split_whitespace().collect();
    let words_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = words_a.intersection(&words_b).copied().collect::<Vec<_>>().join(" ");
    let only_a = words_a.difference(&words_b).copied().collect::<Vec<_>>().join(" ");
    let only_b = words_b.difference(&words_a).copied().collect::<Vec<_>>().join(" ");

    let with_a = format!("{shared} {only_a}").trim().to_string();
    let with_b = format!("{shared} {only_b}").trim().to_string();

    scorer(&shared, &with_a)
        .max(scorer(&shared, &with_b))
        .max(scorer(&with_a, &with_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_ignoring_case_and_punctuation() {
        assert_eq!(similarity("Fridge A", "fridge a"), 100.0);
        assert_eq!(similarity("Fridge-A", "fridge a."), 100.0);
    }

    #[test]
    fn test_empty_and_disjoint() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_near_names() {
        // 8 shared chars over 17
        assert_eq!(similarity("Fridge A1", "Fridge A"), 94.0);
        assert_eq!(similarity("Fridge A", "Fridge B"), 88.0);
    }

    #[test]
    fn test_vendor_suffix_scores_as_substring() {
        // whole-string ratio alone is 68
        assert_eq!(similarity("Vaccine Fridge (CL-01 Ward 3)", "Vaccine Fridge"), 90.0);
        assert_eq!(similarity("Vaccine Fridge", "Vaccine Fridge Sensor 2"), 90.0);
    }

    #[test]
    fn test_reordered_words() {
        assert_eq!(similarity("Fridge Main", "Main Fridge"), 95.0);
        assert_eq!(similarity("Room Storage B", "Storage Room B"), 95.0);
    }

    #[test]
    fn test_much_longer_name_weighted_down() {
        // length ratio above 8
        let s = similarity(
            "Fridge",
            "Fridge in the back corridor of ward three next to the pharmacy",
        );
        assert_eq!(s, 60.0);
    }

    #[test]
    fn test_symmetric() {
        assert_eq!(
            similarity("Dispensary", "Dispensary Room"),
            similarity("Dispensary Room", "Dispensary")
        );
    }
}
