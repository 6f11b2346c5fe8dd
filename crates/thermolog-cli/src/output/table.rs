use thermolog_core::model::{ParseOutcome, SampleKind};
use thermolog_core::registry::{DiscoveredLocation, MergeSuggestion};

pub fn format_outcome(outcome: &ParseOutcome) -> String {
    let mut out = String::new();

    out.push_str(&format!("Report: {}\n", outcome.source));
    out.push_str(&format!(
        "  {} location(s), {} chars of text\n\n",
        outcome.locations.len(),
        outcome.text_length
    ));

    if outcome.locations.is_empty() {
        out.push_str("  No location blocks found.\n");
        return out;
    }

    let max_name = outcome
        .locations
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(10)
        .max("Location".len());

    out.push_str(&format!(
        "  {:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  Serial\n",
        "Location",
        "Min",
        "Max",
        "Alarm lo",
        "Alarm hi",
        width = max_name
    ));
    out.push_str(&format!("  {}\n", "-".repeat(max_name + 50)));

    for loc in &outcome.locations {
        let sample = |kind: SampleKind| {
            outcome
                .temperatures
                .iter()
                .find(|t| t.location_name == loc.name && t.kind == kind)
                .map(|t| format!("{:.1}", t.value))
                .unwrap_or_else(|| "-".into())
        };
        out.push_str(&format!(
            "  {:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {}\n",
            loc.name,
            sample(SampleKind::Minimum),
            sample(SampleKind::Maximum),
            fmt_opt(loc.min_threshold),
            fmt_opt(loc.max_threshold),
            loc.device_serial.as_deref().unwrap_or("-"),
            width = max_name
        ));
    }

    match &outcome.daily_summary {
        Some(summary) => {
            out.push_str(&format!(
                "\nDaily summary {} ({} location(s))\n",
                summary.date,
                summary.locations.len()
            ));
            for row in &summary.locations {
                out.push_str(&format!(
                    "  {:<width$}  {:.1} to {:.1} °C over {} reading(s)\n",
                    row.location,
                    row.min_temp,
                    row.max_temp,
                    row.readings_count,
                    width = max_name
                ));
            }
        }
        None => out.push_str("\nNo complete min/max readings for a daily summary.\n"),
    }

    out
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())
}

pub fn print_locations(locations: &[DiscoveredLocation]) {
    if locations.is_empty() {
        println!("No locations.");
        return;
    }

    let max_key = locations
        .iter()
        .map(|l| l.key.chars().count())
        .max()
        .unwrap_or(10)
        .max("Key".len());

    println!(
        "  {:<width$}  {:<10}  {:<6}  {:>6}  {:>6}  {:>5}  {:<10}  Last seen",
        "Key",
        "Type",
        "Conf",
        "Min",
        "Max",
        "Seen",
        "Status",
        width = max_key
    );
    println!("  {}", "-".repeat(max_key + 75));

    for l in locations {
        let status = if l.configured { "configured" } else { "pending" };
        println!(
            "  {:<width$}  {:<10}  {:<6}  {:>6}  {:>6}  {:>5}  {:<10}  {}",
            l.key,
            l.location_type.to_string(),
            l.confidence.to_string(),
            fmt_opt(l.min_temp),
            fmt_opt(l.max_temp),
            l.source_count,
            status,
            l.last_seen.format("%Y-%m-%d %H:%M"),
            width = max_key
        );
    }
}

pub fn print_suggestions(name: &str, suggestions: &[MergeSuggestion]) {
    println!("Possible matches for '{name}':\n");
    for s in suggestions {
        let configured = if s.configured { " (configured)" } else { "" };
        println!(
            "  {:>5.1}%  {}  [{}]{}",
            s.similarity, s.key, s.location_type, configured
        );
    }
    println!("\nMerge with: thermolog locations merge '{name}' '<key>'");
}
