//! Field parsers that turn free-text card fragments into typed values.
//!
//! Every function here is total: unparseable input yields `None`, `0`, or a
//! default label, never an error. See [`crate::normalize`] for how they
//! compose into a [`tours_core::NormalizedTour`].

use std::sync::LazyLock;

use regex::Regex;

/// Hours counted for each day of a multi-day tour.
pub const HOURS_PER_DAY: f64 = 8.0;

/// Category assigned when a card carries no category label.
pub const DEFAULT_CATEGORY: &str = "Day Tours";

static DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:days?|d)\b").expect("valid day regex")
});

// `(?:\b|\d)` lets compact forms like "2h30m" match the hour part.
static HOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:hours?|hrs?|h)(?:\b|\d)").expect("valid hour regex")
});

static MINUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?|m)\b").expect("valid minute regex")
});

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[$€£]\s*)?(\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)")
        .expect("valid price regex")
});

static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+|\d+").expect("valid count regex"));

/// Raw duration text paired with its value in hours, if one could be derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDuration {
    /// The input, verbatim.
    pub text: String,
    pub hours: Option<f64>,
}

/// Parses a duration such as `"2 hours 30 minutes"`, `"1 day"` or `"90 min"`.
///
/// Precedence is days, then hours (plus any minutes), then minutes alone.
/// A day match counts [`HOURS_PER_DAY`] hours per day and ignores minutes.
#[must_use]
pub fn parse_duration(text: &str) -> ParsedDuration {
    ParsedDuration {
        text: text.to_string(),
        hours: duration_hours(text),
    }
}

fn duration_hours(text: &str) -> Option<f64> {
    if let Some(days) = first_number(&DAY_RE, text) {
        return Some(days * HOURS_PER_DAY);
    }

    let minutes = first_number(&MINUTE_RE, text);
    match first_number(&HOUR_RE, text) {
        Some(hours) => Some(hours + minutes.unwrap_or(0.0) / 60.0),
        None => minutes.map(|m| m / 60.0),
    }
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses the first currency-like number in `text`.
///
/// Accepts an optional leading `$`, `€` or `£`, comma thousands separators,
/// and exactly two decimal digits. `"$45.00"` → `45.0`, `"1,250 BHD"` →
/// `1250.0`, `"Free"` → `None`.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(text)?;
    let digits = caps.get(1)?.as_str().replace(',', "");
    digits.parse::<f64>().ok()
}

/// Parses the first integer in a review count fragment such as `"(1,204)"`.
///
/// Returns `0` when no integer is present or it does not fit in a `u32`.
#[must_use]
pub fn parse_review_count(text: &str) -> u32 {
    COUNT_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok())
        .unwrap_or(0)
}

/// Maps a source category label to the canonical category name.
///
/// Unknown labels pass through (trimmed); an empty label maps to
/// [`DEFAULT_CATEGORY`].
#[must_use]
pub fn map_category(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }

    let canonical = match label {
        "Food Tours" | "Food & Drink" | "Cooking Classes" => "Food",
        "Cultural Tours" | "Cultural & Theme Tours" => "Cultural",
        "Historical Tours" | "Historical & Heritage Tours" => "Historical",
        "Walking Tours" => "Walking",
        "Boat Tours" | "Boat Tours & Water Sports" | "Dolphin & Whale Watching" => "Boat",
        "Desert Tours" | "4WD Tours" | "Off-Road & ATV Tours" => "Desert",
        "City Tours" | "Sightseeing Tours" | "Bus Tours" => "City",
        "Private Tours" | "Private Sightseeing Tours" => "Private",
        "Day Trips" | "Full-day Tours" | "Half-day Tours" | "Day Tours" => DEFAULT_CATEGORY,
        "Multi-day Tours" => "Multi-day",
        "Nightlife" | "Night Tours" => "Night",
        other => other,
    };
    canonical.to_string()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
