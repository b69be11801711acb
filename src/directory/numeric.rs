//! Numbers embedded in free-text record fields.
//!
//! Fee, placement and package values arrive as display text ("₹1.2L - ₹1.5L/year",
//! "92%", "12 LPA"). The sort keys and the filter thresholds read them differently,
//! so each reading has its own function.

use regex::Regex;
use std::sync::LazyLock;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid decimal regex"));

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(cr|crore|l|lakh|lpa|k)?").expect("valid amount regex")
});

/// Sort key for `lowest-fees`: every non-digit character is stripped and the
/// remaining digits are read as one integer. Missing or digitless text sorts last.
///
/// "₹1.2L - ₹1.5L/year" reads as 1215, "₹80K - ₹1.5L/year" as 8015.
pub fn fee_sort_key(fee_range: Option<&str>) -> f64 {
    let digits: String = fee_range
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return f64::INFINITY;
    }
    // f64 keeps arbitrarily long digit runs orderable without overflow.
    digits.parse().unwrap_or(f64::INFINITY)
}

/// First decimal number in the text, e.g. 92.5 for "92.5% placed".
pub fn first_decimal(text: &str) -> Option<f64> {
    DECIMAL.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Sort key for `highest-placement`; missing or numberless text counts as 0.
pub fn placement_sort_key(placement_percent: Option<&str>) -> f64 {
    placement_percent.and_then(first_decimal).unwrap_or(0.0)
}

/// Lower bound of a fee range in rupees.
///
/// `K` multiplies by a thousand, `L`/`Lakh` by a hundred thousand and
/// `Cr`/`Crore` by ten million. A bare number is already in rupees.
pub fn fee_lower_bound_rupees(fee_range: &str) -> Option<f64> {
    let caps = AMOUNT.captures(fee_range)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2).map(|u| u.as_str().to_ascii_lowercase()) {
        Some(unit) if unit == "k" => 1_000.0,
        Some(unit) if unit == "l" || unit == "lakh" || unit == "lpa" => 100_000.0,
        Some(unit) if unit == "cr" || unit == "crore" => 10_000_000.0,
        _ => 1.0,
    };
    Some(value * multiplier)
}

/// A package figure in lakhs per annum.
///
/// "12 LPA" and "₹12.5 L" are already in lakhs; "1.2 Cr" is 120 lakhs;
/// "₹800K" is 8 lakhs. A bare number is assumed to be LPA.
pub fn package_lpa(package: &str) -> Option<f64> {
    let caps = AMOUNT.captures(package)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lpa = match caps.get(2).map(|u| u.as_str().to_ascii_lowercase()) {
        Some(unit) if unit == "cr" || unit == "crore" => value * 100.0,
        Some(unit) if unit == "k" => value / 100.0,
        _ => value,
    };
    Some(lpa)
}
