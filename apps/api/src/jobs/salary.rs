use serde::Serialize;

use crate::models::job::JobPosting;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

impl SalaryRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalarySummary {
    pub average: Option<f64>,
    pub counted: usize,
    pub skipped: usize,
}

/// Parses strings like `$59K-$99K`, `59,000 - 99,000` or `$75K`.
/// Returns `None` for anything malformed or with min > max.
pub fn parse_salary_range(raw: &str) -> Option<SalaryRange> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut bounds = raw.splitn(2, ['-', '–']);
    let min = parse_amount(bounds.next()?)?;
    let max = match bounds.next() {
        Some(upper) => parse_amount(upper)?,
        None => min,
    };

    (min <= max).then_some(SalaryRange { min, max })
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value: f64 = digits.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value * multiplier)
}

/// Mean salary midpoint. Malformed or missing salary strings are skipped one
/// by one and counted, never aborting the rest.
pub fn average_salary<'a>(postings: impl IntoIterator<Item = &'a JobPosting>) -> SalarySummary {
    let mut total = 0.0;
    let mut counted = 0;
    let mut skipped = 0;

    for posting in postings {
        match posting.salary_range.as_deref().and_then(parse_salary_range) {
            Some(range) => {
                total += range.midpoint();
                counted += 1;
            }
            None => skipped += 1,
        }
    }

    SalarySummary {
        average: (counted > 0).then(|| total / counted as f64),
        counted,
        skipped,
    }
}
