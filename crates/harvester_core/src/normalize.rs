use chrono::NaiveDate;

use crate::{parse_review_date, HarvestRecord, RawRecord, ReviewDate};

pub const ANONYMOUS_REVIEWER: &str = "Anonymous";
pub const NO_COMMENT_SENTINEL: &str = "-";

/// Per-site knobs for turning raw fields into a [`HarvestRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeRules {
    /// Multiplier bringing the site's score onto the common 0-10 scale.
    pub rating_scale: f64,
    /// Placeholder the site renders instead of an empty comment.
    pub no_comment_sentinel: String,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            rating_scale: 1.0,
            no_comment_sentinel: NO_COMMENT_SENTINEL.to_string(),
        }
    }
}

/// Validates and canonicalizes raw records for one session.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: NormalizeRules,
    subject_name: String,
    source_id: String,
    captured_on: NaiveDate,
}

impl Normalizer {
    pub fn new(
        rules: NormalizeRules,
        subject_name: impl Into<String>,
        source_id: impl Into<String>,
        captured_on: NaiveDate,
    ) -> Self {
        Self {
            rules,
            subject_name: subject_name.into(),
            source_id: source_id.into(),
            captured_on,
        }
    }

    /// Returns `None` when the rating is missing or not positive, or the
    /// comment is empty or the no-comment placeholder. An unreadable date
    /// never rejects a record; it becomes [`ReviewDate::SENTINEL`].
    pub fn normalize(&self, raw: &RawRecord) -> Option<HarvestRecord> {
        let rating = raw.rating.as_deref().and_then(parse_rating)? * self.rules.rating_scale;
        if !rating.is_finite() || rating <= 0.0 {
            return None;
        }

        let comment = raw.comment.as_deref().map(str::trim).unwrap_or_default();
        if comment.is_empty() || comment == self.rules.no_comment_sentinel {
            return None;
        }

        let reviewer = raw
            .reviewer
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS_REVIEWER);

        let observed_at = raw
            .date
            .as_deref()
            .and_then(|text| parse_review_date(text, self.captured_on))
            .unwrap_or(ReviewDate::SENTINEL);

        Some(HarvestRecord::new(
            reviewer.to_string(),
            rating,
            comment.to_string(),
            observed_at,
            self.subject_name.clone(),
            self.source_id.clone(),
        ))
    }

    pub fn normalize_page(&self, raw: &[RawRecord]) -> Vec<HarvestRecord> {
        raw.iter().filter_map(|record| self.normalize(record)).collect()
    }
}

/// Reads the first number out of a score label such as `8,6`, `9.2/10` or
/// `Score 4.5`. Accepts a comma as decimal separator. Only positive finite
/// values are returned.
pub fn parse_rating(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    // A sign or a letter glued to the number means it is not a plain score.
    if text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c == '-' || c.is_alphabetic())
    {
        return None;
    }
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value: f64 = number.trim_end_matches('.').parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}
