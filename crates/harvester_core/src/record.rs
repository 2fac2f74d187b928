use serde::Serialize;

use crate::ReviewDate;

/// Review fields exactly as an adapter scraped them off the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub reviewer: Option<String>,
    pub rating: Option<String>,
    pub comment: Option<String>,
    pub date: Option<String>,
}

impl RawRecord {
    pub fn new(
        reviewer: Option<&str>,
        rating: Option<&str>,
        comment: Option<&str>,
        date: Option<&str>,
    ) -> Self {
        Self {
            reviewer: reviewer.map(ToOwned::to_owned),
            rating: rating.map(ToOwned::to_owned),
            comment: comment.map(ToOwned::to_owned),
            date: date.map(ToOwned::to_owned),
        }
    }
}

/// One admitted review. Only the [`Normalizer`](crate::Normalizer) builds these,
/// so a positive rating and a real comment always hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestRecord {
    reviewer: String,
    rating: f64,
    comment: String,
    observed_at: ReviewDate,
    subject_name: String,
    source_id: String,
}

impl HarvestRecord {
    pub(crate) fn new(
        reviewer: String,
        rating: f64,
        comment: String,
        observed_at: ReviewDate,
        subject_name: String,
        source_id: String,
    ) -> Self {
        Self {
            reviewer,
            rating,
            comment,
            observed_at,
            subject_name,
            source_id,
        }
    }

    pub fn reviewer(&self) -> &str {
        &self.reviewer
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn observed_at(&self) -> ReviewDate {
        self.observed_at
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }
}
