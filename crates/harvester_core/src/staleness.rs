use std::fmt;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::HarvestRecord;

/// Consecutive repeats after which a session is abandoned.
pub const DEFAULT_REPEAT_THRESHOLD: u32 = 3;

/// How much of a page goes into its fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Every field of every record. Catches partial drift.
    #[default]
    FullPage,
    /// Only the first record's comment. Cheap, but only notices a repeated top record.
    LeadComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().take(4) {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Content differs from the previous page.
    Fresh,
    /// Same content as the previous page, still below the threshold.
    Repeated { repeats: u32 },
    /// Repeat threshold reached; the session must be abandoned.
    Exceeded { repeats: u32 },
}

/// Tracks page fingerprints across one session to spot pagination that stopped advancing.
#[derive(Debug, Clone)]
pub struct StalenessDetector {
    granularity: Granularity,
    threshold: u32,
    last: Option<Fingerprint>,
    repeat_count: u32,
}

impl StalenessDetector {
    pub fn new(granularity: Granularity, threshold: u32) -> Self {
        Self {
            granularity,
            threshold: threshold.max(1),
            last: None,
            repeat_count: 0,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn last_fingerprint(&self) -> Option<Fingerprint> {
        self.last
    }

    /// An empty page has a fingerprint of its own under both granularities,
    /// so a run of empty pages is detected like any other repeat.
    pub fn fingerprint(&self, page: &[HarvestRecord]) -> Fingerprint {
        let mut hasher = Sha256::new();
        match self.granularity {
            Granularity::FullPage => {
                hasher.update((page.len() as u64).to_le_bytes());
                for record in page {
                    hash_field(&mut hasher, record.reviewer().as_bytes());
                    hasher.update(record.rating().to_bits().to_le_bytes());
                    hash_field(&mut hasher, record.comment().as_bytes());
                    hash_field(&mut hasher, record.observed_at().to_string().as_bytes());
                }
            }
            Granularity::LeadComment => match page.first() {
                Some(lead) => hash_field(&mut hasher, lead.comment().as_bytes()),
                None => hasher.update([0u8]),
            },
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Fingerprint(bytes)
    }

    pub fn observe(&mut self, page: &[HarvestRecord]) -> Observation {
        let current = self.fingerprint(page);
        if self.last == Some(current) {
            self.repeat_count += 1;
            if self.repeat_count >= self.threshold {
                Observation::Exceeded {
                    repeats: self.repeat_count,
                }
            } else {
                Observation::Repeated {
                    repeats: self.repeat_count,
                }
            }
        } else {
            self.repeat_count = 0;
            self.last = Some(current);
            Observation::Fresh
        }
    }
}

fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
