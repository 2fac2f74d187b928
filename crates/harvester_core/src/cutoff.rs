use crate::HarvestRecord;

pub const DEFAULT_BOUNDARY_YEAR: i32 = 2024;

/// Recency boundary that ends a harvest once reviews get too old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffPolicy {
    /// Records from a year strictly before this one are stale.
    pub boundary_year: i32,
    /// Whether a record whose date could not be parsed counts as stale.
    pub treat_unparsed_as_stale: bool,
}

impl Default for CutoffPolicy {
    fn default() -> Self {
        Self {
            boundary_year: DEFAULT_BOUNDARY_YEAR,
            treat_unparsed_as_stale: false,
        }
    }
}

/// Result of scanning one page in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffScan {
    /// Length of the page prefix that may be kept.
    pub admitted: usize,
    /// A stale record was found at index `admitted`; harvesting must stop.
    pub triggered: bool,
}

impl CutoffPolicy {
    pub fn is_stale(&self, record: &HarvestRecord) -> bool {
        let date = record.observed_at();
        if date.is_sentinel() {
            self.treat_unparsed_as_stale
        } else {
            date.year() < self.boundary_year
        }
    }

    /// Keeps every record before the first stale one. Records after it are
    /// dropped even if they are recent.
    pub fn scan(&self, page: &[HarvestRecord]) -> CutoffScan {
        match page.iter().position(|record| self.is_stale(record)) {
            Some(index) => CutoffScan {
                admitted: index,
                triggered: true,
            },
            None => CutoffScan {
                admitted: page.len(),
                triggered: false,
            },
        }
    }
}
