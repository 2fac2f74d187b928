use std::fmt;

/// Adapter work the session asks the driver to perform next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ResolveSubject,
    ExtractPage { page: u32 },
    CheckNextPage,
    AdvancePage { to_page: u32 },
    /// Terminal: forward the accumulated records.
    Complete(CompletionReason),
    /// Terminal: hand control back to the retry supervisor.
    Fail(FailureReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterOperation {
    ResolveSubject,
    ExtractPage,
    CheckNextPage,
    AdvancePage,
}

impl fmt::Display for AdapterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterOperation::ResolveSubject => write!(f, "resolve subject"),
            AdapterOperation::ExtractPage => write!(f, "extract page"),
            AdapterOperation::CheckNextPage => write!(f, "check next page"),
            AdapterOperation::AdvancePage => write!(f, "advance page"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// A record older than the boundary was found on `page`.
    CutoffReached { page: u32 },
    /// `page` had no enabled next control.
    PagesExhausted { page: u32 },
    /// The configured page ceiling was hit.
    PageLimitReached { page: u32 },
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionReason::CutoffReached { page } => write!(f, "cutoff reached on page {page}"),
            CompletionReason::PagesExhausted { page } => {
                write!(f, "no further pages after page {page}")
            }
            CompletionReason::PageLimitReached { page } => {
                write!(f, "page limit reached at page {page}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Adapter {
        operation: AdapterOperation,
        message: String,
    },
    /// Page yielded no admissible records while empty pages count as errors.
    EmptyPage { page: u32 },
    /// Content stopped changing between pages.
    StalenessExceeded { page: u32, repeats: u32 },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Adapter { operation, message } => {
                write!(f, "{operation} failed: {message}")
            }
            FailureReason::EmptyPage { page } => write!(f, "no reviews found on page {page}"),
            FailureReason::StalenessExceeded { page, repeats } => write!(
                f,
                "content not advancing: page {page} repeated {repeats} times"
            ),
        }
    }
}
