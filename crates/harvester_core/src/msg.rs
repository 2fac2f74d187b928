use crate::{AdapterOperation, RawRecord};

/// Results of adapter calls, fed back into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin a fresh session.
    Start,
    /// The adapter named the entity under review.
    SubjectResolved(String),
    /// Raw records visible on the current page.
    PageExtracted(Vec<RawRecord>),
    /// Whether an enabled "next page" control exists.
    NextPageChecked(bool),
    /// Navigation to the next page finished.
    PageAdvanced,
    /// An adapter call failed or timed out.
    AdapterFailed {
        operation: AdapterOperation,
        message: String,
    },
}
