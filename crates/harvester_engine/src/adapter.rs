use harvester_core::RawRecord;

use crate::AdapterError;

/// Site-specific view of a live review listing.
///
/// Calls are never assumed idempotent; the session driver issues each one at
/// most once per page iteration and never overlaps two calls.
#[async_trait::async_trait]
pub trait PageAdapter: Send {
    /// Name of the entity under review, read once after the first navigation.
    async fn current_subject_name(&mut self) -> Result<String, AdapterError>;

    /// Raw records visible on the current page. An empty list is a valid answer.
    async fn extract_page(&mut self) -> Result<Vec<RawRecord>, AdapterError>;

    /// True iff a pagination control exists and is enabled.
    async fn has_next_page(&mut self) -> Result<bool, AdapterError>;

    async fn advance_page(&mut self) -> Result<(), AdapterError>;

    /// Release the underlying page handle. Called on every exit path.
    async fn close(&mut self) {}
}

/// Hands out a fresh [`PageAdapter`] for every harvest attempt.
#[async_trait::async_trait]
pub trait AdapterFactory: Send + Sync {
    /// Acquire a new page handle and perform the initial navigation.
    async fn open(&self) -> Result<Box<dyn PageAdapter>, AdapterError>;
}
