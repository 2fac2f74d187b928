use std::fmt;
use std::time::Duration;

use harvester_core::{AdapterOperation, FailureReason};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode { encoding: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode { encoding } => write!(f, "could not decode body as {encoding}"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Failure of a single Page Adapter call. Always retryable at session level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("page evaluation failed: {0}")]
    Extraction(String),
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Why one harvest attempt ended without completing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("could not open page adapter: {0}")]
    Open(AdapterError),
    #[error("{operation} failed: {message}")]
    Adapter {
        operation: AdapterOperation,
        message: String,
    },
    #[error("no reviews found on page {page}")]
    EmptyPage { page: u32 },
    #[error("content not advancing: page {page} repeated {repeats} times")]
    StalenessExceeded { page: u32, repeats: u32 },
    #[error("session stalled in phase {phase}")]
    Stalled { phase: String },
}

impl From<FailureReason> for SessionError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::Adapter { operation, message } => {
                SessionError::Adapter { operation, message }
            }
            FailureReason::EmptyPage { page } => SessionError::EmptyPage { page },
            FailureReason::StalenessExceeded { page, repeats } => {
                SessionError::StalenessExceeded { page, repeats }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("backend answered with http status {0}")]
    Http(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}
