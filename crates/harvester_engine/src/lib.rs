//! Harvester engine: page adapters, the session driver, retry supervision
//! and delivery of harvested reviews.
mod adapter;
mod config;
mod engine;
mod fetch;
mod html;
mod site;
mod sink;
mod supervisor;
mod types;

pub use adapter::{AdapterFactory, PageAdapter};
pub use config::{FetchConfig, HarvestConfig, RetryConfig};
pub use engine::{run_session, CompletedSession};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use html::{HtmlAdapterFactory, HtmlPageAdapter, UNKNOWN_SUBJECT};
pub use site::{SiteProfile, SiteSelectors};
pub use sink::{HarvestBatch, HttpSink, SinkForwarder};
pub use supervisor::{HarvestOutcome, HarvestReport, RetryPolicy, RetrySupervisor};
pub use types::{AdapterError, FailureKind, FetchError, SessionError, SinkError};
