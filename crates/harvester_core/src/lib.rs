//! Harvester core: review normalization, staleness and cutoff policies, and
//! the pure pagination state machine driving a harvest session.
mod cutoff;
mod date;
mod effect;
mod msg;
mod normalize;
mod record;
mod staleness;
mod state;
mod update;

pub use cutoff::{CutoffPolicy, CutoffScan, DEFAULT_BOUNDARY_YEAR};
pub use date::{looks_like_review_date, parse_review_date, ReviewDate};
pub use effect::{AdapterOperation, CompletionReason, Effect, FailureReason};
pub use msg::Msg;
pub use normalize::{
    parse_rating, NormalizeRules, Normalizer, ANONYMOUS_REVIEWER, NO_COMMENT_SENTINEL,
};
pub use record::{HarvestRecord, RawRecord};
pub use staleness::{
    Fingerprint, Granularity, Observation, StalenessDetector, DEFAULT_REPEAT_THRESHOLD,
};
pub use state::{HarvestSession, PageReport, Phase, SessionConfig};
pub use update::update;
