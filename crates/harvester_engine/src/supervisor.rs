use std::time::Duration;

use engine_logging::{engine_error, engine_info, engine_warn};
use harvester_core::{CompletionReason, HarvestRecord, SessionConfig};

use crate::engine::{run_session, CompletedSession};
use crate::{AdapterError, AdapterFactory, HarvestBatch, SessionError, SinkForwarder};

/// Whole-session retry budget and backoff shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random delay added to every backoff.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(31);
        let exponential = self
            .base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay);
        let jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            0
        } else {
            fastrand::u64(0..=jitter_ms)
        };
        exponential + Duration::from_millis(jitter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HarvestOutcome {
    Completed {
        reason: CompletionReason,
        subject_name: String,
        pages: Vec<u32>,
        batch: HarvestBatch,
    },
    GaveUp {
        last_error: SessionError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    pub attempts: u32,
    pub backoff_delays: Vec<Duration>,
    pub outcome: HarvestOutcome,
    /// The sink accepted the batch. Never affects `outcome`.
    pub delivered: bool,
}

impl HarvestReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, HarvestOutcome::Completed { .. })
    }

    pub fn records(&self) -> &[HarvestRecord] {
        match &self.outcome {
            HarvestOutcome::Completed { batch, .. } => &batch.reviews,
            HarvestOutcome::GaveUp { .. } => &[],
        }
    }
}

/// Attempt counter and backoff history of one supervised harvest.
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    backoff_delays: Vec<Duration>,
}

/// Runs whole sessions until one completes or the retry budget is spent.
///
/// Each attempt gets a fresh adapter from the factory and a fresh session;
/// nothing collected by a failed attempt survives it. The sink is called once,
/// after the first completed attempt, and never for a failed one.
#[derive(Debug, Clone)]
pub struct RetrySupervisor {
    policy: RetryPolicy,
    operation_timeout: Duration,
}

impl RetrySupervisor {
    pub fn new(policy: RetryPolicy, operation_timeout: Duration) -> Self {
        Self {
            policy,
            operation_timeout,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn run(
        &self,
        factory: &dyn AdapterFactory,
        config: &SessionConfig,
        subject_id: &str,
        sink: &dyn SinkForwarder,
    ) -> HarvestReport {
        let max_attempts = self.policy.max_attempts();
        let mut state = RetryState::default();

        loop {
            state.attempt += 1;
            engine_info!(
                "Harvest attempt {} of {} for subject {} on {}",
                state.attempt,
                max_attempts,
                subject_id,
                config.source_id
            );

            let error = match self.attempt(factory, config.clone()).await {
                Ok(completed) => return self.deliver(state, completed, config, subject_id, sink).await,
                Err(error) => error,
            };

            engine_warn!("Attempt {} failed: {}", state.attempt, error);
            if state.attempt >= max_attempts {
                engine_error!(
                    "Max retry attempts reached for subject {} on {}; giving up without sending",
                    subject_id,
                    config.source_id
                );
                return HarvestReport {
                    attempts: state.attempt,
                    backoff_delays: state.backoff_delays,
                    outcome: HarvestOutcome::GaveUp { last_error: error },
                    delivered: false,
                };
            }

            let delay = self.policy.backoff(state.attempt);
            engine_info!("Retrying in {} ms", delay.as_millis());
            state.backoff_delays.push(delay);
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(
        &self,
        factory: &dyn AdapterFactory,
        config: SessionConfig,
    ) -> Result<CompletedSession, SessionError> {
        let mut adapter = match tokio::time::timeout(self.operation_timeout, factory.open()).await {
            Ok(Ok(adapter)) => adapter,
            Ok(Err(err)) => return Err(SessionError::Open(err)),
            Err(_) => {
                return Err(SessionError::Open(AdapterError::Timeout {
                    operation: "open page".to_string(),
                    after: self.operation_timeout,
                }))
            }
        };
        let result = run_session(adapter.as_mut(), config, self.operation_timeout).await;
        adapter.close().await;
        result
    }

    async fn deliver(
        &self,
        state: RetryState,
        completed: CompletedSession,
        config: &SessionConfig,
        subject_id: &str,
        sink: &dyn SinkForwarder,
    ) -> HarvestReport {
        let batch = HarvestBatch {
            reviews: completed.records,
            subject_id: subject_id.to_string(),
            source_id: config.source_id.clone(),
        };
        engine_info!("Total reviews scraped: {}", batch.reviews.len());

        let delivered = match sink.forward(&batch).await {
            Ok(()) => true,
            Err(err) => {
                engine_error!("Error sending reviews to backend: {}", err);
                false
            }
        };

        HarvestReport {
            attempts: state.attempt,
            backoff_delays: state.backoff_delays,
            outcome: HarvestOutcome::Completed {
                reason: completed.reason,
                subject_name: completed.subject_name,
                pages: completed.pages,
                batch,
            },
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_respects_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            max_jitter: Duration::ZERO,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn jitter_stays_within_bound() {
        let policy = RetryPolicy {
            max_jitter: Duration::from_millis(50),
            ..RetryPolicy::default()
        };
        for _ in 0..100 {
            let delay = policy.backoff(1);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2050));
        }
    }

    #[test]
    fn default_budget_is_three_attempts() {
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
    }
}
