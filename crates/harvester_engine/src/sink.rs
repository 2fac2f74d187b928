use std::time::Duration;

use engine_logging::engine_info;
use harvester_core::HarvestRecord;
use serde::Serialize;

use crate::SinkError;

/// Body of the single delivery made at the end of a harvest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestBatch {
    pub reviews: Vec<HarvestRecord>,
    pub subject_id: String,
    pub source_id: String,
}

#[async_trait::async_trait]
pub trait SinkForwarder: Send + Sync {
    async fn forward(&self, batch: &HarvestBatch) -> Result<(), SinkError>;
}

/// POSTs the batch as JSON to `{backend}/reviews`.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpSink {
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let endpoint = format!("{}/reviews", backend_url.trim_end_matches('/'));
        let endpoint = reqwest::Url::parse(&endpoint)
            .map_err(|err| SinkError::InvalidUrl(format!("{endpoint}: {err}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SinkError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait::async_trait]
impl SinkForwarder for HttpSink {
    async fn forward(&self, batch: &HarvestBatch) -> Result<(), SinkError> {
        if batch.reviews.is_empty() {
            engine_info!("No valid reviews found; nothing sent to backend");
            return Ok(());
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(batch)
            .send()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Http(status.as_u16()));
        }
        engine_info!(
            "Sent {} reviews for subject {} ({}) to backend",
            batch.reviews.len(),
            batch.subject_id,
            batch.source_id
        );
        Ok(())
    }
}
