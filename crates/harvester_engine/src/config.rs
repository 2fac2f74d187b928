use std::time::Duration;

use chrono::NaiveDate;
use harvester_core::{
    CutoffPolicy, Granularity, SessionConfig, DEFAULT_BOUNDARY_YEAR, DEFAULT_REPEAT_THRESHOLD,
};
use serde::Deserialize;

use crate::fetch::DEFAULT_USER_AGENT;
use crate::{FetchSettings, RetryPolicy, SiteProfile};

/// Harvest settings, typically read from a RON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    /// Reviews from before this year end the harvest.
    pub boundary_year: i32,
    /// Overrides the site profile when set.
    pub treat_unparsed_as_stale: Option<bool>,
    /// Overrides the site profile when set.
    pub empty_page_is_error: Option<bool>,
    /// Overrides the site profile when set.
    pub granularity: Option<Granularity>,
    pub repeat_threshold: u32,
    pub max_pages: Option<u32>,
    /// Ceiling for any single adapter call.
    pub operation_timeout_ms: u64,
    /// Attempts per page fetch before the adapter gives up on it.
    pub page_retry_limit: u32,
    pub backend_url: String,
    pub sink_timeout_ms: u64,
    pub retry: RetryConfig,
    pub fetch: FetchConfig,
    /// Extra site profiles; one with a built-in `source_id` replaces it.
    pub sites: Vec<SiteProfile>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            boundary_year: DEFAULT_BOUNDARY_YEAR,
            treat_unparsed_as_stale: None,
            empty_page_is_error: None,
            granularity: None,
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
            max_pages: None,
            operation_timeout_ms: 30_000,
            page_retry_limit: 3,
            backend_url: "http://127.0.0.1:5000".to_string(),
            sink_timeout_ms: 30_000,
            retry: RetryConfig::default(),
            fetch: FetchConfig::default(),
            sites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 2_000,
            max_delay_ms: 60_000,
            max_jitter_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
            allowed_content_types: settings.allowed_content_types,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HarvestConfig {
    /// Built-in profiles with configured ones layered on top.
    pub fn profiles(&self) -> Vec<SiteProfile> {
        let mut profiles: Vec<SiteProfile> = SiteProfile::builtin()
            .into_iter()
            .filter(|builtin| {
                !self
                    .sites
                    .iter()
                    .any(|custom| custom.source_id.eq_ignore_ascii_case(&builtin.source_id))
            })
            .collect();
        profiles.extend(self.sites.iter().cloned());
        profiles
    }

    pub fn session_config(&self, profile: &SiteProfile, captured_on: NaiveDate) -> SessionConfig {
        SessionConfig {
            source_id: profile.source_id.clone(),
            rules: profile.normalize_rules(),
            cutoff: CutoffPolicy {
                boundary_year: self.boundary_year,
                treat_unparsed_as_stale: self
                    .treat_unparsed_as_stale
                    .unwrap_or(profile.treat_unparsed_as_stale),
            },
            granularity: self.granularity.unwrap_or(profile.granularity),
            repeat_threshold: self.repeat_threshold,
            empty_page_is_error: self
                .empty_page_is_error
                .unwrap_or(profile.empty_page_is_error),
            max_pages: self.max_pages,
            captured_on,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            max_jitter: Duration::from_millis(self.retry.max_jitter_ms),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.fetch.request_timeout_ms),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
            allowed_content_types: self.fetch.allowed_content_types.clone(),
            user_agent: self.fetch.user_agent.clone(),
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }
}
