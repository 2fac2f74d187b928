use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use engine_logging::{engine_error, engine_info, engine_warn};
use harvester_engine::{
    HarvestConfig, HarvestOutcome, HarvestReport, HtmlAdapterFactory, HttpSink, ReqwestFetcher,
    RetrySupervisor, SiteProfile,
};

use crate::settings::Job;

/// One subject on one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub subject_id: String,
    /// Profile id; detected from the URL host when absent.
    pub site: Option<String>,
}

pub fn resolve_profile(profiles: &[SiteProfile], target: &Target) -> anyhow::Result<SiteProfile> {
    let profile = match &target.site {
        Some(site) => SiteProfile::find(profiles, site)
            .ok_or_else(|| anyhow!("unknown site {site:?}"))?,
        None => SiteProfile::detect(profiles, &target.url).ok_or_else(|| {
            anyhow!(
                "no site profile matches {}; pass --site with one of: {}",
                target.url,
                profiles
                    .iter()
                    .map(|p| p.source_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?,
    };
    Ok(profile.clone())
}

/// Runs one supervised harvest. Errors are setup problems only; a harvest
/// that gives up is reported through the returned [`HarvestReport`].
pub async fn harvest(
    config: &HarvestConfig,
    target: &Target,
    captured_on: NaiveDate,
) -> anyhow::Result<HarvestReport> {
    let profile = resolve_profile(&config.profiles(), target)?;
    let session = config.session_config(&profile, captured_on);
    engine_info!(
        "Harvesting {} on {} for subject {} (boundary year {})",
        target.url,
        profile.source_id,
        target.subject_id,
        config.boundary_year
    );

    let fetcher = Arc::new(ReqwestFetcher::new(config.fetch_settings()));
    let factory =
        HtmlAdapterFactory::new(fetcher, profile, target.url.clone(), config.page_retry_limit);
    let sink = HttpSink::new(&config.backend_url, config.sink_timeout())
        .context("invalid backend configuration")?;
    let supervisor = RetrySupervisor::new(config.retry_policy(), config.operation_timeout());

    let report = supervisor
        .run(&factory, &session, &target.subject_id, &sink)
        .await;
    log_report(target, &report);
    Ok(report)
}

/// Runs every job link in turn. True only if all of them completed.
pub async fn harvest_jobs(config: &HarvestConfig, jobs: &[Job], captured_on: NaiveDate) -> bool {
    let mut failed = 0usize;
    let mut total = 0usize;

    for job in jobs {
        for (site, url) in &job.links {
            if url.trim().is_empty() {
                continue;
            }
            total += 1;
            let target = Target {
                url: url.clone(),
                subject_id: job.subject_id.clone(),
                site: Some(site.clone()),
            };
            match harvest(config, &target, captured_on).await {
                Ok(report) if report.is_success() => {}
                Ok(_) => failed += 1,
                Err(err) => {
                    engine_error!("Job {} on {} not started: {:#}", job.subject_id, site, err);
                    failed += 1;
                }
            }
        }
    }

    engine_info!("Jobs finished: {} of {} succeeded", total - failed, total);
    failed == 0
}

fn log_report(target: &Target, report: &HarvestReport) {
    match &report.outcome {
        HarvestOutcome::Completed {
            reason,
            subject_name,
            pages,
            batch,
        } => {
            engine_info!(
                "{} ({}): {} reviews from {} pages after {} attempt(s), {}",
                subject_name,
                target.subject_id,
                batch.reviews.len(),
                pages.len(),
                report.attempts,
                reason
            );
            if !report.delivered {
                engine_warn!("Reviews for {} were not delivered", target.subject_id);
            }
        }
        HarvestOutcome::GaveUp { last_error } => engine_error!(
            "Gave up on {} after {} attempt(s): {}",
            target.subject_id,
            report.attempts,
            last_error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str, site: Option<&str>) -> Target {
        Target {
            url: url.to_string(),
            subject_id: "42".to_string(),
            site: site.map(str::to_string),
        }
    }

    #[test]
    fn profile_is_detected_from_host() {
        let profiles = SiteProfile::builtin();
        let profile = resolve_profile(
            &profiles,
            &target("https://www.traveloka.com/id-id/hotel/detail?spec=1", None),
        )
        .unwrap();
        assert_eq!(profile.source_id, "traveloka");
    }

    #[test]
    fn explicit_site_wins_over_host() {
        let profiles = SiteProfile::builtin();
        let profile = resolve_profile(
            &profiles,
            &target("https://mirror.example.com/hotel", Some("TripCom")),
        )
        .unwrap();
        assert_eq!(profile.source_id, "tripcom");
    }

    #[test]
    fn unknown_host_is_rejected() {
        let profiles = SiteProfile::builtin();
        let err = resolve_profile(&profiles, &target("https://example.com/hotel", None))
            .unwrap_err();
        assert!(err.to_string().contains("--site"));

        let err = resolve_profile(&profiles, &target("https://example.com", Some("booking")))
            .unwrap_err();
        assert!(err.to_string().contains("unknown site"));
    }

    #[tokio::test]
    async fn jobs_without_links_succeed_trivially() {
        let jobs = vec![Job {
            subject_id: "1".to_string(),
            links: [("agoda".to_string(), "  ".to_string())].into_iter().collect(),
        }];
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(harvest_jobs(&HarvestConfig::default(), &jobs, today).await);
    }

    #[tokio::test]
    async fn job_with_unknown_site_fails() {
        let jobs = vec![Job {
            subject_id: "1".to_string(),
            links: [("booking".to_string(), "https://example.com".to_string())]
                .into_iter()
                .collect(),
        }];
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(!harvest_jobs(&HarvestConfig::default(), &jobs, today).await);
    }
}
