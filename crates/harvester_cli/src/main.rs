//! `harvester`: collect reviews for one subject from a listing site and
//! deliver them to the backend.
//!
//! ```bash
//! # Single harvest, site detected from the URL host
//! harvester https://www.agoda.com/hotel-indah/hotel/jakarta-id.html 42
//!
//! # Explicit site, custom settings, verbose log to a file
//! harvester --site tripcom --config ./harvester.ron --verbose --log-file harvest.log <url> 42
//!
//! # Every subject and site listed in a jobs file
//! harvester --jobs ./jobs.ron
//! ```

mod logging;
mod run;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info};

use crate::logging::LogDestination;

/// Harvest hotel reviews page by page and forward them to the backend.
#[derive(Debug, Parser)]
#[command(name = "harvester", version)]
struct Cli {
    /// Listing page of the subject to harvest.
    #[arg(required_unless_present = "jobs")]
    url: Option<String>,

    /// Backend identifier of the subject.
    #[arg(required_unless_present = "jobs")]
    subject_id: Option<String>,

    /// Site profile to use instead of detecting it from the URL host.
    #[arg(long)]
    site: Option<String>,

    /// Settings file (RON). Built-in defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reviews from before this year end the harvest.
    #[arg(long)]
    boundary_year: Option<i32>,

    /// Base URL of the backend receiving the reviews.
    #[arg(long)]
    backend_url: Option<String>,

    /// Run every subject and site listed in this RON file.
    #[arg(long, conflicts_with_all = ["url", "subject_id", "site"])]
    jobs: Option<PathBuf>,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, cli.verbose);

    let mut config = settings::load_config(cli.config.as_deref())?;
    if let Some(year) = cli.boundary_year {
        config.boundary_year = year;
    }
    if let Some(backend) = &cli.backend_url {
        config.backend_url = backend.clone();
    }
    let captured_on = chrono::Local::now().date_naive();

    let succeeded = match &cli.jobs {
        Some(path) => {
            let jobs = settings::load_jobs(path)?;
            engine_info!("Loaded {} jobs from {:?}", jobs.len(), path);
            run::harvest_jobs(&config, &jobs, captured_on).await
        }
        None => {
            let target = run::Target {
                url: cli.url.context("missing subject URL")?,
                subject_id: cli.subject_id.context("missing subject id")?,
                site: cli.site,
            };
            let report = run::harvest(&config, &target, captured_on).await?;
            report.is_success()
        }
    };

    if succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        engine_error!("Harvest did not complete");
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn single_harvest_needs_url_and_subject() {
        let cli = Cli::try_parse_from(["harvester", "https://www.agoda.com/h", "42"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://www.agoda.com/h"));
        assert_eq!(cli.subject_id.as_deref(), Some("42"));

        let err = Cli::try_parse_from(["harvester", "https://www.agoda.com/h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn jobs_replace_positional_arguments() {
        let cli = Cli::try_parse_from(["harvester", "--jobs", "jobs.ron", "-v"]).unwrap();
        assert_eq!(cli.jobs, Some(PathBuf::from("jobs.ron")));
        assert!(cli.verbose);
        assert!(cli.url.is_none());

        let err = Cli::try_parse_from(["harvester", "--jobs", "jobs.ron", "--site", "agoda"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn overrides_are_parsed() {
        let cli = Cli::try_parse_from([
            "harvester",
            "--boundary-year",
            "2023",
            "--backend-url",
            "http://backend:8080",
            "--site",
            "tripcom",
            "https://example.com/h",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.boundary_year, Some(2023));
        assert_eq!(cli.backend_url.as_deref(), Some("http://backend:8080"));
        assert_eq!(cli.site.as_deref(), Some("tripcom"));
    }
}
