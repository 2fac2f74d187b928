use std::future::Future;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_trace, engine_warn};
use harvester_core::{
    update, AdapterOperation, CompletionReason, Effect, HarvestRecord, HarvestSession, Msg,
    Observation, SessionConfig,
};

use crate::{AdapterError, PageAdapter, SessionError};

/// What a successful session hands back to the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub reason: CompletionReason,
    pub subject_name: String,
    pub pages: Vec<u32>,
    pub records: Vec<HarvestRecord>,
}

/// Runs one session to termination, executing each effect of the pure state
/// machine against `adapter`. Every adapter call is bounded by
/// `operation_timeout`; a timeout fails the session like any adapter error.
pub async fn run_session(
    adapter: &mut dyn PageAdapter,
    config: SessionConfig,
    operation_timeout: Duration,
) -> Result<CompletedSession, SessionError> {
    let (mut session, mut next) = update(HarvestSession::new(config), Msg::Start);

    loop {
        let Some(effect) = next.take() else {
            return Err(SessionError::Stalled {
                phase: format!("{:?}", session.phase()),
            });
        };

        let msg = match effect {
            Effect::ResolveSubject => {
                let op = AdapterOperation::ResolveSubject;
                match bounded(op, operation_timeout, adapter.current_subject_name()).await {
                    Ok(name) => {
                        engine_info!("Subject: {}", name.trim());
                        Msg::SubjectResolved(name)
                    }
                    Err(err) => failed(op, err),
                }
            }
            Effect::ExtractPage { page } => {
                engine_info!("Scraping page {}...", page);
                let op = AdapterOperation::ExtractPage;
                match bounded(op, operation_timeout, adapter.extract_page()).await {
                    Ok(raw) => Msg::PageExtracted(raw),
                    Err(err) => failed(op, err),
                }
            }
            Effect::CheckNextPage => {
                let op = AdapterOperation::CheckNextPage;
                match bounded(op, operation_timeout, adapter.has_next_page()).await {
                    Ok(has_next) => Msg::NextPageChecked(has_next),
                    Err(err) => failed(op, err),
                }
            }
            Effect::AdvancePage { to_page } => {
                engine_debug!("Navigating to page {}", to_page);
                let op = AdapterOperation::AdvancePage;
                match bounded(op, operation_timeout, adapter.advance_page()).await {
                    Ok(()) => Msg::PageAdvanced,
                    Err(err) => failed(op, err),
                }
            }
            Effect::Complete(reason) => {
                engine_info!(
                    "Session completed: {} ({} reviews over {} pages)",
                    reason,
                    session.accumulated().len(),
                    session.pages().len()
                );
                let subject_name = session.subject_name().unwrap_or_default().to_string();
                let pages = session.pages().to_vec();
                return Ok(CompletedSession {
                    reason,
                    subject_name,
                    pages,
                    records: session.into_records(),
                });
            }
            Effect::Fail(reason) => {
                engine_warn!("Session failed: {}", reason);
                return Err(reason.into());
            }
        };

        let extracted = matches!(msg, Msg::PageExtracted(_));
        (session, next) = update(session, msg);
        if extracted {
            log_page(&session);
        }
    }
}

fn log_page(session: &HarvestSession) {
    let Some(report) = session.last_page_report() else {
        return;
    };
    if let Some(fingerprint) = session.last_fingerprint() {
        engine_trace!("Page {} fingerprint {}", report.page, fingerprint);
    }
    match report.observation {
        Observation::Fresh => engine_info!(
            "Page {}: {} cards, {} admitted, {} kept{}",
            report.page,
            report.raw,
            report.admitted,
            report.kept,
            if report.cutoff_triggered {
                " (cutoff reached)"
            } else {
                ""
            }
        ),
        Observation::Repeated { repeats } | Observation::Exceeded { repeats } => engine_warn!(
            "Page {}: same content as previous page ({} times)",
            report.page,
            repeats
        ),
    }
}

fn failed(operation: AdapterOperation, err: AdapterError) -> Msg {
    Msg::AdapterFailed {
        operation,
        message: err.to_string(),
    }
}

async fn bounded<T, F>(operation: AdapterOperation, limit: Duration, call: F) -> Result<T, AdapterError>
where
    F: Future<Output = Result<T, AdapterError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::Timeout {
            operation: operation.to_string(),
            after: limit,
        }),
    }
}
