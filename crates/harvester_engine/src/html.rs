use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use harvester_core::{looks_like_review_date, RawRecord};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    AdapterError, AdapterFactory, FailureKind, FetchError, FetchedPage, Fetcher, PageAdapter,
    SiteProfile,
};

pub const UNKNOWN_SUBJECT: &str = "Unknown Hotel";

/// Opens [`HtmlPageAdapter`]s on a fixed subject URL.
pub struct HtmlAdapterFactory {
    fetcher: Arc<dyn Fetcher>,
    profile: SiteProfile,
    subject_url: String,
    page_retry_limit: u32,
    retry_pause: Duration,
}

impl HtmlAdapterFactory {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        profile: SiteProfile,
        subject_url: impl Into<String>,
        page_retry_limit: u32,
    ) -> Self {
        Self {
            fetcher,
            profile,
            subject_url: subject_url.into(),
            page_retry_limit,
            retry_pause: Duration::from_millis(500),
        }
    }

    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }
}

#[async_trait::async_trait]
impl AdapterFactory for HtmlAdapterFactory {
    async fn open(&self) -> Result<Box<dyn PageAdapter>, AdapterError> {
        validate_selectors(&self.profile)?;
        let page = fetch_with_retry(
            self.fetcher.as_ref(),
            &self.subject_url,
            self.page_retry_limit,
            self.retry_pause,
        )
        .await?;
        Ok(Box::new(HtmlPageAdapter {
            fetcher: self.fetcher.clone(),
            profile: self.profile.clone(),
            page_retry_limit: self.page_retry_limit,
            retry_pause: self.retry_pause,
            current: Some(page),
            next_url: None,
        }))
    }
}

/// Page Adapter over server-rendered listings: each page is fetched over
/// HTTP and the next one is reached by following the pagination link.
pub struct HtmlPageAdapter {
    fetcher: Arc<dyn Fetcher>,
    profile: SiteProfile,
    page_retry_limit: u32,
    retry_pause: Duration,
    current: Option<FetchedPage>,
    next_url: Option<String>,
}

impl HtmlPageAdapter {
    fn current(&self) -> Result<&FetchedPage, AdapterError> {
        self.current
            .as_ref()
            .ok_or_else(|| AdapterError::Navigation("page handle already closed".into()))
    }

    fn locate_next(&self) -> Result<Option<String>, AdapterError> {
        let page = self.current()?;
        let selector = compile(&self.profile.selectors.next_page)?;
        let doc = Html::parse_document(&page.html);
        let Some(control) = doc.select(&selector).last() else {
            return Ok(None);
        };
        if is_disabled(control) {
            return Ok(None);
        }
        let Some(href) = link_target(control)? else {
            return Ok(None);
        };
        let base = Url::parse(&page.final_url)
            .map_err(|err| AdapterError::Navigation(err.to_string()))?;
        let next = base
            .join(&href)
            .map_err(|err| AdapterError::Navigation(format!("bad next link {href}: {err}")))?;
        Ok(Some(next.to_string()))
    }
}

#[async_trait::async_trait]
impl PageAdapter for HtmlPageAdapter {
    async fn current_subject_name(&mut self) -> Result<String, AdapterError> {
        let page = self.current()?;
        let selector = compile(&self.profile.selectors.subject_name)?;
        let doc = Html::parse_document(&page.html);
        Ok(doc
            .select(&selector)
            .next()
            .map(text_of)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_SUBJECT.to_string()))
    }

    async fn extract_page(&mut self) -> Result<Vec<RawRecord>, AdapterError> {
        let page = self.current()?;
        let selectors = &self.profile.selectors;
        let review = compile(&selectors.review)?;
        let reviewer = compile(&selectors.reviewer)?;
        let rating = compile(&selectors.rating)?;
        let comment = compile(&selectors.comment)?;
        let date = compile(&selectors.date)?;
        let prefix = self.profile.date_prefix.as_deref();

        let doc = Html::parse_document(&page.html);
        let records = doc
            .select(&review)
            .map(|card| RawRecord {
                reviewer: first_text(card, &reviewer),
                rating: first_text(card, &rating),
                comment: first_text(card, &comment),
                date: date_text(card, &date, prefix),
            })
            .collect::<Vec<_>>();
        engine_debug!("Extracted {} review cards from {}", records.len(), page.final_url);
        Ok(records)
    }

    async fn has_next_page(&mut self) -> Result<bool, AdapterError> {
        self.next_url = self.locate_next()?;
        Ok(self.next_url.is_some())
    }

    async fn advance_page(&mut self) -> Result<(), AdapterError> {
        let next = match self.next_url.take() {
            Some(url) => url,
            None => self
                .locate_next()?
                .ok_or_else(|| AdapterError::Navigation("no next page link".into()))?,
        };
        let page = fetch_with_retry(
            self.fetcher.as_ref(),
            &next,
            self.page_retry_limit,
            self.retry_pause,
        )
        .await?;
        self.current = Some(page);
        Ok(())
    }

    async fn close(&mut self) {
        self.current = None;
        self.next_url = None;
    }
}

/// Retries transient fetch failures in place, up to `limit` attempts in total.
async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    limit: u32,
    pause: Duration,
) -> Result<FetchedPage, AdapterError> {
    let attempts = limit.max(1);
    let mut attempt = 1;
    loop {
        match fetcher.fetch(url).await {
            Ok(page) => return Ok(page),
            Err(err) if attempt < attempts && is_transient(&err) => {
                engine_warn!(
                    "Fetching {} failed ({}), retrying in place ({}/{})",
                    url,
                    err,
                    attempt,
                    attempts
                );
                tokio::time::sleep(pause).await;
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn is_transient(err: &FetchError) -> bool {
    match err.kind {
        FailureKind::Timeout | FailureKind::Network => true,
        FailureKind::HttpStatus(code) => code == 429 || code >= 500,
        _ => false,
    }
}

fn compile(css: &str) -> Result<Selector, AdapterError> {
    Selector::parse(css)
        .map_err(|err| AdapterError::Extraction(format!("invalid selector {css:?}: {err}")))
}

fn validate_selectors(profile: &SiteProfile) -> Result<(), AdapterError> {
    let s = &profile.selectors;
    for css in [
        &s.subject_name,
        &s.review,
        &s.reviewer,
        &s.rating,
        &s.comment,
        &s.date,
        &s.next_page,
    ] {
        compile(css)?;
    }
    Ok(())
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(text_of)
        .find(|text| !text.is_empty())
}

/// Without a prefix the date selector usually also matches the score and
/// other numeric labels, so a candidate that reads as a date wins. The first
/// digit-bearing text is kept otherwise and ends up as an unparsed date.
fn date_text(card: ElementRef<'_>, selector: &Selector, prefix: Option<&str>) -> Option<String> {
    let candidates: Vec<String> = card.select(selector).map(text_of).collect();
    match prefix {
        Some(prefix) => candidates.iter().find_map(|text| {
            text.find(prefix)
                .map(|at| text[at + prefix.len()..].trim().to_string())
        }),
        None => candidates
            .iter()
            .find(|text| looks_like_review_date(text))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|text| text.chars().any(|c| c.is_ascii_digit()))
            })
            .cloned(),
    }
}

/// The control itself or one of its close ancestors may carry the disabled marker.
fn is_disabled(control: ElementRef<'_>) -> bool {
    std::iter::once(control)
        .chain(control.ancestors().filter_map(ElementRef::wrap))
        .take(4)
        .any(|element| {
            let value = element.value();
            value.attr("aria-disabled") == Some("true")
                || value.attr("disabled").is_some()
                || value.classes().any(|class| class == "disabled")
        })
}

fn link_target(control: ElementRef<'_>) -> Result<Option<String>, AdapterError> {
    let usable = |href: &str| {
        let href = href.trim();
        (!href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"))
            .then(|| href.to_string())
    };
    let own = std::iter::once(control)
        .chain(control.ancestors().filter_map(ElementRef::wrap))
        .take(4)
        .find_map(|element| {
            let value = element.value();
            value
                .attr("href")
                .or_else(|| value.attr("data-href"))
                .and_then(usable)
        });
    if own.is_some() {
        return Ok(own);
    }
    let anchor = compile("a[href]")?;
    Ok(control
        .select(&anchor)
        .find_map(|a| a.value().attr("href").and_then(usable)))
}
