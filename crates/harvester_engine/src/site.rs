use harvester_core::{Granularity, NormalizeRules, NO_COMMENT_SENTINEL};
use serde::Deserialize;
use url::Url;

/// CSS selectors locating review data on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteSelectors {
    pub subject_name: String,
    /// One match per review card.
    pub review: String,
    // The remaining selectors are evaluated inside a review card.
    pub reviewer: String,
    pub rating: String,
    pub comment: String,
    /// Candidates for the date label; see [`SiteProfile::date_prefix`].
    pub date: String,
    /// Pagination control. The last match wins.
    pub next_page: String,
}

/// Everything that differs between source sites.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteProfile {
    pub source_id: String,
    #[serde(default)]
    pub hosts: Vec<String>,
    pub selectors: SiteSelectors,
    /// Label text in front of the date, e.g. "Diulas pada". When set, only
    /// date candidates containing it are considered.
    #[serde(default)]
    pub date_prefix: Option<String>,
    #[serde(default = "default_rating_scale")]
    pub rating_scale: f64,
    #[serde(default = "default_no_comment")]
    pub no_comment_sentinel: String,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub empty_page_is_error: bool,
    #[serde(default)]
    pub treat_unparsed_as_stale: bool,
}

fn default_rating_scale() -> f64 {
    1.0
}

fn default_no_comment() -> String {
    NO_COMMENT_SENTINEL.to_string()
}

impl SiteProfile {
    pub fn normalize_rules(&self) -> NormalizeRules {
        NormalizeRules {
            rating_scale: self.rating_scale,
            no_comment_sentinel: self.no_comment_sentinel.clone(),
        }
    }

    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.hosts
            .iter()
            .any(|known| host == *known || host.ends_with(&format!(".{known}")))
    }

    /// Looks a profile up by source id among `candidates`.
    pub fn find<'a>(candidates: &'a [SiteProfile], source_id: &str) -> Option<&'a SiteProfile> {
        candidates
            .iter()
            .find(|profile| profile.source_id.eq_ignore_ascii_case(source_id))
    }

    /// Picks the profile whose hosts match the subject URL.
    pub fn detect<'a>(candidates: &'a [SiteProfile], subject_url: &str) -> Option<&'a SiteProfile> {
        let url = Url::parse(subject_url).ok()?;
        let host = url.host_str()?;
        candidates.iter().find(|profile| profile.matches_host(host))
    }

    /// Profiles for the supported booking sites.
    pub fn builtin() -> Vec<SiteProfile> {
        vec![agoda(), traveloka(), tripcom(), ticketcom()]
    }
}

fn selectors(
    subject_name: &str,
    review: &str,
    reviewer: &str,
    rating: &str,
    comment: &str,
    date: &str,
    next_page: &str,
) -> SiteSelectors {
    SiteSelectors {
        subject_name: subject_name.to_string(),
        review: review.to_string(),
        reviewer: reviewer.to_string(),
        rating: rating.to_string(),
        comment: comment.to_string(),
        date: date.to_string(),
        next_page: next_page.to_string(),
    }
}

fn agoda() -> SiteProfile {
    SiteProfile {
        source_id: "agoda".to_string(),
        hosts: vec!["agoda.com".to_string()],
        selectors: selectors(
            r#"[data-selenium="hotel-header-name"]"#,
            r#"div.Review-comment[data-element-name="review-comment"]"#,
            r#"[data-info-type="reviewer-name"] strong"#,
            r#"div[class*="Review-comment-leftScore"]"#,
            r#"p[data-testid="review-comment"]"#,
            "span",
            r#"button[data-element-name="review-paginator-next"]"#,
        ),
        date_prefix: Some("Diulas pada".to_string()),
        rating_scale: 1.0,
        no_comment_sentinel: default_no_comment(),
        granularity: Granularity::FullPage,
        empty_page_is_error: true,
        treat_unparsed_as_stale: true,
    }
}

fn traveloka() -> SiteProfile {
    SiteProfile {
        source_id: "traveloka".to_string(),
        hosts: vec!["traveloka.com".to_string()],
        selectors: selectors(
            r#"[data-testid="display_name_label"]"#,
            "div.css-1dbjc4n.r-14lw9ot.r-h1746q.r-kdyh1x.r-d045u9.r-18u37iz.r-1fdih9r.r-1udh08x.r-d23pfw",
            r#"[data-testid="reviewer-name"]"#,
            r#"[data-testid="tvat-ratingScore"]"#,
            ".css-901oao.css-cens5h",
            "div.css-901oao",
            r#"img[src*="ff1bf47098bb677fe4ba66933f585fab.svg"]"#,
        ),
        date_prefix: None,
        rating_scale: 1.0,
        no_comment_sentinel: default_no_comment(),
        granularity: Granularity::FullPage,
        empty_page_is_error: false,
        treat_unparsed_as_stale: true,
    }
}

fn tripcom() -> SiteProfile {
    SiteProfile {
        source_id: "tripcom".to_string(),
        hosts: vec!["trip.com".to_string()],
        selectors: selectors(
            r#"h1[class^="headInit_headInit-title_name"]"#,
            "div.drawer_drawerContainer__6G_8M div.yRvZgc0SICPUbmdb2L2a",
            ".yCIHzFRsP6Tzk7Kia6Qo",
            ".xt_R_A70sdDRsOgExJWw",
            ".UXjSnokalMIS5CzMtLSM",
            ".LPPTO8g2RH0Fk19jYMOQ",
            "li.nF6SWkdU6FLIzjoCbLMF.KtjTmkGBZvROMSO8zK_Q > a.pQoxbX5l0DdjPttuVUQx",
        ),
        date_prefix: None,
        rating_scale: 1.0,
        no_comment_sentinel: default_no_comment(),
        granularity: Granularity::LeadComment,
        empty_page_is_error: false,
        treat_unparsed_as_stale: false,
    }
}

fn ticketcom() -> SiteProfile {
    SiteProfile {
        source_id: "ticketcom".to_string(),
        hosts: vec!["tiket.com".to_string()],
        selectors: selectors(
            r#"h1[data-testid="name"]"#,
            r#"[data-testid="review-card"]"#,
            r#"[class*="ReviewCard_customer_name"]"#,
            ".ReviewCard_user_review__HvsOH",
            ".ReadMoreComments_review_card_comment__R_W2B",
            "span",
            r#"div[data-testid="chevron-right-pagination"]"#,
        ),
        date_prefix: None,
        // Reported out of 5.
        rating_scale: 2.0,
        no_comment_sentinel: default_no_comment(),
        granularity: Granularity::LeadComment,
        empty_page_is_error: false,
        treat_unparsed_as_stale: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_profile_from_subject_host() {
        let profiles = SiteProfile::builtin();
        let found = SiteProfile::detect(&profiles, "https://www.agoda.com/id-id/hotel-x/hotel.html");
        assert_eq!(found.map(|p| p.source_id.as_str()), Some("agoda"));
        assert!(SiteProfile::detect(&profiles, "https://notagoda.com/x").is_none());
        assert!(SiteProfile::detect(&profiles, "not a url").is_none());
    }

    #[test]
    fn builtin_selectors_parse() {
        for profile in SiteProfile::builtin() {
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
                assert!(
                    scraper::Selector::parse(css).is_ok(),
                    "{}: {css}",
                    profile.source_id
                );
            }
        }
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        let profiles = SiteProfile::builtin();
        let found = SiteProfile::find(&profiles, "TicketCom").unwrap();
        assert_eq!(found.rating_scale, 2.0);
        assert_eq!(found.granularity, Granularity::LeadComment);
    }
}
