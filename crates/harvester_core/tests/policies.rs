use chrono::NaiveDate;
use harvester_core::{
    CutoffPolicy, CutoffScan, Granularity, HarvestRecord, NormalizeRules, Normalizer, Observation,
    RawRecord, StalenessDetector,
};

fn record(comment: &str, date: &str) -> HarvestRecord {
    Normalizer::new(
        NormalizeRules::default(),
        "Hotel",
        "test",
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
    )
    .normalize(&RawRecord::new(Some("A"), Some("8"), Some(comment), Some(date)))
    .unwrap()
}

fn page(dates: &[&str]) -> Vec<HarvestRecord> {
    dates
        .iter()
        .enumerate()
        .map(|(i, date)| record(&format!("comment {i}"), date))
        .collect()
}

#[test]
fn cutoff_keeps_prefix_before_first_stale_record() {
    let policy = CutoffPolicy::default();
    let records = page(&["5 May 2024", "1 Jan 2024", "30 Dec 2023", "2 Feb 2024"]);

    assert_eq!(
        policy.scan(&records),
        CutoffScan {
            admitted: 2,
            triggered: true
        }
    );
}

#[test]
fn cutoff_admits_whole_recent_page() {
    let policy = CutoffPolicy::default();
    let records = page(&["5 May 2024", "1 Jan 2024"]);
    assert_eq!(
        policy.scan(&records),
        CutoffScan {
            admitted: 2,
            triggered: false
        }
    );
    assert_eq!(
        policy.scan(&[]),
        CutoffScan {
            admitted: 0,
            triggered: false
        }
    );
}

#[test]
fn stale_first_record_admits_nothing() {
    let policy = CutoffPolicy {
        boundary_year: 2025,
        treat_unparsed_as_stale: false,
    };
    let records = page(&["5 May 2024", "1 Jan 2026"]);
    assert_eq!(policy.scan(&records).admitted, 0);
    assert!(policy.scan(&records).triggered);
}

#[test]
fn unparsed_dates_follow_the_configured_policy() {
    let records = page(&["5 May 2024", "no date here", "1 Jan 2024"]);

    let lenient = CutoffPolicy {
        treat_unparsed_as_stale: false,
        ..CutoffPolicy::default()
    };
    assert!(!lenient.scan(&records).triggered);
    assert_eq!(lenient.scan(&records).admitted, 3);

    let strict = CutoffPolicy {
        treat_unparsed_as_stale: true,
        ..CutoffPolicy::default()
    };
    assert_eq!(
        strict.scan(&records),
        CutoffScan {
            admitted: 1,
            triggered: true
        }
    );
}

#[test]
fn full_page_detector_counts_consecutive_repeats() {
    let mut detector = StalenessDetector::new(Granularity::FullPage, 3);
    let same = page(&["1 May 2024", "2 May 2024"]);

    assert_eq!(detector.observe(&same), Observation::Fresh);
    assert_eq!(detector.observe(&same), Observation::Repeated { repeats: 1 });
    assert_eq!(detector.observe(&same), Observation::Repeated { repeats: 2 });
    assert_eq!(detector.observe(&same), Observation::Exceeded { repeats: 3 });
}

#[test]
fn any_change_resets_the_counter() {
    let mut detector = StalenessDetector::new(Granularity::FullPage, 3);
    let first = page(&["1 May 2024"]);
    let second = page(&["1 May 2024", "2 May 2024"]);

    detector.observe(&first);
    detector.observe(&first);
    assert_eq!(detector.repeat_count(), 1);
    let before = detector.last_fingerprint();

    assert_eq!(detector.observe(&second), Observation::Fresh);
    assert_eq!(detector.repeat_count(), 0);
    assert_ne!(detector.last_fingerprint(), before);
}

#[test]
fn full_page_sees_drift_that_lead_comment_misses() {
    let a = vec![record("same lead", "1 May 2024"), record("tail one", "1 May 2024")];
    let b = vec![record("same lead", "1 May 2024"), record("tail two", "1 May 2024")];

    let mut full = StalenessDetector::new(Granularity::FullPage, 3);
    full.observe(&a);
    assert_eq!(full.observe(&b), Observation::Fresh);

    let mut lead = StalenessDetector::new(Granularity::LeadComment, 3);
    lead.observe(&a);
    assert_eq!(lead.observe(&b), Observation::Repeated { repeats: 1 });
}

#[test]
fn repeated_empty_pages_are_detected() {
    let mut detector = StalenessDetector::new(Granularity::LeadComment, 2);
    assert_eq!(detector.observe(&[]), Observation::Fresh);
    assert_eq!(detector.observe(&[]), Observation::Repeated { repeats: 1 });
    assert_eq!(detector.observe(&[]), Observation::Exceeded { repeats: 2 });
}
