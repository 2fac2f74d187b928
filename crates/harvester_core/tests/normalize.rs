use chrono::NaiveDate;
use harvester_core::{
    parse_rating, parse_review_date, NormalizeRules, Normalizer, RawRecord, ReviewDate,
    ANONYMOUS_REVIEWER,
};

fn captured_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn normalizer() -> Normalizer {
    Normalizer::new(
        NormalizeRules::default(),
        "Hotel Indah",
        "agoda",
        captured_on(),
    )
}

#[test]
fn admits_record_and_attaches_subject_and_source() {
    let raw = RawRecord::new(Some(" Budi "), Some("8,6"), Some(" Great stay "), Some("3 Juni 2024"));
    let record = normalizer().normalize(&raw).expect("admitted");

    assert_eq!(record.reviewer(), "Budi");
    assert_eq!(record.rating(), 8.6);
    assert_eq!(record.comment(), "Great stay");
    assert_eq!(record.observed_at(), ReviewDate::new(3, 6, 2024).unwrap());
    assert_eq!(record.subject_name(), "Hotel Indah");
    assert_eq!(record.source_id(), "agoda");
}

#[test]
fn rating_must_be_positive_and_numeric() {
    let n = normalizer();
    for rating in [None, Some("n/a"), Some("0"), Some("0,0"), Some("-3"), Some("")] {
        let raw = RawRecord::new(Some("A"), rating, Some("fine"), Some("1 May 2024"));
        assert!(n.normalize(&raw).is_none(), "rating {rating:?} should be rejected");
    }
}

#[test]
fn rating_matches_parsed_value() {
    let n = normalizer();
    for text in ["9.2", "9,2", "9.2/10", "Score 9,2"] {
        let raw = RawRecord::new(None, Some(text), Some("ok"), None);
        let record = n.normalize(&raw).unwrap();
        assert_eq!(Some(record.rating()), parse_rating(text));
    }
}

#[test]
fn rating_label_separators_are_not_signs() {
    assert_eq!(parse_rating("Rating - 8"), Some(8.0));
    assert_eq!(parse_rating("Nilai: 8,4/10"), Some(8.4));
    assert_eq!(parse_rating("-3"), None);
    assert_eq!(parse_rating("Rating -3"), None);
    assert_eq!(parse_rating("abc5"), None);
}

#[test]
fn rating_scale_is_applied() {
    let rules = NormalizeRules {
        rating_scale: 2.0,
        ..NormalizeRules::default()
    };
    let n = Normalizer::new(rules, "H", "ticketcom", captured_on());
    let raw = RawRecord::new(None, Some("4.5"), Some("nice"), None);
    assert_eq!(n.normalize(&raw).unwrap().rating(), 9.0);
}

#[test]
fn empty_or_placeholder_comment_is_rejected() {
    let n = normalizer();
    for comment in [None, Some(""), Some("   "), Some("-"), Some(" - ")] {
        let raw = RawRecord::new(Some("A"), Some("8"), comment, Some("1 May 2024"));
        assert!(n.normalize(&raw).is_none(), "comment {comment:?} should be rejected");
    }
}

#[test]
fn missing_reviewer_defaults_to_anonymous() {
    let raw = RawRecord::new(Some("  "), Some("7"), Some("ok"), None);
    assert_eq!(normalizer().normalize(&raw).unwrap().reviewer(), ANONYMOUS_REVIEWER);
}

#[test]
fn unparseable_date_degrades_to_sentinel() {
    let n = normalizer();
    for date in [None, Some("Unknown Date"), Some("31 Juni 2024"), Some("sometime")] {
        let raw = RawRecord::new(Some("A"), Some("8"), Some("fine"), date);
        let record = n.normalize(&raw).expect("date never rejects a record");
        assert!(record.observed_at().is_sentinel(), "{date:?}");
    }
}

#[test]
fn absolute_dates_in_several_languages() {
    let cases = [
        ("3 Juni 2024", (3, 6, 2024)),
        ("Diulas pada 12 Agustus 2024", (12, 8, 2024)),
        ("Posted May 26, 2024", (26, 5, 2024)),
        ("May 26, 2024", (26, 5, 2024)),
        ("7 Okt 2023", (7, 10, 2023)),
        ("1 Dec 2023", (1, 12, 2023)),
        ("05-02-2024", (5, 2, 2024)),
        ("2024/02/05", (5, 2, 2024)),
    ];
    for (text, (d, m, y)) in cases {
        assert_eq!(
            parse_review_date(text, captured_on()),
            ReviewDate::new(d, m, y),
            "{text}"
        );
    }
}

#[test]
fn relative_dates_resolve_against_capture_day() {
    let cases = [
        ("2 weeks ago", (1, 6, 2024)),
        ("a week ago", (8, 6, 2024)),
        ("3 days ago", (12, 6, 2024)),
        ("3 hari yang lalu", (12, 6, 2024)),
        ("2 minggu lalu", (1, 6, 2024)),
        ("1 month ago", (15, 5, 2024)),
        ("1 year ago", (15, 6, 2023)),
        ("yesterday", (14, 6, 2024)),
        ("Today", (15, 6, 2024)),
    ];
    for (text, (d, m, y)) in cases {
        assert_eq!(
            parse_review_date(text, captured_on()),
            ReviewDate::new(d, m, y),
            "{text}"
        );
    }
}

#[test]
fn dates_serialize_as_day_month_year() {
    let raw = RawRecord::new(Some("A"), Some("8"), Some("fine"), Some("3 Juni 2024"));
    let record = normalizer().normalize(&raw).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["observed_at"], "03-06-2024");
    assert_eq!(json["reviewer"], "A");
    assert_eq!(json["subject_name"], "Hotel Indah");
}
