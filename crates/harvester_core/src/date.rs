use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Serialize, Serializer};

/// Calendar date attached to a review. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReviewDate {
    year: i32,
    month: u32,
    day: u32,
}

impl ReviewDate {
    /// Stand-in for dates that could not be parsed.
    pub const SENTINEL: ReviewDate = ReviewDate {
        year: 1970,
        month: 1,
        day: 1,
    };

    /// Builds a date, rejecting impossible calendar days (31 June, 30 February, ...).
    pub fn new(day: u32, month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl fmt::Display for ReviewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{:04}", self.day, self.month, self.year)
    }
}

impl Serialize for ReviewDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("januari", 1),
    ("jan", 1),
    ("february", 2),
    ("februari", 2),
    ("feb", 2),
    ("peb", 2),
    ("march", 3),
    ("maret", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("mei", 5),
    ("june", 6),
    ("juni", 6),
    ("jun", 6),
    ("july", 7),
    ("juli", 7),
    ("jul", 7),
    ("august", 8),
    ("agustus", 8),
    ("aug", 8),
    ("agu", 8),
    ("agt", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oktober", 10),
    ("oct", 10),
    ("okt", 10),
    ("november", 11),
    ("nov", 11),
    ("nop", 11),
    ("december", 12),
    ("desember", 12),
    ("dec", 12),
    ("des", 12),
];

fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, number)| *number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeUnit {
    Day,
    Week,
    Month,
    Year,
}

fn relative_unit(token: &str) -> Option<RelativeUnit> {
    match token {
        "day" | "days" | "hari" => Some(RelativeUnit::Day),
        "week" | "weeks" | "minggu" => Some(RelativeUnit::Week),
        "month" | "months" | "bulan" => Some(RelativeUnit::Month),
        "year" | "years" | "tahun" => Some(RelativeUnit::Year),
        _ => None,
    }
}

fn relative_count(token: &str) -> Option<u32> {
    match token {
        "a" | "an" | "one" | "se" | "satu" => Some(1),
        _ => token.parse().ok(),
    }
}

/// Parses the free-form date text a site shows next to a review.
///
/// Absolute forms are tried first (`3 Juni 2024`, `May 26, 2024`,
/// `26-05-2024`), then relative phrases (`2 weeks ago`, `3 hari yang lalu`,
/// `yesterday`) resolved against `captured_on`. Returns `None` when nothing
/// matches; callers substitute [`ReviewDate::SENTINEL`].
pub fn parse_review_date(text: &str, captured_on: NaiveDate) -> Option<ReviewDate> {
    let tokens = tokenize(text);
    parse_numeric(&tokens)
        .or_else(|| parse_day_month_year(&tokens))
        .or_else(|| parse_month_day_year(&tokens))
        .or_else(|| parse_relative(&tokens, captured_on))
}

/// True when `text` reads as a review date in any form [`parse_review_date`]
/// accepts. Lets an adapter tell a date label from neighbouring numeric text
/// such as a score or a room number.
pub fn looks_like_review_date(text: &str) -> bool {
    let tokens = tokenize(text);
    parse_numeric(&tokens).is_some()
        || parse_day_month_year(&tokens).is_some()
        || parse_month_day_year(&tokens).is_some()
        || NaiveDate::from_ymd_opt(2000, 1, 1)
            .is_some_and(|anchor| parse_relative(&tokens, anchor).is_some())
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| {
            token
                .trim_matches(|c: char| matches!(c, '.' | '(' | ')' | ':' | ';'))
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_numeric(tokens: &[String]) -> Option<ReviewDate> {
    tokens.iter().find_map(|token| {
        let parts: Vec<&str> = token.split(['-', '/']).collect();
        if parts.len() != 3 {
            return None;
        }
        let numbers: Vec<u32> = parts
            .iter()
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<_>>()?;
        if parts[0].len() == 4 {
            ReviewDate::new(numbers[2], numbers[1], numbers[0] as i32)
        } else if parts[2].len() == 4 {
            ReviewDate::new(numbers[0], numbers[1], numbers[2] as i32)
        } else {
            None
        }
    })
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

fn parse_day(token: &str) -> Option<u32> {
    let digits = token
        .strip_suffix("st")
        .or_else(|| token.strip_suffix("nd"))
        .or_else(|| token.strip_suffix("rd"))
        .or_else(|| token.strip_suffix("th"))
        .unwrap_or(token);
    if digits.len() > 2 {
        return None;
    }
    digits.parse().ok()
}

fn parse_day_month_year(tokens: &[String]) -> Option<ReviewDate> {
    tokens.windows(3).find_map(|window| {
        let day = parse_day(&window[0])?;
        let month = month_number(&window[1])?;
        let year = parse_year(&window[2])?;
        ReviewDate::new(day, month, year)
    })
}

fn parse_month_day_year(tokens: &[String]) -> Option<ReviewDate> {
    tokens.windows(3).find_map(|window| {
        let month = month_number(&window[0])?;
        let day = parse_day(&window[1])?;
        let year = parse_year(&window[2])?;
        ReviewDate::new(day, month, year)
    })
}

fn parse_relative(tokens: &[String], captured_on: NaiveDate) -> Option<ReviewDate> {
    let has = |word: &str| tokens.iter().any(|token| token == word);
    if has("today") || tokens.join(" ").contains("hari ini") {
        return Some(ReviewDate::from_naive(captured_on));
    }
    if has("yesterday") || has("kemarin") {
        return captured_on
            .checked_sub_signed(Duration::days(1))
            .map(ReviewDate::from_naive);
    }

    let position = tokens
        .iter()
        .position(|token| token == "ago" || token == "lalu")?;
    let before = &tokens[..position];
    // "3 weeks ago", "2 minggu yang lalu", "sebulan yang lalu"
    let counted = before
        .windows(2)
        .rev()
        .find_map(|pair| Some((relative_count(&pair[0])?, relative_unit(&pair[1])?)));
    let (count, unit) = counted.or_else(|| {
        before.iter().rev().find_map(|token| {
            let rest = token.strip_prefix("se")?;
            Some((1, relative_unit(rest)?))
        })
    })?;

    let date = match unit {
        RelativeUnit::Day => captured_on.checked_sub_signed(Duration::days(i64::from(count))),
        RelativeUnit::Week => {
            captured_on.checked_sub_signed(Duration::days(7 * i64::from(count)))
        }
        RelativeUnit::Month => captured_on.checked_sub_months(Months::new(count)),
        RelativeUnit::Year => captured_on.checked_sub_months(Months::new(count.checked_mul(12)?)),
    }?;
    Some(ReviewDate::from_naive(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn tokenizer_strips_punctuation_and_case() {
        assert_eq!(tokenize("Posted May 26, 2024."), vec!["posted", "may", "26", "2024"]);
    }

    #[test]
    fn ordinal_days_are_accepted() {
        assert_eq!(
            parse_review_date("March 3rd, 2024", today()),
            ReviewDate::new(3, 3, 2024)
        );
    }

    #[test]
    fn scores_and_room_numbers_are_not_dates() {
        for text in ["8,6", "9.2/10", "Room 12", "Superior Twin 2 Beds", "2024"] {
            assert!(!looks_like_review_date(text), "{text}");
        }
        for text in ["12 Jan 2025", "Mar 3, 2024", "26/05/2024", "2 minggu yang lalu", "today"] {
            assert!(looks_like_review_date(text), "{text}");
        }
    }

    #[test]
    fn sebulan_means_one_month() {
        assert_eq!(
            parse_review_date("sebulan yang lalu", today()),
            ReviewDate::new(15, 5, 2024)
        );
    }
}
