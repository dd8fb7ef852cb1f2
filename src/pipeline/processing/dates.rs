//! French date, time-range and exhibitor-count extraction.
//!
//! Every function here is total: text that does not match yields `None` or an empty
//! string, never an error.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::text::fold;

const MONTHS: &str = "janvier|janv|fevrier|fevr|fev|mars|avril|avr|mai|juin|juillet|juil|aout|septembre|sept|octobre|oct|novembre|nov|decembre|dec";

// Patterns run on accent-folded lowercase text
static PHRASE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:(?:lundi|mardi|mercredi|jeudi|vendredi|samedi|dimanche)\s+)?(\d{{1,2}})(?:er)?\s+({MONTHS})\b\.?(?:\s+(\d{{4}}))?"
    ))
    .expect("valid date phrase regex")
});
// "dimanche 14 septembre 2025": weekday and year both required
static FULL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:lundi|mardi|mercredi|jeudi|vendredi|samedi|dimanche)\s+(\d{{1,2}})(?:er)?\s+({MONTHS})\b\.?\s+(\d{{4}})\b"
    ))
    .expect("valid full date regex")
});
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid iso date regex"));
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b").expect("valid numeric date regex")
});
static RELATIVE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:aujourd'hui|apres-demain|demain|ce\s+week-?\s?end|ce\s+samedi|ce\s+dimanche)")
        .expect("valid relative date regex")
});

// A time is "8h", "8h30", "08:30"
const TIME: &str = r"(\d{1,2})(?:h(\d{2})?|:(\d{2}))";

static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b{TIME}\s*(?:-|–|—|/|>|a|au|jusqu'a)\s*{TIME}"
    ))
    .expect("valid time range regex")
});
static LABELLED_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:ouverture|ouvert|des|a partir de|installation|debut|horaires?|de)(?:\s+(?:au public|des exposants|exposants))?\s*(?::|a|de|vers)?\s*{TIME}"
    ))
    .expect("valid labelled time regex")
});

static EXHIBITORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,4})\s*(?:exposants?|stands?|vendeurs?|tables?|emplacements?)\b")
        .expect("valid exhibitor regex")
});

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "janvier" | "janv" => 1,
        "fevrier" | "fevr" | "fev" => 2,
        "mars" => 3,
        "avril" | "avr" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" | "juil" => 7,
        "aout" => 8,
        "septembre" | "sept" => 9,
        "octobre" | "oct" => 10,
        "novembre" | "nov" => 11,
        "decembre" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Next occurrence of day/month on or after `today`.
fn upcoming(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => (1..=4).find_map(|offset| NaiveDate::from_ymd_opt(today.year() + offset, month, day)),
    }
}

fn from_phrase(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_number(caps.get(2)?.as_str())?;
    match caps.get(3) {
        Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
        None => upcoming(day, month, today),
    }
}

/// Rejects numeric matches that are part of a longer dotted/slashed run, e.g. phone
/// numbers such as `06.12.34.56.78`.
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let mut after = text[end..].chars();
    let joined_before = matches!(before, Some('.' | '/' | '-'));
    let joined_after = matches!(after.next(), Some('.' | '/' | '-'))
        && after.next().is_some_and(|c| c.is_ascii_digit());
    !joined_before && !joined_after
}

fn from_numeric(text: &str, caps: &Captures<'_>) -> Option<NaiveDate> {
    let whole = caps.get(0)?;
    if !is_standalone(text, whole.start(), whole.end()) {
        return None;
    }
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let raw_year = caps.get(3)?.as_str();
    let mut year: i32 = raw_year.parse().ok()?;
    if raw_year.len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn from_relative(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let date = if phrase.starts_with("aujourd") {
        today
    } else if phrase.starts_with("apres") {
        today + Duration::days(2)
    } else if phrase.starts_with("demain") {
        today + Duration::days(1)
    } else if phrase.ends_with("dimanche") {
        monday + Duration::days(6)
    } else {
        // week-end and samedi both resolve to the Saturday of the current week
        monday + Duration::days(5)
    };
    Some(date)
}

/// Interprets French date phrases ("samedi 13 septembre 2025", "1er mai"), numeric
/// `D/M/Y` forms, ISO dates and a few relative phrases ("ce week-end", "demain").
/// Year-less phrases resolve to the next occurrence on or after `today`.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let folded = fold(text);

    let phrase = PHRASE_DATE.captures_iter(&folded).find_map(|c| from_phrase(&c, today));
    if phrase.is_some() {
        return phrase;
    }
    let iso = ISO_DATE.captures_iter(&folded).find_map(|c| {
        NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    });
    if iso.is_some() {
        return iso;
    }
    let numeric = NUMERIC_DATE
        .captures_iter(&folded)
        .find_map(|c| from_numeric(&folded, &c));
    if numeric.is_some() {
        return numeric;
    }
    RELATIVE_DATE
        .find(&folded)
        .and_then(|m| from_relative(m.as_str(), today))
}

/// Only a complete weekday phrase with its year, e.g. "Dimanche 14 septembre 2025".
/// Used on full pages, where looser forms also match navigation and teaser text.
pub fn parse_full_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let folded = fold(text);
    FULL_DATE.captures_iter(&folded).find_map(|c| from_phrase(&c, today))
}

/// `HH:MM` from the captures starting at `offset` (hour, `h` minutes, `:` minutes).
fn time_at(caps: &Captures<'_>, offset: usize) -> Option<String> {
    let hour: u32 = caps.get(offset)?.as_str().parse().ok()?;
    let minute: u32 = caps
        .get(offset + 1)
        .or_else(|| caps.get(offset + 2))
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{:02}:{:02}", hour, minute))
}

/// Opening hours as `"HH:MM-HH:MM"`, or a single labelled time (`"dès 7h"`) as `"HH:MM"`.
/// Returns an empty string when nothing matches.
pub fn extract_time_range(text: &str) -> String {
    let folded = fold(text);
    let range = TIME_RANGE.captures_iter(&folded).find_map(|caps| {
        let start = time_at(&caps, 1)?;
        let end = time_at(&caps, 4)?;
        Some(format!("{}-{}", start, end))
    });
    if let Some(range) = range {
        return range;
    }
    LABELLED_TIME
        .captures_iter(&folded)
        .find_map(|caps| time_at(&caps, 1))
        .unwrap_or_default()
}

/// Number of exhibitors from phrases such as "80 exposants" or "120 stands".
pub fn extract_exhibitor_count(text: &str) -> Option<u32> {
    let folded = fold(text);
    EXHIBITORS
        .captures_iter(&folded)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .find(|count| *count > 0)
}
