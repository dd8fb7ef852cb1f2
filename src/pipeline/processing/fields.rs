use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::dates::{extract_exhibitor_count, extract_time_range, parse_date};
use super::text::{clean_text, fold, truncate_chars};
use crate::constants::{SNIPPET_SEPARATOR, TITLE_MAX_CHARS};

/// Field labels recognised in announcement text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    City,
    Date,
    Address,
    Place,
    Department,
    Region,
    Hours,
    Exhibitors,
}

impl Label {
    fn from_folded(word: &str) -> Option<Self> {
        let label = match word {
            "ville" | "commune" => Label::City,
            "date" | "dates" => Label::Date,
            "adresse" => Label::Address,
            "lieu" => Label::Place,
            "departement" => Label::Department,
            "region" => Label::Region,
            "horaire" | "horaires" => Label::Hours,
            "exposant" | "exposants" => Label::Exhibitors,
            _ => return None,
        };
        Some(label)
    }
}

static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(ville|commune|dates?|adresse|lieu|d[ée]partement|r[ée]gion|horaires?|exposants?)[ \t\u{a0}]*:")
        .expect("valid label regex")
});

// "69003 Lyon", "Lyon (69)"
static POSTAL_CITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{5})\s+([A-ZÀ-Ý][\p{L}'’\-]+(?:[ \-][\p{L}'’\-]+){0,3})").expect("valid postal regex")
});
static CITY_DEPARTMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-ZÀ-Ý][\p{L}'’\-]+(?:[ \-][A-ZÀ-Ý\p{Ll}][\p{L}'’\-]+){0,3})\s*\((\d{2}|2[AB]|97\d)\)")
        .expect("valid city department regex")
});
static DEPARTMENT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2}|2[AB]|97\d)\b").expect("valid department regex"));

/// Fields extracted from one snippet. Unmatched fields are empty or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetFields {
    pub title: String,
    pub city: String,
    pub date: Option<NaiveDate>,
    pub address: String,
    pub precise_place: String,
    pub department: String,
    pub region: String,
    pub time_range: String,
    pub exhibitor_count: Option<u32>,
}

/// Department code for a French postal code: first two digits, `2A`/`2B` for Corsica,
/// three digits overseas.
pub fn department_from_postal_code(code: &str) -> Option<String> {
    if code.len() != 5 || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let department = match &code[..2] {
        "00" => return None,
        "20" => {
            if code[..3].parse::<u32>().ok()? < 202 {
                "2A".to_string()
            } else {
                "2B".to_string()
            }
        }
        "97" | "98" => code[..3].to_string(),
        two => two.to_string(),
    };
    Some(department)
}

/// City and department from a "69003 Lyon" or "Lyon (69)" mention.
pub fn locate(text: &str) -> Option<(String, String)> {
    if let Some(caps) = POSTAL_CITY.captures(text) {
        if let Some(department) = department_from_postal_code(&caps[1]) {
            return Some((clean_text(&caps[2]), department));
        }
    }
    CITY_DEPARTMENT
        .captures(text)
        .map(|caps| (clean_text(&caps[1]), caps[2].to_string()))
}

fn clean_value(raw: &str) -> String {
    let cut = raw
        .split(|c: char| c == '\n' || c == '|' || c == SNIPPET_SEPARATOR)
        .next()
        .unwrap_or_default();
    clean_text(cut)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '-' | '–' | '—' | '.' | ':'))
        .to_string()
}

/// Every labelled value in `text`, in order of appearance. A value runs up to the next
/// label, separator, `|` or line break.
pub fn labelled_values(text: &str) -> Vec<(Label, String)> {
    let matches: Vec<_> = LABEL.captures_iter(text).collect();
    let mut values = Vec::new();
    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(label) = Label::from_folded(&fold(word.as_str())) else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        values.push((label, clean_value(&text[whole.end()..end])));
    }
    values
}

fn first_value(values: &[(Label, String)], wanted: Label) -> String {
    values
        .iter()
        .find(|(label, value)| *label == wanted && !value.is_empty())
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

/// Text preceding the first recognised label, bounded in length.
fn leading_title(text: &str) -> String {
    let Some(first) = LABEL.find(text) else {
        return String::new();
    };
    let title = clean_text(&text[..first.start()]);
    let title = title.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '|' | ',' | ':'));
    truncate_chars(title, TITLE_MAX_CHARS)
}

/// Extracts labelled fields from one announcement. Never fails: anything not found is
/// left empty.
pub fn extract_fields(snippet: &str, today: NaiveDate) -> SnippetFields {
    let values = labelled_values(snippet);

    let city = first_value(&values, Label::City);
    let place = first_value(&values, Label::Place);
    let address = match first_value(&values, Label::Address) {
        a if a.is_empty() => place.clone(),
        a => a,
    };
    let date_value = first_value(&values, Label::Date);
    let date = if date_value.is_empty() {
        None
    } else {
        parse_date(&date_value, today)
    };

    let mut department = first_value(&values, Label::Department);
    if let Some(code) = DEPARTMENT_CODE.captures(&department).map(|c| c[1].to_string()) {
        department = code;
    }
    let located = locate(snippet);
    if department.is_empty() {
        if let Some((_, code)) = &located {
            department = code.clone();
        }
    }
    let city = if city.is_empty() {
        located.map(|(city, _)| city).unwrap_or_default()
    } else {
        city
    };

    let hours = first_value(&values, Label::Hours);
    let time_range = match extract_time_range(&hours) {
        t if t.is_empty() => extract_time_range(snippet),
        t => t,
    };
    let exhibitor_count = extract_exhibitor_count(snippet).or_else(|| {
        first_value(&values, Label::Exhibitors)
            .split(|c: char| !c.is_ascii_digit())
            .find(|digits| !digits.is_empty())
            .and_then(|digits| digits.parse::<u32>().ok())
            .filter(|count| *count > 0)
    });

    SnippetFields {
        title: leading_title(snippet),
        city,
        date,
        address,
        precise_place: place,
        department,
        region: first_value(&values, Label::Region),
        time_range,
        exhibitor_count,
    }
}
