use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::dates::{extract_exhibitor_count, extract_time_range, parse_date, parse_full_date};
use super::fields::{labelled_values, locate, Label};
use super::text::{clean_text, content_text, element_text, fold, truncate_chars};
use crate::constants::{REGIONS, TITLE_MAX_CHARS};
use crate::types::{EventRecord, FetchedPage};

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));
static BREADCRUMB: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        ".breadcrumb a, .breadcrumb li, .breadcrumbs a, .breadcrumbs li, \
         nav[aria-label=\"breadcrumb\"] a, nav[aria-label=\"Fil d'Ariane\"] a, .ariane a",
    )
    .expect("valid selector")
});

// Matched against folded lines
static STREET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(rue|avenue|place|boulevard|bd|impasse|chemin|allee|quai|route)\b").expect("valid street regex")
});
static ADDRESS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(localisation|adresse|lieu)\s*:?\s*$").expect("valid heading regex"));
static CRUMB_DEPARTMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{2}|2[AB]|97\d)\)\s*$").expect("valid crumb regex"));

/// Street-address lines longer than this are prose, not an address
const MAX_ADDRESS_LINE_CHARS: usize = 160;

/// Values read from an event detail page. Empty means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub city: String,
    pub address: String,
    pub precise_place: String,
    pub region: String,
    pub department: String,
    pub exhibitor_count: Option<u32>,
    pub time_range: String,
}

fn first_label(values: &[(Label, String)], wanted: Label) -> String {
    values
        .iter()
        .find(|(label, value)| *label == wanted && !value.is_empty())
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

fn heading(document: &Html) -> String {
    let from = |selector: &Selector| {
        document
            .select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
            .map(|text| truncate_chars(&text, TITLE_MAX_CHARS))
    };
    from(&H1).or_else(|| from(&TITLE)).unwrap_or_default()
}

fn address_from_lines(lines: &[String]) -> String {
    for (i, line) in lines.iter().enumerate() {
        if ADDRESS_HEADING.is_match(&fold(line)) {
            if let Some(next) = lines.get(i + 1) {
                return next.clone();
            }
        }
    }
    lines
        .iter()
        .find(|line| line.chars().count() <= MAX_ADDRESS_LINE_CHARS && STREET.is_match(&fold(line)))
        .cloned()
        .unwrap_or_default()
}

fn city_from_address(address: &str) -> String {
    let Some((_, last)) = address.rsplit_once(',') else {
        return String::new();
    };
    clean_text(last.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace()))
}

fn breadcrumbs(document: &Html) -> (String, String) {
    let mut region = String::new();
    let mut department = String::new();
    for crumb in document.select(&BREADCRUMB).map(element_text) {
        let folded = fold(&crumb);
        if region.is_empty() {
            if let Some(known) = REGIONS.iter().find(|r| fold(r) == folded) {
                region = known.to_string();
            }
        }
        if department.is_empty() {
            if let Some(caps) = CRUMB_DEPARTMENT.captures(&crumb) {
                department = caps[1].to_string();
            }
        }
    }
    (region, department)
}

/// Reads event fields from a detail page. Never fails; unreadable pages give empty fields.
pub fn extract_detail(page: &FetchedPage, today: NaiveDate) -> DetailFields {
    let document = Html::parse_document(&page.body);
    let text = match document.select(&BODY).next() {
        Some(body) => content_text(body),
        None => content_text(document.root_element()),
    };
    let lines: Vec<String> = text.lines().map(clean_text).filter(|l| !l.is_empty()).collect();
    let values = labelled_values(&text);

    let date_label = first_label(&values, Label::Date);
    let date = parse_date(&date_label, today).or_else(|| parse_full_date(&text, today));

    let address = match first_label(&values, Label::Address) {
        a if a.is_empty() => address_from_lines(&lines),
        a => a,
    };

    let located = locate(&text);
    let city = match &located {
        Some((city, _)) => city.clone(),
        None => match first_label(&values, Label::City) {
            c if c.is_empty() => city_from_address(&address),
            c => c,
        },
    };

    let (crumb_region, crumb_department) = breadcrumbs(&document);
    let department = located
        .map(|(_, department)| department)
        .filter(|d| !d.is_empty())
        .or_else(|| Some(first_label(&values, Label::Department)).filter(|d| !d.is_empty()))
        .unwrap_or(crumb_department);
    let region = match first_label(&values, Label::Region) {
        r if r.is_empty() => crumb_region,
        r => r,
    };

    let time_range = match extract_time_range(&first_label(&values, Label::Hours)) {
        t if t.is_empty() => extract_time_range(&text),
        t => t,
    };

    DetailFields {
        title: heading(&document),
        date,
        city,
        address,
        precise_place: first_label(&values, Label::Place),
        region,
        department,
        exhibitor_count: extract_exhibitor_count(&text),
        time_range,
    }
}

fn fill_text(field: &mut String, value: String) {
    if !value.is_empty() {
        *field = value;
    }
}

/// Merges detail-page values into `record`.
///
/// Every field populated before the call is still populated after it: detail values
/// replace existing ones only when non-empty. The title follows the page heading when
/// there is one. `url` and `excerpt` are never touched.
pub fn fill(record: &mut EventRecord, detail: DetailFields) {
    fill_text(&mut record.title, detail.title);
    if detail.date.is_some() {
        record.date = detail.date;
    }
    fill_text(&mut record.city, detail.city);
    fill_text(&mut record.address, detail.address);
    fill_text(&mut record.precise_place, detail.precise_place);
    fill_text(&mut record.region, detail.region);
    fill_text(&mut record.department, detail.department);
    if detail.exhibitor_count.is_some() {
        record.exhibitor_count = detail.exhibitor_count;
    }
    fill_text(&mut record.time_range, detail.time_range);
}

/// Lightweight pass for records that are not enriched: date, exhibitor count and time
/// range read from the excerpt itself, filling only empty fields.
pub fn apply_excerpt_fallback(record: &mut EventRecord, today: NaiveDate) {
    if record.date.is_none() {
        record.date = parse_date(&record.excerpt, today);
    }
    if record.exhibitor_count.is_none() {
        record.exhibitor_count = extract_exhibitor_count(&record.excerpt);
    }
    if record.time_range.is_empty() {
        record.time_range = extract_time_range(&record.excerpt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const DETAIL_PAGE: &str = r#"
        <html>
          <head><title>Vide-grenier de printemps - vide-greniers.org</title></head>
          <body>
            <nav class="breadcrumb">
              <a href="/">Accueil</a>
              <a href="/region/ara">Auvergne-Rhône-Alpes</a>
              <a href="/departement/69">Rhône (69)</a>
            </nav>
            <h1>Vide-grenier de printemps du Vieux Lyon</h1>
            <p>Dimanche 14 septembre 2025</p>
            <h3>Localisation</h3>
            <p>12 rue Saint-Jean, 69005 Lyon</p>
            <p>Horaires : 7h à 18h</p>
            <p>Environ 150 exposants attendus.</p>
          </body>
        </html>
    "#;

    fn page(body: &str) -> FetchedPage {
        FetchedPage {
            url: Url::parse("https://vide-greniers.org/evenement/99").unwrap(),
            status: 200,
            body: body.to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn sparse_record() -> EventRecord {
        EventRecord {
            title: "Vide-grenier".to_string(),
            url: Some("https://vide-greniers.org/evenement/99".to_string()),
            date: None,
            city: "Lyon 5e".to_string(),
            address: String::new(),
            precise_place: "Quartier Saint-Jean".to_string(),
            excerpt: "Vide-grenier Lyon 5e".to_string(),
            region: String::new(),
            department: String::new(),
            exhibitor_count: None,
            time_range: String::new(),
        }
    }

    #[test]
    fn test_extract_detail_page() {
        let detail = extract_detail(&page(DETAIL_PAGE), today());
        assert_eq!(detail.title, "Vide-grenier de printemps du Vieux Lyon");
        assert_eq!(detail.date, NaiveDate::from_ymd_opt(2025, 9, 14));
        assert_eq!(detail.address, "12 rue Saint-Jean, 69005 Lyon");
        assert_eq!(detail.city, "Lyon");
        assert_eq!(detail.department, "69");
        assert_eq!(detail.region, "Auvergne-Rhône-Alpes");
        assert_eq!(detail.exhibitor_count, Some(150));
        assert_eq!(detail.time_range, "07:00-18:00");
    }

    #[test]
    fn test_navigation_text_does_not_set_the_date() {
        let html = r#"<html><body>
            <nav><a href="/agenda/week-end">Vide-greniers ce week-end</a></nav>
            <header><p>Prochaine braderie : 02/10/2025</p></header>
            <h1>Vide-grenier des Brotteaux</h1>
            <p>À partir de demain, inscriptions ouvertes.</p>
            <p>Dimanche 14 septembre 2025</p>
        </body></html>"#;
        let detail = extract_detail(&page(html), today());
        assert_eq!(detail.date, NaiveDate::from_ymd_opt(2025, 9, 14));

        let mut record = sparse_record();
        record.date = NaiveDate::from_ymd_opt(2025, 9, 14);
        fill(&mut record, detail);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 9, 14));
    }

    #[test]
    fn test_loose_dates_on_detail_page_are_ignored() {
        let html = "<html><body><h1>Brocante</h1><p>Rendez-vous ce week-end, le 21 septembre</p></body></html>";
        let detail = extract_detail(&page(html), today());
        assert_eq!(detail.date, None);
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let detail = extract_detail(&page("<html><head><title>Braderie</title></head><body><p>rien</p></body></html>"), today());
        assert_eq!(detail.title, "Braderie");
    }

    #[test]
    fn test_street_line_without_heading() {
        let html = "<html><body><h1>Brocante</h1><div>Rendez-vous</div><div>Place du Marché, Anglet</div></body></html>";
        let detail = extract_detail(&page(html), today());
        assert_eq!(detail.address, "Place du Marché, Anglet");
        assert_eq!(detail.city, "Anglet");
    }

    #[test]
    fn test_empty_page_gives_empty_fields() {
        let detail = extract_detail(&page(""), today());
        assert_eq!(detail, DetailFields::default());
    }

    #[test]
    fn test_fill_overwrites_with_non_empty_values() {
        let mut record = sparse_record();
        fill(&mut record, extract_detail(&page(DETAIL_PAGE), today()));
        assert_eq!(record.title, "Vide-grenier de printemps du Vieux Lyon");
        assert_eq!(record.city, "Lyon");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 9, 14));
        assert_eq!(record.exhibitor_count, Some(150));
        assert_eq!(record.url.as_deref(), Some("https://vide-greniers.org/evenement/99"));
    }

    #[test]
    fn test_fill_never_blanks_populated_fields() {
        let mut record = sparse_record();
        record.date = NaiveDate::from_ymd_opt(2025, 10, 5);
        record.exhibitor_count = Some(40);
        let before = record.clone();
        fill(&mut record, DetailFields::default());
        assert_eq!(record, before);
    }

    #[test]
    fn test_excerpt_fallback_fills_only_empty_fields() {
        let mut record = sparse_record();
        record.excerpt = "Dimanche 21 septembre, 60 exposants, de 8h à 17h".to_string();
        record.time_range = "06:00-12:00".to_string();
        apply_excerpt_fallback(&mut record, today());
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 9, 21));
        assert_eq!(record.exhibitor_count, Some(60));
        assert_eq!(record.time_range, "06:00-12:00");
    }
}
