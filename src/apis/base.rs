use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::constants::{
    EVENT_KEYWORDS, MAX_CONTEXT_CHARS, MIN_BLOCK_TEXT_CHARS, MIN_LINK_TEXT_CHARS, NAVIGATION_FRAGMENTS,
};
use crate::pipeline::processing::text::{block_text, element_text, fold};
use crate::types::{resolve_url, FetchedPage, RawCandidate};

/// Strategy turning a fetched listing page into raw candidates
pub trait CandidateExtractor: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    /// Whether this strategy is dedicated to the page at `url`
    fn handles(&self, url: &Url) -> bool;

    /// Candidates found on the page, links resolved against `page.url`
    fn extract(&self, page: &FetchedPage) -> Vec<RawCandidate>;

    /// Listing pages linked from a site home page, absolute and in page order.
    /// Strategies without a notion of hub pages find none.
    fn listing_links(&self, _page: &FetchedPage) -> Vec<String> {
        Vec::new()
    }
}

pub(crate) static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static CONTENT_BLOCK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("li, article, .card, .result, .event, .event-card").expect("valid selector")
});
static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, .title, .card-title").expect("valid selector"));

static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\b").expect("valid date regex"));

// Place or date cues, matched on folded text
static CUES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:ville|lieu|adresse|date)\s*:|\b(?:lundi|mardi|mercredi|jeudi|vendredi|samedi|dimanche)\b|\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\b|\b\d{5}\b",
    )
    .expect("valid cue regex")
});

pub fn has_keyword(text: &str) -> bool {
    let folded = fold(text);
    EVENT_KEYWORDS.iter().any(|k| folded.contains(k))
}

pub fn has_numeric_date(text: &str) -> bool {
    NUMERIC_DATE.is_match(text)
}

pub fn has_place_or_date_cue(text: &str) -> bool {
    CUES.is_match(&fold(text))
}

pub fn has_event_terms(text: &str) -> bool {
    has_keyword(text) || has_numeric_date(text)
}

pub fn is_long_enough(link_text: &str) -> bool {
    link_text.chars().count() > MIN_LINK_TEXT_CHARS
}

/// Keyword-or-date relevance test on visible link text
pub fn looks_like_event(text: &str) -> bool {
    is_long_enough(text) && has_event_terms(text)
}

pub fn is_navigation(href: &str) -> bool {
    let href = href.trim().to_lowercase();
    href.is_empty() || href.starts_with('#') || NAVIGATION_FRAGMENTS.iter().any(|f| href.contains(f))
}

pub fn host_matches(url: &Url, hosts: &[&str]) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.trim_start_matches("www.");
        hosts.iter().any(|h| host == *h || host.ends_with(&format!(".{}", h)))
    })
}

fn is_item(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "li" | "article" | "tr" | "dd")
        || element
            .value()
            .classes()
            .any(|c| matches!(c, "card" | "event" | "event-card" | "result" | "annonce"))
}

/// Text surrounding a link: its closest list item, article or card; failing that the
/// closest container, when it is small enough to describe a single link.
pub fn link_context(link: ElementRef<'_>) -> String {
    let ancestors: Vec<ElementRef<'_>> = link
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !matches!(el.value().name(), "body" | "html" | "main"))
        .collect();

    if let Some(item) = ancestors.iter().find(|el| is_item(el)) {
        return block_text(*item);
    }
    ancestors
        .iter()
        .find(|el| matches!(el.value().name(), "p" | "div" | "section"))
        .map(|el| block_text(*el))
        .filter(|text| text.chars().count() <= MAX_CONTEXT_CHARS)
        .unwrap_or_default()
}

/// A link under consideration, with its visible text and surrounding text
pub struct LinkView<'a> {
    pub href: &'a str,
    pub text: String,
    pub context: String,
}

/// Scans `root` for links accepted by `accept`, one candidate per distinct absolute URL.
pub fn link_candidates(
    root: ElementRef<'_>,
    base: &str,
    limit: usize,
    accept: impl Fn(&LinkView<'_>) -> bool,
) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for link in root.select(&ANCHOR) {
        if out.len() >= limit {
            break;
        }
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if is_navigation(href) {
            continue;
        }
        let view = LinkView {
            href,
            text: element_text(link),
            context: link_context(link),
        };
        if !accept(&view) {
            continue;
        }
        let Some(absolute) = resolve_url(base, href) else {
            continue;
        };
        if !seen.insert(absolute) {
            continue;
        }
        let excerpt = if view.context.is_empty() { view.text.clone() } else { view.context };
        out.push(RawCandidate {
            title: view.text,
            url: href.to_string(),
            excerpt,
            base: base.to_string(),
        });
    }
    out
}

/// Fallback scan over list items, articles and cards with enough text.
pub fn block_candidates(root: ElementRef<'_>, base: &str, limit: usize) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for block in root.select(&CONTENT_BLOCK) {
        if out.len() >= limit {
            break;
        }
        let excerpt = block_text(block);
        if excerpt.chars().count() <= MIN_BLOCK_TEXT_CHARS || !seen.insert(excerpt.clone()) {
            continue;
        }
        let title = block.select(&HEADING).next().map(element_text).unwrap_or_default();
        let url = block
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| !is_navigation(href))
            .unwrap_or_default()
            .to_string();
        out.push(RawCandidate {
            title,
            url,
            excerpt,
            base: base.to_string(),
        });
    }
    out
}

/// Distinct absolute URLs of links whose href contains one of `fragments`, in page
/// order. The page itself is left out.
pub fn links_matching(root: ElementRef<'_>, base: &str, fragments: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    seen.insert(base.to_string());
    root.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| fragments.iter().any(|f| href.contains(f)))
        .filter_map(|href| resolve_url(base, href))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Page URL as a string, the base for every relative link on the page
pub fn page_base(page: &FetchedPage) -> String {
    page.url.to_string()
}
