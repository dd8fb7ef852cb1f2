use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{DEDUP_TITLE_PREFIX_CHARS, DETAIL_FRAGMENTS};
use crate::pipeline::processing::text::truncate_chars;

/// A fetched HTML page, addressed by its final URL after redirects
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

/// A page fragment suspected of describing one or more events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub title: String,
    /// Link as found in the markup, possibly relative
    pub url: String,
    /// Free text, may hold several announcements; line breaks follow the markup blocks
    pub excerpt: String,
    /// Resolved page URL used to absolutize `url`
    pub base: String,
}

impl RawCandidate {
    /// Absolute http(s) URL of the candidate, without fragment.
    pub fn absolute_url(&self) -> Option<String> {
        resolve_url(&self.base, &self.url)
    }
}

pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

pub fn is_detail_url(url: &str) -> bool {
    DETAIL_FRAGMENTS.iter().any(|fragment| url.contains(fragment))
}

/// Canonical flea-market event record handed to downstream collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub url: Option<String>,
    pub date: Option<NaiveDate>,
    pub city: String,
    pub address: String,
    pub precise_place: String,
    pub excerpt: String,
    pub region: String,
    pub department: String,
    pub exhibitor_count: Option<u32>,
    pub time_range: String,
}

impl EventRecord {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            title_prefix: truncate_chars(&self.title, DEDUP_TITLE_PREFIX_CHARS),
            url: self.url.clone().unwrap_or_default(),
            city: self.city.clone(),
            date: self.date.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

/// Two records with equal keys describe the same event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub title_prefix: String,
    pub url: String,
    pub city: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_against_base() {
        let url = resolve_url("https://vide-greniers.org/evenements/rhone", "/evenement/123#top");
        assert_eq!(url.as_deref(), Some("https://vide-greniers.org/evenement/123"));
    }

    #[test]
    fn test_resolve_rejects_non_http() {
        assert_eq!(resolve_url("https://example.org/", "mailto:a@b.fr"), None);
        assert_eq!(resolve_url("https://example.org/", "#"), None);
        assert_eq!(resolve_url("not a url", "/x"), None);
    }

    #[test]
    fn test_dedup_key_uses_title_prefix() {
        let base = EventRecord {
            title: "a".repeat(100),
            url: None,
            date: NaiveDate::from_ymd_opt(2025, 9, 12),
            city: "Lyon".to_string(),
            address: String::new(),
            precise_place: String::new(),
            excerpt: String::new(),
            region: String::new(),
            department: String::new(),
            exhibitor_count: None,
            time_range: String::new(),
        };
        let mut other = base.clone();
        other.title.push_str("different tail");
        other.excerpt = "other excerpt".to_string();
        assert_eq!(base.dedup_key(), other.dedup_key());
        assert_eq!(base.dedup_key().date, "2025-09-12");
    }
}
