use chrono::NaiveDate;

use super::fields::{extract_fields, SnippetFields};
use super::split::split_block;
use super::text::{clean_text, truncate_chars};
use crate::constants::{DEFAULT_TITLE, FALLBACK_TITLE_CHARS, TITLE_MAX_CHARS};
use crate::types::{EventRecord, RawCandidate};

/// Turns one raw candidate into its event records: one per snippet, in snippet order.
///
/// A candidate holding a single announcement keeps the link title the extractor found;
/// when the block was split, each record is titled from its own snippet since the link
/// title only describes the block as a whole.
pub fn records_from_candidate(candidate: &RawCandidate, today: NaiveDate, excerpt_max_chars: usize) -> Vec<EventRecord> {
    let url = candidate.absolute_url();
    let snippets = split_block(&candidate.excerpt);
    let single = snippets.len() == 1;
    let candidate_title = truncate_chars(&clean_text(&candidate.title), TITLE_MAX_CHARS);

    snippets
        .iter()
        .map(|snippet| {
            let fields = extract_fields(snippet, today);
            let title = if single && !candidate_title.is_empty() {
                candidate_title.clone()
            } else {
                title_for(&fields, snippet)
            };
            build_record(title, url.clone(), fields, snippet, excerpt_max_chars)
        })
        .collect()
}

fn title_for(fields: &SnippetFields, snippet: &str) -> String {
    if !fields.title.is_empty() {
        return fields.title.clone();
    }
    let truncated = truncate_chars(&clean_text(snippet), FALLBACK_TITLE_CHARS);
    if truncated.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        truncated
    }
}

fn build_record(
    title: String,
    url: Option<String>,
    fields: SnippetFields,
    snippet: &str,
    excerpt_max_chars: usize,
) -> EventRecord {
    EventRecord {
        title,
        url,
        date: fields.date,
        city: fields.city,
        address: fields.address,
        precise_place: fields.precise_place,
        excerpt: truncate_chars(&clean_text(snippet), excerpt_max_chars),
        region: fields.region,
        department: fields.department,
        exhibitor_count: fields.exhibitor_count,
        time_range: fields.time_range,
    }
}
