use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{PARAGRAPH_SPLIT_CHARS, REPEATING_LABEL, SNIPPET_SEPARATOR};

static REPEATING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{}\s*:", REPEATING_LABEL)).expect("valid marker regex")
});

// Blank lines, or a rule of three or more dashes on its own
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n|(?m)^[ \t]*[-–—_=]{3,}[ \t]*$").expect("valid paragraph regex")
});

fn non_empty_parts<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a block that may describe several announcements into one snippet per
/// announcement, in order:
///
/// 1. on the separator glyph when present;
/// 2. before every repeated `Ville :` label after the first one, so text preceding the
///    first label stays with the first announcement;
/// 3. on blank lines or dashed rules when the block is long;
/// 4. otherwise the whole block is one snippet.
///
/// Never returns an empty list: a block with no content yields `[excerpt]`.
pub fn split_block(excerpt: &str) -> Vec<String> {
    let parts = if excerpt.contains(SNIPPET_SEPARATOR) {
        non_empty_parts(excerpt.split(SNIPPET_SEPARATOR))
    } else {
        let markers: Vec<usize> = REPEATING_MARKER.find_iter(excerpt).map(|m| m.start()).collect();
        if markers.len() > 1 {
            let mut bounds = markers[1..].to_vec();
            bounds.insert(0, 0);
            bounds.push(excerpt.len());
            non_empty_parts(bounds.windows(2).map(|w| &excerpt[w[0]..w[1]]))
        } else if excerpt.chars().count() > PARAGRAPH_SPLIT_CHARS {
            non_empty_parts(PARAGRAPH_BREAK.split(excerpt))
        } else {
            non_empty_parts(std::iter::once(excerpt))
        }
    };

    if parts.is_empty() {
        vec![excerpt.to_string()]
    } else {
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_announcement_without_separator() {
        let parts = split_block("Ville : Lyon Date : 12/09/2025 Adresse : Place Bellecour");
        assert_eq!(parts, vec!["Ville : Lyon Date : 12/09/2025 Adresse : Place Bellecour"]);
    }

    #[test]
    fn test_separator_glyph_wins() {
        let parts = split_block("Brocante A Ville : Lyon • Brocante B Ville : Bron");
        assert_eq!(parts, vec!["Brocante A Ville : Lyon", "Brocante B Ville : Bron"]);
    }

    #[test]
    fn test_repeated_label_keeps_leading_title() {
        let parts = split_block("Vide-greniers du Rhône Ville : Lyon Date : 12/09/2025 ville: Bron Date : 13/09/2025");
        assert_eq!(
            parts,
            vec![
                "Vide-greniers du Rhône Ville : Lyon Date : 12/09/2025",
                "ville: Bron Date : 13/09/2025",
            ]
        );
    }

    #[test]
    fn test_long_block_split_on_paragraphs() {
        let first = format!("Brocante du centre {}", "a".repeat(320));
        let second = format!("Braderie du port {}", "b".repeat(320));
        let block = format!("{}\n\n{}\n---\nDernière annonce", first, second);
        let parts = split_block(&block);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], first);
        assert_eq!(parts[1], second);
        assert_eq!(parts[2], "Dernière annonce");
    }

    #[test]
    fn test_short_block_not_split_on_paragraphs() {
        let parts = split_block("Brocante\n\nDimanche 14 septembre");
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_empty_parts_degenerate_to_original() {
        assert_eq!(split_block(" • • "), vec![" • • "]);
        assert_eq!(split_block(""), vec![""]);
    }
}
