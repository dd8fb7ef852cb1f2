use scraper::ElementRef;

/// Collapses every run of whitespace (including line breaks) into one space and trims.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans each line but keeps line structure; runs of blank lines collapse into one.
pub fn clean_lines(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = clean_text(line);
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Truncates to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Lowercases and strips French diacritics, for keyword matching.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' | 'á' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ÿ' => 'y',
            'ç' => 'c',
            '’' => '\'',
            other => other,
        })
        .collect()
}

fn is_paragraph(name: &str) -> bool {
    matches!(
        name,
        "p" | "li" | "article" | "section" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "table" | "dl"
    )
}

fn is_line(name: &str) -> bool {
    matches!(name, "div" | "dd" | "dt" | "td" | "th" | "header" | "footer" | "main" | "nav")
}

fn is_chrome(name: &str) -> bool {
    matches!(name, "nav" | "header" | "footer" | "aside")
}

fn collect_text(element: ElementRef<'_>, out: &mut String, skip_chrome: bool) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child_el.value().name();
        match name {
            "script" | "style" | "noscript" | "template" => continue,
            _ if skip_chrome && is_chrome(name) => continue,
            "br" => out.push('\n'),
            "hr" => out.push_str("\n\n---\n\n"),
            _ if is_paragraph(name) => {
                out.push_str("\n\n");
                collect_text(child_el, out, skip_chrome);
                out.push_str("\n\n");
            }
            _ if is_line(name) => {
                out.push('\n');
                collect_text(child_el, out, skip_chrome);
                out.push('\n');
            }
            _ => {
                out.push(' ');
                collect_text(child_el, out, skip_chrome);
                out.push(' ');
            }
        }
    }
}

/// Visible text of an element with block boundaries kept as line breaks:
/// paragraph-level elements are separated by a blank line, other blocks by one newline.
pub fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw, false);
    clean_lines(&raw)
}

/// Like [`block_text`], leaving out site navigation, headers, footers and sidebars.
pub fn content_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw, true);
    clean_lines(&raw)
}

/// Single-line visible text of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_content_text_skips_site_chrome() {
        let html = Html::parse_document(
            "<body><header>Agenda</header><nav><a href=\"/\">Vide-greniers ce week-end</a></nav>\
             <main><p>Brocante du port</p></main><footer>Mentions</footer></body>",
        );
        let body = html.select(&Selector::parse("body").unwrap()).next().unwrap();
        assert_eq!(content_text(body), "Brocante du port");
        assert!(block_text(body).contains("ce week-end"));
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Vide \n\t grenier  "), "Vide grenier");
        assert_eq!(clean_text("\u{a0}Lyon\u{a0}"), "Lyon");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("Éléphant", 3), "Élé");
        assert_eq!(truncate_chars("court", 10), "court");
    }

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("Marché aux PUCES à Évian"), "marche aux puces a evian");
    }

    #[test]
    fn test_block_text_keeps_paragraphs() {
        let html = Html::parse_fragment(
            "<div><p>Brocante du <b>port</b></p><p>Ville : Sète<br>Date : 12/09/2025</p><script>x()</script></div>",
        );
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(block_text(div), "Brocante du port\n\nVille : Sète\nDate : 12/09/2025");
        assert_eq!(element_text(div), "Brocante du port Ville : Sète Date : 12/09/2025 x()");
    }
}
