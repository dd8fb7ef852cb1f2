use scraper::Html;
use tracing::debug;
use url::Url;

use super::base::{block_candidates, link_candidates, links_matching, looks_like_event, page_base, CandidateExtractor};
use crate::constants::LISTING_FRAGMENTS;
use crate::types::{FetchedPage, RawCandidate};

/// Strategy for any site without a dedicated extractor: every link whose text looks
/// like an event, falling back to generic content blocks.
pub struct GenericExtractor {
    max_candidates: usize,
}

impl GenericExtractor {
    pub fn new(max_candidates: usize) -> Self {
        Self { max_candidates }
    }
}

impl CandidateExtractor for GenericExtractor {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn handles(&self, _url: &Url) -> bool {
        true
    }

    fn extract(&self, page: &FetchedPage) -> Vec<RawCandidate> {
        let document = Html::parse_document(&page.body);
        let root = document.root_element();
        let base = page_base(page);

        let links = link_candidates(root, &base, self.max_candidates, |link| looks_like_event(&link.text));
        if !links.is_empty() {
            debug!("generic: {} link candidates on {}", links.len(), base);
            return links;
        }

        let blocks = block_candidates(root, &base, self.max_candidates);
        debug!("generic: no matching links, {} block candidates on {}", blocks.len(), base);
        blocks
    }

    fn listing_links(&self, page: &FetchedPage) -> Vec<String> {
        let document = Html::parse_document(&page.body);
        links_matching(document.root_element(), &page_base(page), LISTING_FRAGMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> FetchedPage {
        FetchedPage {
            url: Url::parse("https://agenda.example.org/sorties/").unwrap(),
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_keeps_event_links_and_drops_navigation() {
        let body = r#"<html><body>
            <nav><a href="/categorie/brocantes">Toutes les brocantes de la région</a></nav>
            <ul>
              <li><a href="fiche/42">Grande brocante de printemps à Lyon</a> Dimanche 14 septembre 2025</li>
              <li><a href="/fiche/43">Concert</a></li>
              <li><a href="https://autre.example.org/x">Sortie du 12/09/2025 au parc municipal</a></li>
            </ul>
        </body></html>"#;
        let candidates = GenericExtractor::new(300).extract(&page(body));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Grande brocante de printemps à Lyon");
        assert_eq!(candidates[0].url, "fiche/42");
        assert_eq!(
            candidates[0].absolute_url().as_deref(),
            Some("https://agenda.example.org/sorties/fiche/42")
        );
        assert!(candidates[0].excerpt.contains("Dimanche 14 septembre 2025"));
        assert_eq!(candidates[1].base, "https://agenda.example.org/sorties/");
    }

    #[test]
    fn test_falls_back_to_blocks() {
        let body = r#"<html><body>
            <article><h2>Vide-grenier</h2><p>Ville : Lyon Date : 12/09/2025 Adresse : Place Bellecour, plus de 80 exposants attendus.</p><a href="/x">Voir</a></article>
            <article><p>Trop court</p></article>
        </body></html>"#;
        let candidates = GenericExtractor::new(300).extract(&page(body));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Vide-grenier");
        assert_eq!(candidates[0].url, "/x");
    }

    #[test]
    fn test_respects_candidate_cap() {
        let links: String = (0..10)
            .map(|i| format!("<p><a href=\"/b/{i}\">Brocante numéro {i} du dimanche</a></p>"))
            .collect();
        let candidates = GenericExtractor::new(3).extract(&page(&format!("<body>{}</body>", links)));
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn test_listing_links_use_shared_fragments() {
        let body = r#"<body><a href="../evenements/gard">Gard</a><a href="/fiche/1">Brocante</a></body>"#;
        let links = GenericExtractor::new(300).listing_links(&page(body));
        assert_eq!(links, vec!["https://agenda.example.org/evenements/gard"]);
    }
}
