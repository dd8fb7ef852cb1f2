use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::base::{
    block_candidates, has_event_terms, has_place_or_date_cue, host_matches, is_long_enough, link_candidates,
    links_matching, page_base, CandidateExtractor,
};
use crate::constants::{DETAIL_FRAGMENTS, LISTING_FRAGMENTS, VIDE_GRENIERS_HOST, VITEGRENIER_HOST};
use crate::types::{FetchedPage, RawCandidate};

static MAIN_CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("main, #content, .content, #main, [role=\"main\"]").expect("valid selector")
});

/// What a dedicated extractor needs to know about one site
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: &'static str,
    pub hosts: &'static [&'static str],
    /// Fragments of hrefs pointing at event detail pages
    pub detail_fragments: &'static [&'static str],
    /// Fragments of hrefs pointing at department or region listings, followed from the home page
    pub listing_fragments: &'static [&'static str],
}

impl SiteProfile {
    pub fn vide_greniers() -> Self {
        Self {
            name: "vide_greniers",
            hosts: &[VIDE_GRENIERS_HOST],
            detail_fragments: DETAIL_FRAGMENTS,
            listing_fragments: LISTING_FRAGMENTS,
        }
    }

    pub fn vitegrenier() -> Self {
        Self {
            name: "vitegrenier",
            hosts: &[VITEGRENIER_HOST],
            detail_fragments: DETAIL_FRAGMENTS,
            listing_fragments: LISTING_FRAGMENTS,
        }
    }
}

/// Strategy for a known listing site: scans the main content region, prefers links to
/// detail pages or links surrounded by place/date cues.
pub struct SiteSpecificExtractor {
    profile: SiteProfile,
    max_candidates: usize,
}

impl SiteSpecificExtractor {
    pub fn new(profile: SiteProfile, max_candidates: usize) -> Self {
        Self { profile, max_candidates }
    }

    fn is_detail_link(&self, href: &str) -> bool {
        self.profile.detail_fragments.iter().any(|f| href.contains(f))
    }
}

impl CandidateExtractor for SiteSpecificExtractor {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    fn handles(&self, url: &Url) -> bool {
        host_matches(url, self.profile.hosts)
    }

    fn extract(&self, page: &FetchedPage) -> Vec<RawCandidate> {
        let document = Html::parse_document(&page.body);
        let root = document
            .select(&MAIN_CONTENT)
            .next()
            .unwrap_or_else(|| document.root_element());
        let base = page_base(page);

        let links = link_candidates(root, &base, self.max_candidates, |link| {
            let preferred = self.is_detail_link(link.href) || has_place_or_date_cue(&link.context);
            preferred && is_long_enough(&link.text) && has_event_terms(&format!("{} {}", link.text, link.context))
        });
        if !links.is_empty() {
            debug!("{}: {} link candidates on {}", self.profile.name, links.len(), base);
            return links;
        }

        let blocks = block_candidates(root, &base, self.max_candidates);
        debug!("{}: no matching links, {} block candidates on {}", self.profile.name, blocks.len(), base);
        blocks
    }

    fn listing_links(&self, page: &FetchedPage) -> Vec<String> {
        let document = Html::parse_document(&page.body);
        links_matching(document.root_element(), &page_base(page), self.profile.listing_fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, body: &str) -> FetchedPage {
        FetchedPage {
            url: Url::parse(url).unwrap(),
            status: 200,
            body: body.to_string(),
        }
    }

    const LISTING: &str = r#"<html><body>
        <header><a href="/evenement/999-brocante-en-vedette">Brocante en vedette du mois de septembre</a></header>
        <main>
          <div class="event">
            <a href="/evenement/101-vide-grenier-ecole">Vide-grenier de l'école</a>
            <span>Dimanche 14 septembre 2025</span><span>69003 Lyon</span>
          </div>
          <div class="event">
            <a href="/partenaires">Nos partenaires et sponsors officiels</a>
          </div>
          <div class="event">
            <a href="/fiche?id=7">Braderie du centre-ville</a><span>Ville : Villeurbanne</span>
          </div>
        </main>
    </body></html>"#;

    #[test]
    fn test_scans_main_region_only() {
        let extractor = SiteSpecificExtractor::new(SiteProfile::vide_greniers(), 300);
        let candidates = extractor.extract(&page("https://vide-greniers.org/evenements/rhone", LISTING));
        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["/evenement/101-vide-grenier-ecole", "/fiche?id=7"]);
        assert!(candidates[0].excerpt.contains("69003 Lyon"));
        assert_eq!(
            candidates[0].absolute_url().as_deref(),
            Some("https://vide-greniers.org/evenement/101-vide-grenier-ecole")
        );
    }

    #[test]
    fn test_handles_own_hosts() {
        let extractor = SiteSpecificExtractor::new(SiteProfile::vitegrenier(), 300);
        assert!(extractor.handles(&Url::parse("https://www.vitegrenier.org/").unwrap()));
        assert!(!extractor.handles(&Url::parse("https://vide-greniers.org/").unwrap()));
    }

    #[test]
    fn test_falls_back_to_blocks_without_links() {
        let body = r#"<main><ul><li>Brocante annuelle des Pentes • Ville : Lyon • Date : 21/09/2025 • Plus de 120 exposants attendus sur la place</li></ul></main>"#;
        let extractor = SiteSpecificExtractor::new(SiteProfile::vide_greniers(), 300);
        let candidates = extractor.extract(&page("https://vide-greniers.org/", body));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "");
    }

    #[test]
    fn test_short_link_text_is_not_a_candidate() {
        let body = r#"<main>
            <div class="event"><a href="/evenement/5">Voir</a> Brocante de la Croix-Rousse, dimanche 14 septembre 2025</div>
            <div class="event"><a href="/evenement/6">Vide-grenier des Terreaux</a> dimanche 21 septembre 2025</div>
        </main>"#;
        let extractor = SiteSpecificExtractor::new(SiteProfile::vide_greniers(), 300);
        let candidates = extractor.extract(&page("https://vide-greniers.org/evenements/rhone", body));
        let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Vide-grenier des Terreaux"]);
    }

    #[test]
    fn test_listing_links_from_home_page() {
        let body = r#"<html><body>
            <a href="/evenements/rhone">Rhône</a>
            <a href="/departement-01">Ain</a>
            <a href="/evenement/12">Vide-grenier de la place Carnot</a>
            <a href="/contact">Contact</a>
        </body></html>"#;
        let extractor = SiteSpecificExtractor::new(SiteProfile::vide_greniers(), 300);
        let links = extractor.listing_links(&page("https://vide-greniers.org/", body));
        assert_eq!(
            links,
            vec!["https://vide-greniers.org/evenements/rhone", "https://vide-greniers.org/departement-01"]
        );
    }
}
