use url::Url;

use super::base::CandidateExtractor;
use super::generic::GenericExtractor;
use super::site::{SiteProfile, SiteSpecificExtractor};

/// Registry of site strategies; unknown hosts fall back to the generic strategy
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn CandidateExtractor>>,
    fallback: GenericExtractor,
}

impl ExtractorRegistry {
    /// Create a registry with the built-in site strategies
    pub fn new(max_candidates: usize) -> Self {
        let mut registry = Self::empty(max_candidates);
        registry.register(Box::new(SiteSpecificExtractor::new(SiteProfile::vide_greniers(), max_candidates)));
        registry.register(Box::new(SiteSpecificExtractor::new(SiteProfile::vitegrenier(), max_candidates)));
        registry
    }

    /// Registry holding only the generic fallback
    pub fn empty(max_candidates: usize) -> Self {
        Self {
            extractors: Vec::new(),
            fallback: GenericExtractor::new(max_candidates),
        }
    }

    /// Register a strategy; earlier registrations take precedence
    pub fn register(&mut self, extractor: Box<dyn CandidateExtractor>) {
        self.extractors.push(extractor);
    }

    /// Strategy for `url`: the first registered one that handles it, else generic
    pub fn select(&self, url: &Url) -> &dyn CandidateExtractor {
        match self.extractors.iter().find(|e| e.handles(url)) {
            Some(extractor) => extractor.as_ref(),
            None => &self.fallback,
        }
    }

    /// List registered strategy names
    pub fn list_extractors(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FetchedPage, RawCandidate};

    struct StubExtractor;

    impl CandidateExtractor for StubExtractor {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn handles(&self, url: &Url) -> bool {
            url.host_str() == Some("brocabrac.fr")
        }

        fn extract(&self, _page: &FetchedPage) -> Vec<RawCandidate> {
            Vec::new()
        }
    }

    #[test]
    fn test_registry_has_built_in_sites() {
        let registry = ExtractorRegistry::new(300);
        assert_eq!(registry.list_extractors(), vec!["vide_greniers", "vitegrenier"]);
    }

    #[test]
    fn test_select_by_host() {
        let registry = ExtractorRegistry::new(300);
        let site = Url::parse("https://vide-greniers.org/evenements/ain").unwrap();
        let other = Url::parse("https://www.example.org/agenda").unwrap();
        assert_eq!(registry.select(&site).name(), "vide_greniers");
        assert_eq!(registry.select(&other).name(), "generic");
    }

    #[test]
    fn test_registered_strategy_is_selected() {
        let mut registry = ExtractorRegistry::new(300);
        registry.register(Box::new(StubExtractor));
        let url = Url::parse("https://brocabrac.fr/69/").unwrap();
        assert_eq!(registry.select(&url).name(), "stub");
    }
}
