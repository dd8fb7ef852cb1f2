// Candidate extraction strategies, one per known listing site plus a generic fallback
pub mod base;
pub mod factory;
pub mod generic;
pub mod site;

pub use base::CandidateExtractor;
pub use factory::ExtractorRegistry;
pub use generic::GenericExtractor;
pub use site::{SiteProfile, SiteSpecificExtractor};
