/// Identifying client signature sent with every request
pub const USER_AGENT: &str = "ViteGrenierBot/1.0 (+https://github.com/vitegrenier/vitegrenier_scraper)";

// Site hosts with a dedicated candidate extractor
pub const VIDE_GRENIERS_HOST: &str = "vide-greniers.org";
pub const VITEGRENIER_HOST: &str = "vitegrenier.org";

/// URL fragments identifying an event detail page
pub const DETAIL_FRAGMENTS: &[&str] = &["/evenement/", "/annonce/"];

/// URL fragments of department listings linked from a site home page
pub const LISTING_FRAGMENTS: &[&str] = &["/evenements/", "/departement-"];

/// URL fragments of navigation, category and account pages, never candidates
pub const NAVIGATION_FRAGMENTS: &[&str] = &[
    "/categorie",
    "/category",
    "/tag/",
    "/page/",
    "/contact",
    "/connexion",
    "/login",
    "/inscription",
    "/mentions-legales",
    "/cgu",
    "/recherche",
    "mailto:",
    "javascript:",
    "tel:",
];

/// Domain keywords, matched against accent-folded lowercase text
pub const EVENT_KEYWORDS: &[&str] = &[
    "brocante",
    "vide-grenier",
    "vide grenier",
    "videgrenier",
    "vide-maison",
    "braderie",
    "puces",
    "bourse",
    "troc",
    "foire",
];

/// Designated glyph separating announcements inside one block
pub const SNIPPET_SEPARATOR: char = '•';

/// Label whose repetition marks several announcements in one block
pub const REPEATING_LABEL: &str = "ville";

/// Visible link text must be longer than this to be a candidate
pub const MIN_LINK_TEXT_CHARS: usize = 20;
/// Generic content blocks must be longer than this to be a candidate
pub const MIN_BLOCK_TEXT_CHARS: usize = 80;
/// Ancestor blocks longer than this are too broad to describe one link
pub const MAX_CONTEXT_CHARS: usize = 1500;
/// Blocks longer than this are split on paragraph boundaries
pub const PARAGRAPH_SPLIT_CHARS: usize = 600;

pub const TITLE_MAX_CHARS: usize = 120;
pub const FALLBACK_TITLE_CHARS: usize = 80;
pub const DEDUP_TITLE_PREFIX_CHARS: usize = 80;
pub const DEFAULT_TITLE: &str = "Vide-grenier";

/// French regions, used to recognise breadcrumb entries
pub const REGIONS: &[&str] = &[
    "Auvergne-Rhône-Alpes",
    "Bourgogne-Franche-Comté",
    "Bretagne",
    "Centre-Val de Loire",
    "Corse",
    "Grand Est",
    "Hauts-de-France",
    "Île-de-France",
    "Normandie",
    "Nouvelle-Aquitaine",
    "Occitanie",
    "Pays de la Loire",
    "Provence-Alpes-Côte d'Azur",
    "Guadeloupe",
    "Martinique",
    "Guyane",
    "La Réunion",
    "Mayotte",
];
