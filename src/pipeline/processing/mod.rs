// Listing text to event records: splitting, field extraction, dedup and enrichment

pub mod dates;
pub mod dedup;
pub mod enrich;
pub mod fields;
pub mod records;
pub mod split;
pub mod text;
