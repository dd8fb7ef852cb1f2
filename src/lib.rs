pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Layered boundaries: ports in app, adapters in infra
pub mod app;
pub mod infra;

pub use config::Config;
pub use error::{Result, ScraperError};
pub use pipeline::{CancellationToken, Pipeline};
pub use types::EventRecord;
