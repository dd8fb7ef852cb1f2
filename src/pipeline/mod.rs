// Listing-to-records pipeline: orchestration and the processing stages

pub mod processing;
pub mod runner;

pub use runner::Pipeline;
pub use tokio_util::sync::CancellationToken;
