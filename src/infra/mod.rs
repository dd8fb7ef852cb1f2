pub mod clock;
pub mod http_client;

pub use clock::{FixedClock, SystemClock};
pub use http_client::ReqwestFetcher;
