pub mod config;
pub mod error;
pub mod numeric;
pub mod range;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightsError, InsightsResult};
pub use range::DateRange;
