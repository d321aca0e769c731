//! Market-data and company-info collaborators

pub mod cache;
pub mod circuit_breaker;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use cache::{CacheKey, CachedHistory, HistoryCache};
pub use circuit_breaker::CircuitBreaker;
pub use provider::{DataError, HistoryProvider, InfoProvider, RawBar};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
