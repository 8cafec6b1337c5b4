//! pricegrid core: a date-aligned closing-price matrix for a fixed equity
//! universe plus two reference series.
//!
//! - Start-date resolution (absolute date or business-day lookback)
//! - Per-instrument fetch through a pluggable `DataProvider`, with failures
//!   isolated per symbol
//! - Outer-join alignment across equities, inner join for reference series
//! - Rolling percentage-change feature on the rate index

pub mod config;
pub mod data;
pub mod dates;
pub mod error;
pub mod features;
pub mod fetch;
pub mod pipeline;

pub use config::LoaderConfig;
pub use dates::StartSpec;
pub use error::LoaderError;
pub use fetch::{FetchFailure, FetchStage, InstrumentFetcher};
pub use pipeline::{LoadedData, PriceLoader};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: a loader and its results can move to a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceLoader>();
        require_sync::<PriceLoader>();
        require_send::<LoadedData>();
        require_send::<data::SeriesTable>();
        require_sync::<data::SeriesTable>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
    }
}
