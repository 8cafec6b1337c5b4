//! Synthetic provider for development and offline demos.
//!
//! Produces a random walk from a starting price of 100.0, one bar per weekday.
//! The walk is seeded from the symbol name, so repeated requests return the
//! same series. The interval is ignored.

use super::provider::{DataError, DataProvider, FetchRequest, RawBar};
use chrono::{Datelike, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random-walk provider.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    /// Symbols that should fail as if the upstream had no data for them.
    missing: Vec<String>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the listed symbols fail with `SymbolNotFound`.
    pub fn with_missing(missing: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawBar>, DataError> {
        if self.missing.iter().any(|s| *s == request.symbol) {
            return Err(DataError::SymbolNotFound {
                symbol: request.symbol.clone(),
            });
        }
        Ok(generate_walk(request))
    }
}

fn generate_walk(request: &FetchRequest) -> Vec<RawBar> {
    let seed: [u8; 32] = *blake3::hash(request.symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    // The walk always starts at a fixed anchor so that overlapping ranges agree.
    let anchor = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(request.start);
    let mut price = 100.0_f64;
    let mut current = anchor.min(request.start);
    let mut bars = Vec::new();

    while current < request.end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        if current >= request.start {
            bars.push(RawBar {
                timestamp: current.and_time(chrono::NaiveTime::MIN),
                open: Some(open),
                high: Some(high),
                low: Some(low),
                close: Some(close),
                volume: Some(volume),
            });
        }

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
