//! Equity universe: the default inclusion list minus an exclusion list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// S&P 100 / Nasdaq-100 mega-cap list tracked by default.
pub const DEFAULT_TICKERS: &[&str] = &[
    "NVDA", "AAPL", "MSFT", "AMZN", "GOOGL", "GOOG", "META", "TSLA", "AVGO", "COST", "NFLX",
    "ASML", "TMUS", "AMD", "CSCO", "PEP", "ADBE", "LIN", "AZN", "TXN", "QCOM", "INTU", "ISRG",
    "AMGN", "CMCSA", "PDD", "BKNG", "AMAT", "HON", "VRTX", "PANW", "ADP", "MU", "GILD", "ADI",
    "SBUX", "MELI", "INTC", "LRCX", "KLAC", "MDLZ", "REGN", "CTAS", "SNPS", "CDNS", "PYPL",
    "CRWD", "MRVL", "MAR", "CSX", "ORLY", "WDAY", "CHTR", "ADSK", "FTNT", "TTD", "ROP", "PCAR",
    "NXPI", "TEAM", "FANG", "MNST", "CPRT", "PAYX", "AEP", "ODFL", "ROST", "FAST", "KDP", "DDOG",
    "EA", "BKR", "KHC", "MCHP", "VRSK", "CTSH", "LULU", "EXC", "XEL", "CCEP", "IDXX", "ON",
    "CSGP", "ZS", "TTWO", "ANSS", "CDW", "DXCM", "BIIB", "ILMN", "MDB", "WBD", "MRNA", "DLTR",
    "WBA",
];

/// Recent listings without enough history, excluded by default.
pub const DEFAULT_EXCLUDED: &[&str] = &["ARM", "ABNB", "CEG", "DASH", "GEHC", "GFS"];

/// Ordered, duplicate-free list of equity symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Universe {
    symbols: Vec<String>,
}

impl Universe {
    /// Build a universe from an inclusion list and an exclusion list.
    ///
    /// Symbols are trimmed and blanks dropped. The first occurrence of a
    /// duplicate keeps its position. Anything in `exclude` is removed no
    /// matter where it appears in `include`.
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let excluded: HashSet<String> = exclude
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();

        let mut seen = HashSet::new();
        let symbols = include
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty() && !excluded.contains(s))
            .filter(|s| seen.insert(s.clone()))
            .collect();

        Self { symbols }
    }

    /// The built-in list minus the built-in exclusions.
    pub fn default_us() -> Self {
        Self::new(DEFAULT_TICKERS, DEFAULT_EXCLUDED)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}
