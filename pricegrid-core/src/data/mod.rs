//! Market data: providers, the aligned table and its exports.

pub mod align;
pub mod circuit_breaker;
pub mod csv_import;
pub mod frame;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use align::{ClosingSeries, JoinKind, SeriesTable, TableError};
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{
    DataError, DataProvider, FetchProgress, FetchRequest, MissingIndexPolicy, RawBar,
    SilentProgress, StdoutProgress,
};
pub use synthetic::SyntheticProvider;
pub use universe::Universe;
pub use yahoo::YahooProvider;
