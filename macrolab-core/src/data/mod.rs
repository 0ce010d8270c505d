//! Data acquisition and persistence

pub mod fred;
pub mod provider;
pub mod schema;
pub mod store;
pub mod universe;
pub mod yahoo;

pub use fred::FredProvider;
pub use provider::{EconomicProvider, MarketProvider, ProviderError};
pub use schema::{MarketBarSchema, ObservationSchema, SchemaError};
pub use store::{StoreError, TableMeta, TableStore, PROCESSED_TABLE, RAW_TABLE};
pub use universe::SeriesUniverse;
pub use yahoo::YahooProvider;
