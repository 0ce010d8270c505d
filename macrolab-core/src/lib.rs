//! MacroLab Core — observations, normalization rules, the series transformer,
//! data providers, and the Parquet table store.
//!
//! This crate contains:
//! - Domain types (observations, series, market bars)
//! - Normalization rules and the rule table
//! - The series transformer (group → normalize → window → flatten)
//! - FRED and Yahoo Finance providers behind provider traits
//! - A Parquet table store with full-replace, atomic writes

pub mod data;
pub mod domain;
pub mod transform;

pub use domain::{DuplicatePolicy, MarketBar, Observation, Series, SeriesId};
pub use transform::{
    transform, transform_as_of, NormalizationRule, RuleTable, SeriesCatalog, SeriesTransformer, TransformError,
    Window,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed between pipeline stages are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Observation>();
        require_sync::<Observation>();
        require_send::<Series>();
        require_sync::<Series>();
        require_send::<MarketBar>();
        require_sync::<MarketBar>();
        require_send::<SeriesCatalog>();
        require_sync::<SeriesCatalog>();
        require_send::<RuleTable>();
        require_sync::<RuleTable>();
        require_send::<SeriesTransformer>();
        require_sync::<SeriesTransformer>();
        require_send::<data::TableStore>();
        require_sync::<data::TableStore>();
    }

    /// Provider traits are object safe: the runner holds them as `&dyn`.
    #[test]
    fn provider_traits_are_object_safe() {
        fn _economic(p: &dyn data::EconomicProvider) -> &str {
            p.name()
        }
        fn _market(p: &dyn data::MarketProvider) -> &str {
            p.name()
        }
    }
}
