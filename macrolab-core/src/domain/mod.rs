//! Domain types for MacroLab

pub mod bar;
pub mod observation;
pub mod series;

pub use bar::MarketBar;
pub use observation::{Observation, SeriesId};
pub use series::{DuplicateDate, DuplicatePolicy, Point, Series};
