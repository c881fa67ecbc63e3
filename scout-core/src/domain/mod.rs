//! Domain types for Sector Scout

pub mod bar;
pub mod category;
pub mod series;

pub use bar::Bar;
pub use category::Category;
pub use series::{PriceSeries, SeriesError};

/// Symbol type alias
pub type Symbol = String;
