//! Sector Scout Core: strategy classification and evidence aggregation.
//!
//! This crate contains the pure engine:
//! - Domain types (bars, price series, strategy categories)
//! - Indicator library (SMA, RSI, ATR, ADX) and the per-ticker snapshot
//! - Ordered, first-match classification into one of five categories
//! - Per-category score normalization
//! - Judgment payload parsing and opinion validation
//! - Weighted confidence aggregation with weight reallocation
//! - Capped per-category buckets
//!
//! Nothing here performs I/O or logs. Adjustments worth reporting come back as
//! values (e.g. [`evidence::ValidationNote`]).

pub mod bucket;
pub mod classify;
pub mod confidence;
pub mod config;
pub mod domain;
pub mod error;
pub mod evidence;
pub mod indicators;
pub mod normalize;

pub use bucket::{Buckets, Ranked};
pub use classify::{classify, Classification};
pub use confidence::{
    BreakdownEntry, Component, ConfidenceAggregator, ConfidenceResult, Evidence, ReducedBlend,
    SourceOpinions, SourceWeights,
};
pub use config::{ConfigError, EngineConfig};
pub use domain::{Bar, Category, PriceSeries, SeriesError, Symbol};
pub use error::InsufficientData;
pub use evidence::{
    parse_judgment, validate, MalformedJudgment, Opinion, RawJudgment, Source, Validated,
    ValidationNote, ValidatorPolicy,
};
pub use indicators::IndicatorSnapshot;
pub use normalize::normalize;
