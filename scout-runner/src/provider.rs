//! Collaborator traits and their error types.
//!
//! Price history, news, social posts, and judgments all come from outside the
//! engine. These traits abstract over the concrete sources (CSV files, an
//! evidence file, an HTTP judge) so they can be swapped and mocked in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scout_core::{Category, PriceSeries, SeriesError, Source};

/// Structured errors for data collaborators.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed data for '{symbol}': {message}")]
    Malformed { symbol: String, message: String },

    #[error("invalid series for '{symbol}': {source}")]
    Series {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the judgment collaborator. Any of these means the opinion is
/// unavailable; its weight is reallocated.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge unreachable: {0}")]
    Transport(String),

    #[error("judge returned HTTP {status}")]
    Status { status: u16 },

    #[error("judge response has no payload: {0}")]
    EmptyResponse(String),
}

/// Source of OHLCV history.
pub trait PriceHistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// The most recent `lookback` bars for `symbol`, oldest first.
    fn history(&self, symbol: &str, lookback: usize) -> Result<PriceSeries, DataError>;
}

/// One headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub publisher: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

/// One social media post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub title: String,
    pub score: i64,
    pub community: String,
}

pub trait NewsProvider: Send + Sync {
    fn headlines(&self, symbol: &str) -> Result<Vec<NewsItem>, DataError>;

    /// Pre-assembled news text for reduced two-source scoring, if this
    /// provider has one for `symbol`.
    fn combined_news(&self, _symbol: &str) -> Option<String> {
        None
    }
}

pub trait SocialProvider: Send + Sync {
    fn posts(&self, symbol: &str) -> Result<Vec<SocialPost>, DataError>;
}

/// What a judgment request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Opinion(Source),
    CombinedNews,
}

impl EvidenceKind {
    pub fn is_social(self) -> bool {
        matches!(self, EvidenceKind::Opinion(Source::Social))
    }

    pub fn id(self) -> &'static str {
        match self {
            EvidenceKind::Opinion(source) => source.id(),
            EvidenceKind::CombinedNews => "combined_news",
        }
    }
}

/// Everything the judge is told about one piece of evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentRequest {
    pub symbol: String,
    pub category: Category,
    pub kind: EvidenceKind,
    pub evidence: String,
}

/// The natural-language judgment step. Returns the raw payload text; parsing
/// and validation happen in the engine.
pub trait JudgmentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn judge(&self, request: &JudgmentRequest) -> Result<String, JudgeError>;
}
