//! Scan stage: price history → indicator snapshot → category.
//!
//! Every ticker is independent. Tickers without usable history are skipped
//! and counted by reason; they never receive a default category.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use scout_core::{
    classify, normalize, Buckets, Category, Classification, EngineConfig, IndicatorSnapshot,
    InsufficientData, Ranked,
};

use crate::provider::{DataError, PriceHistoryProvider};

/// A classified ticker awaiting evidence scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub symbol: String,
    pub category: Category,
    /// Raw category score from classification.
    pub tech_score: f64,
    pub indicators: Option<IndicatorSnapshot>,
}

impl Candidate {
    /// Candidate known only by symbol; used by the core watchlist and bare
    /// snapshot entries.
    pub fn with_default_score(symbol: impl Into<String>, category: Category) -> Self {
        Self {
            symbol: symbol.into(),
            category,
            tech_score: DEFAULT_TECH_SCORE,
            indicators: None,
        }
    }

    pub fn normalized_score(&self) -> f64 {
        normalize(self.category, self.tech_score)
    }
}

/// Raw technical score assumed when none was recorded.
pub const DEFAULT_TECH_SCORE: f64 = 50.0;

impl Ranked for Candidate {
    fn category(&self) -> Category {
        self.category
    }

    fn rank_score(&self) -> f64 {
        self.tech_score
    }
}

/// Serialized form of a candidate inside its category list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub symbol: String,
    pub tech_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorSnapshot>,
}

impl From<Candidate> for CandidateEntry {
    fn from(c: Candidate) -> Self {
        Self {
            symbol: c.symbol,
            tech_score: c.tech_score,
            indicators: c.indicators,
        }
    }
}

/// What happened to one ticker.
#[derive(Debug)]
pub enum ScanOutcome {
    Classified(Candidate),
    Unclassified,
    Insufficient(InsufficientData),
    NoData(DataError),
}

/// Scan results and skip accounting.
#[derive(Debug)]
pub struct ScanReport {
    pub candidates: Buckets<Candidate>,
    pub requested: usize,
    pub classified: usize,
    pub unclassified: usize,
    pub no_data: usize,
    /// Insufficient-data skips grouped by reason.
    pub insufficient: BTreeMap<&'static str, usize>,
}

impl ScanReport {
    pub fn skipped(&self) -> usize {
        self.no_data + self.insufficient.values().sum::<usize>()
    }
}

/// Evaluate one series into an outcome.
pub fn evaluate_symbol(
    symbol: &str,
    provider: &dyn PriceHistoryProvider,
    engine: &EngineConfig,
) -> ScanOutcome {
    let series = match provider.history(symbol, engine.min_history.max(LOOKBACK_BARS)) {
        Ok(series) => series,
        Err(e) => return ScanOutcome::NoData(e),
    };

    let snapshot = match IndicatorSnapshot::from_series(&series, engine.min_history) {
        Ok(snapshot) => snapshot,
        Err(e) => return ScanOutcome::Insufficient(e),
    };

    match classify(&snapshot) {
        Classification::Classified {
            category,
            raw_score,
        } => ScanOutcome::Classified(Candidate {
            symbol: symbol.to_string(),
            category,
            tech_score: raw_score,
            indicators: Some(snapshot),
        }),
        Classification::Unclassified => ScanOutcome::Unclassified,
    }
}

/// Bars requested per ticker: about two years of daily history.
pub const LOOKBACK_BARS: usize = 504;

/// Runs the scan over a ticker list, optionally in parallel.
pub struct Scanner<'a> {
    prices: &'a dyn PriceHistoryProvider,
    engine: &'a EngineConfig,
    parallel: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(prices: &'a dyn PriceHistoryProvider, engine: &'a EngineConfig) -> Self {
        Self {
            prices,
            engine,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn scan(&self, symbols: &[String]) -> ScanReport {
        let outcomes: Vec<(&String, ScanOutcome)> = if self.parallel {
            symbols
                .par_iter()
                .map(|s| (s, evaluate_symbol(s, self.prices, self.engine)))
                .collect()
        } else {
            symbols
                .iter()
                .map(|s| (s, evaluate_symbol(s, self.prices, self.engine)))
                .collect()
        };

        let mut candidates = Vec::new();
        let mut unclassified = 0;
        let mut no_data = 0;
        let mut insufficient: BTreeMap<&'static str, usize> = BTreeMap::new();

        for (symbol, outcome) in outcomes {
            match outcome {
                ScanOutcome::Classified(c) => {
                    debug!(symbol = %symbol, category = %c.category, tech_score = c.tech_score, "classified");
                    candidates.push(c);
                }
                ScanOutcome::Unclassified => {
                    debug!(symbol = %symbol, "no rule matched");
                    unclassified += 1;
                }
                ScanOutcome::Insufficient(e) => {
                    debug!(symbol = %symbol, reason = %e, "skipped: insufficient data");
                    *insufficient.entry(e.kind()).or_default() += 1;
                }
                ScanOutcome::NoData(e) => {
                    debug!(symbol = %symbol, error = %e, "skipped: no price data");
                    no_data += 1;
                }
            }
        }

        let classified = candidates.len();
        let report = ScanReport {
            candidates: Buckets::assemble(candidates, self.engine.bucket_capacity),
            requested: symbols.len(),
            classified,
            unclassified,
            no_data,
            insufficient,
        };

        info!(
            requested = report.requested,
            classified = report.classified,
            unclassified = report.unclassified,
            skipped = report.skipped(),
            kept = report.candidates.total(),
            "scan complete"
        );
        report
    }
}
