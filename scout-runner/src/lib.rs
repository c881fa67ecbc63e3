//! Sector Scout Runner: scan and score orchestration around `scout-core`.
//!
//! This crate provides:
//! - Collaborator traits for price history, news, social posts, and judgments
//! - CSV price import and an HTTP judge adapter
//! - Tiered news and social evidence assembly with an owned rate gate
//! - The scan stage (history → category) and score stage (evidence →
//!   confidence), each parallel across tickers
//! - Candidate and targets snapshot files, run summary

pub mod config;
pub mod csv_prices;
pub mod error;
pub mod evidence_file;
pub mod judge;
pub mod news;
pub mod provider;
pub mod rate_gate;
pub mod scan;
pub mod score;
pub mod snapshot;
pub mod summary;

pub use config::{JudgeConfig, NewsConfig, ScanConfig, ScoutConfig, SocialConfig};
pub use csv_prices::CsvPriceProvider;
pub use error::RunError;
pub use evidence_file::EvidenceFile;
pub use judge::HttpJudge;
pub use provider::{
    DataError, EvidenceKind, JudgeError, JudgmentProvider, JudgmentRequest, NewsItem, NewsProvider,
    PriceHistoryProvider, SocialPost, SocialProvider,
};
pub use rate_gate::{RateGate, RateLimitedSocial};
pub use scan::{Candidate, ScanReport, Scanner};
pub use score::{ScoredCandidate, Scorer};
pub use snapshot::{load_candidates, write_candidates, RunStatus, TargetEntry, TargetsSnapshot};
pub use summary::RunSummary;
