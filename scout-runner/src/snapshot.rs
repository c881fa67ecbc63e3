//! Point-in-time snapshot files.
//!
//! - Candidate snapshot (scan output): one list per category of
//!   `{symbol, tech_score, indicators}` plus `updated`.
//! - Targets snapshot (score output): one list per category of
//!   `{symbol, confidence, reason}` plus `updated`, `status`, and `run_id`.
//!
//! Loading candidates tolerates the older shape where a list holds bare
//! symbols, and falls back to the core watchlist when the snapshot is
//! missing, unreadable, or stale.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use scout_core::{Buckets, Category};

use crate::error::RunError;
use crate::scan::{Candidate, CandidateEntry, DEFAULT_TECH_SCORE};

/// Candidate snapshots at least this old are ignored.
pub const MAX_CANDIDATE_AGE_HOURS: i64 = 24;

/// Fixed fallback universe, used when no fresh candidate snapshot exists.
pub const CORE_WATCHLIST: [(Category, &[&str]); 5] = [
    (Category::Condor, &["SPY", "IWM", "QQQ"]),
    (Category::Wheel, &["F", "PLTR", "SOFI", "AMD"]),
    (Category::Trend, &["NVDA", "TSLA", "COIN", "MSTR"]),
    (Category::Survivor, &["TQQQ", "SOXL", "UPRO"]),
    (Category::Short, &["CVNA", "RIVN", "LCID"]),
];

pub fn core_watchlist() -> Vec<Candidate> {
    CORE_WATCHLIST
        .iter()
        .flat_map(|(category, symbols)| {
            symbols
                .iter()
                .map(move |s| Candidate::with_default_score(*s, *category))
        })
        .collect()
}

/// Where the scored candidates came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOrigin {
    Snapshot { path: PathBuf, age_hours: i64 },
    Watchlist { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCandidates {
    pub candidates: Vec<Candidate>,
    pub origin: CandidateOrigin,
    /// Entries dropped while loading (e.g. pair symbols containing '/').
    pub skipped: usize,
}

/// Write the scan output.
pub fn write_candidates(
    path: &Path,
    candidates: &Buckets<Candidate>,
    updated: DateTime<Utc>,
) -> Result<(), RunError> {
    let entries = candidates.clone().map(CandidateEntry::from);
    let mut doc = serde_json::to_value(&entries).map_err(|e| snapshot_err(path, e))?;
    if let Some(map) = doc.as_object_mut() {
        map.insert("updated".to_string(), serde_json::Value::String(updated.to_rfc3339()));
    }
    write_json(path, &doc)
}

/// Read candidates, falling back to the core watchlist when the snapshot is
/// missing, unreadable, dated in the future, or at least [`MAX_CANDIDATE_AGE_HOURS`] old.
///
/// Age comes from the snapshot's `updated` field, or the file's modification
/// time when that field is absent.
pub fn load_candidates(path: &Path, now: DateTime<Utc>) -> LoadedCandidates {
    match read_candidates(path, now) {
        Ok(loaded) => loaded,
        Err(reason) => LoadedCandidates {
            candidates: core_watchlist(),
            origin: CandidateOrigin::Watchlist { reason },
            skipped: 0,
        },
    }
}

fn read_candidates(path: &Path, now: DateTime<Utc>) -> Result<LoadedCandidates, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let doc: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    let map = doc
        .as_object()
        .ok_or_else(|| format!("{} is not a JSON object", path.display()))?;

    let updated = match map.get("updated").and_then(|v| v.as_str()) {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| format!("bad 'updated' timestamp '{s}': {e}"))?,
        None => modified_time(path)?,
    };
    let age = now.signed_duration_since(updated);
    if age < Duration::zero() {
        return Err(format!(
            "{} is dated {} hours in the future",
            path.display(),
            -age.num_hours()
        ));
    }
    if age >= Duration::hours(MAX_CANDIDATE_AGE_HOURS) {
        return Err(format!(
            "{} is {} hours old",
            path.display(),
            age.num_hours()
        ));
    }

    let mut candidates = Vec::new();
    let mut skipped = 0;
    for category in Category::ALL {
        let Some(list) = map.get(category.bucket_key()).and_then(|v| v.as_array()) else {
            continue;
        };
        for entry in list {
            match parse_entry(entry, category) {
                Some(c) if !c.symbol.contains('/') => candidates.push(c),
                _ => skipped += 1,
            }
        }
    }

    Ok(LoadedCandidates {
        candidates,
        origin: CandidateOrigin::Snapshot {
            path: path.to_path_buf(),
            age_hours: age.num_hours(),
        },
        skipped,
    })
}

fn parse_entry(entry: &serde_json::Value, category: Category) -> Option<Candidate> {
    match entry {
        serde_json::Value::String(symbol) => {
            Some(Candidate::with_default_score(symbol.trim(), category))
        }
        serde_json::Value::Object(_) => {
            let e: CandidateEntry = match serde_json::from_value(entry.clone()) {
                Ok(e) => e,
                Err(_) => {
                    // symbol with no usable score
                    let symbol = entry.get("symbol")?.as_str()?;
                    return Some(Candidate::with_default_score(symbol.trim(), category));
                }
            };
            Some(Candidate {
                symbol: e.symbol.trim().to_string(),
                category,
                tech_score: if e.tech_score.is_finite() {
                    e.tech_score
                } else {
                    DEFAULT_TECH_SCORE
                },
                indicators: e.indicators,
            })
        }
        _ => None,
    }
}

fn modified_time(path: &Path) -> Result<DateTime<Utc>, String> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| format!("cannot stat {}: {e}", path.display()))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Overall outcome of a scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    NoCandidates,
}

/// One approved ticker in the targets snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub symbol: String,
    /// Rounded to two decimals.
    pub confidence: f64,
    pub reason: String,
}

/// The score stage's output document.
#[derive(Debug, Clone, Serialize)]
pub struct TargetsSnapshot {
    #[serde(flatten)]
    pub targets: Buckets<TargetEntry>,
    pub updated: DateTime<Utc>,
    pub status: RunStatus,
    pub run_id: String,
}

impl TargetsSnapshot {
    pub fn write(&self, path: &Path) -> Result<(), RunError> {
        let doc = serde_json::to_value(self).map_err(|e| snapshot_err(path, e))?;
        write_json(path, &doc)
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn write_json(path: &Path, doc: &serde_json::Value) -> Result<(), RunError> {
    let text = serde_json::to_string_pretty(doc).map_err(|e| snapshot_err(path, e))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| snapshot_err(path, e))?;
    }
    std::fs::write(path, text).map_err(|e| snapshot_err(path, e))
}

fn snapshot_err(path: &Path, e: impl std::fmt::Display) -> RunError {
    RunError::Snapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
