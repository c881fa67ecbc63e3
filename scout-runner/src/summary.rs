//! Run summary for the score stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::score::{JudgmentOutcome, ScoredCandidate};
use crate::snapshot::{round2, RunStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub analyzed: usize,
    pub approved: usize,
    /// Candidates dropped before scoring.
    pub skipped: usize,
    pub unavailable_judgments: usize,
    pub malformed_judgments: usize,
    /// approved / analyzed, 0 when nothing was analyzed.
    pub approval_rate: f64,
    /// Mean rounded confidence of approved tickers, 0 when none.
    pub avg_confidence: f64,
    pub status: RunStatus,
}

impl RunSummary {
    pub fn from_scored(scored: &[ScoredCandidate], skipped: usize) -> Self {
        let analyzed = scored.len();
        let approved: Vec<f64> = scored
            .iter()
            .filter(|s| s.result.approved)
            .map(|s| round2(s.result.final_confidence))
            .collect();

        let approval_rate = if analyzed > 0 {
            approved.len() as f64 / analyzed as f64
        } else {
            0.0
        };
        let avg_confidence = if approved.is_empty() {
            0.0
        } else {
            approved.iter().sum::<f64>() / approved.len() as f64
        };

        Self {
            analyzed,
            approved: approved.len(),
            skipped,
            unavailable_judgments: scored
                .iter()
                .map(|s| s.count(JudgmentOutcome::Unavailable))
                .sum(),
            malformed_judgments: scored.iter().map(|s| s.count(JudgmentOutcome::Malformed)).sum(),
            approval_rate,
            avg_confidence,
            status: if approved.is_empty() {
                RunStatus::NoCandidates
            } else {
                RunStatus::Success
            },
        }
    }

    pub fn has_candidates(&self) -> bool {
        self.status == RunStatus::Success
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analyzed: {}", self.analyzed)?;
        writeln!(
            f,
            "Approved: {} ({:.0}%)",
            self.approved,
            self.approval_rate * 100.0
        )?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        writeln!(
            f,
            "Judgments unavailable: {}, malformed: {}",
            self.unavailable_judgments, self.malformed_judgments
        )?;
        write!(f, "Avg Confidence: {:.2}", self.avg_confidence)
    }
}
