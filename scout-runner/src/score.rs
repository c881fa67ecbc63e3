//! Score stage: candidates + evidence → confidence → approved buckets.
//!
//! For each candidate the technical score is normalized, evidence is gathered
//! per source, each source is judged, parsed, and validated, and the
//! aggregator produces the final confidence. A judge failure leaves that
//! source unavailable; an unparseable judgment is a present zero.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use scout_core::evidence::{parse_judgment, validate};
use scout_core::{
    Buckets, Category, ConfidenceAggregator, ConfidenceResult, Evidence, Opinion, Ranked, Source,
    SourceOpinions,
};

use crate::config::ScoutConfig;
use crate::news::{social_evidence, tiered_news};
use crate::provider::{
    EvidenceKind, JudgmentProvider, JudgmentRequest, NewsProvider, SocialProvider,
};
use crate::scan::Candidate;
use crate::snapshot::{round2, TargetEntry};

/// How one judgment request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgmentOutcome {
    Valid,
    Malformed,
    Unavailable,
}

/// Scoring result for one candidate.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub result: ConfidenceResult,
    pub judgments: Vec<(EvidenceKind, JudgmentOutcome)>,
}

impl ScoredCandidate {
    pub fn count(&self, outcome: JudgmentOutcome) -> usize {
        self.judgments.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// Human-readable justification stored with an approved target.
    pub fn master_reason(&self) -> String {
        format!(
            "Tech Score: {:.2} -> {:.2}. {}",
            self.candidate.tech_score,
            self.result.technical,
            self.result.breakdown_line()
        )
    }

    pub fn target_entry(&self) -> TargetEntry {
        TargetEntry {
            symbol: self.result.symbol.clone(),
            confidence: round2(self.result.final_confidence),
            reason: self.master_reason(),
        }
    }
}

impl Ranked for ScoredCandidate {
    fn category(&self) -> Category {
        self.result.category
    }

    fn rank_score(&self) -> f64 {
        self.result.final_confidence
    }
}

/// Runs the score stage over a candidate list, optionally in parallel.
pub struct Scorer<'a> {
    config: &'a ScoutConfig,
    aggregator: ConfidenceAggregator,
    news: &'a dyn NewsProvider,
    social: &'a dyn SocialProvider,
    judge: &'a dyn JudgmentProvider,
    parallel: bool,
}

impl<'a> Scorer<'a> {
    pub fn new(
        config: &'a ScoutConfig,
        news: &'a dyn NewsProvider,
        social: &'a dyn SocialProvider,
        judge: &'a dyn JudgmentProvider,
    ) -> Self {
        Self {
            config,
            aggregator: ConfidenceAggregator::new(&config.engine),
            news,
            social,
            judge,
            parallel: config.scan.parallel,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn score_all(&self, candidates: &[Candidate], now: DateTime<Utc>) -> Vec<ScoredCandidate> {
        if self.parallel {
            candidates.par_iter().map(|c| self.score_one(c, now)).collect()
        } else {
            candidates.iter().map(|c| self.score_one(c, now)).collect()
        }
    }


    /// Approved targets per category, ready for the targets snapshot.
    pub fn targets(&self, scored: &[ScoredCandidate]) -> Buckets<TargetEntry> {
        Buckets::assemble(
            scored.iter().filter(|s| s.result.approved).cloned(),
            self.config.engine.bucket_capacity,
        )
        .map(|s| s.target_entry())
    }

    pub fn score_one(&self, candidate: &Candidate, now: DateTime<Utc>) -> ScoredCandidate {
        let symbol = candidate.symbol.as_str();
        let technical = candidate.normalized_score();
        let mut judgments = Vec::new();

        let headlines = self.news.headlines(symbol).unwrap_or_else(|e| {
            warn!(symbol, error = %e, "news unavailable");
            Vec::new()
        });
        let posts = self.social.posts(symbol).unwrap_or_else(|e| {
            warn!(symbol, error = %e, "social posts unavailable");
            Vec::new()
        });

        let tiers = tiered_news(&headlines, now, &self.config.news);
        let social_text = social_evidence(&posts, &self.config.social);

        let evidence = match self.news.combined_news(symbol) {
            Some(text) if tiers.is_empty() && social_text.is_none() && !text.trim().is_empty() => {
                // the combined block is validated as top-tier news
                let opinion = self.ask(
                    candidate,
                    EvidenceKind::CombinedNews,
                    Source::Tier1News,
                    text,
                    &mut judgments,
                );
                Evidence::Reduced(opinion)
            }
            _ => {
                let mut opinions = SourceOpinions::new();
                for source in Source::ALL {
                    let text = match source {
                        Source::Social => social_text.clone(),
                        news_tier => tiers.get(news_tier).map(str::to_string),
                    };
                    let Some(text) = text else { continue };
                    if let Some(opinion) =
                        self.ask(candidate, EvidenceKind::Opinion(source), source, text, &mut judgments)
                    {
                        opinions.insert(opinion);
                    }
                }
                Evidence::MultiSource(opinions)
            }
        };

        let result = self
            .aggregator
            .evaluate(symbol, candidate.category, technical, &evidence);

        info!(
            symbol,
            category = %result.category,
            confidence = result.final_confidence,
            approved = result.approved,
            breakdown = %result.breakdown_line(),
            "scored"
        );

        ScoredCandidate {
            candidate: candidate.clone(),
            result,
            judgments,
        }
    }

    /// Judge one evidence text. `None` means the opinion is unavailable.
    fn ask(
        &self,
        candidate: &Candidate,
        kind: EvidenceKind,
        source: Source,
        evidence: String,
        judgments: &mut Vec<(EvidenceKind, JudgmentOutcome)>,
    ) -> Option<Opinion> {
        let request = JudgmentRequest {
            symbol: candidate.symbol.clone(),
            category: candidate.category,
            kind,
            evidence,
        };

        let payload = match self.judge.judge(&request) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(symbol = %candidate.symbol, source = kind.id(), error = %e, "judgment unavailable");
                judgments.push((kind, JudgmentOutcome::Unavailable));
                return None;
            }
        };

        match parse_judgment(&payload) {
            Ok(raw) => {
                let validated = validate(source, raw, &self.config.engine.validator);
                for note in &validated.notes {
                    warn!(symbol = %candidate.symbol, source = kind.id(), "{note}");
                }
                judgments.push((kind, JudgmentOutcome::Valid));
                Some(validated.opinion)
            }
            Err(e) => {
                warn!(symbol = %candidate.symbol, source = kind.id(), error = %e, "malformed judgment");
                judgments.push((kind, JudgmentOutcome::Malformed));
                Some(Opinion::malformed(source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(symbol: &str, category: Category, tech_score: f64) -> ScoredCandidate {
        let candidate = Candidate {
            symbol: symbol.to_string(),
            category,
            tech_score,
            indicators: None,
        };
        let result = ConfidenceAggregator::default().evaluate(
            symbol,
            category,
            candidate.normalized_score(),
            &Evidence::Reduced(None),
        );
        ScoredCandidate {
            candidate,
            result,
            judgments: vec![(EvidenceKind::Opinion(Source::Social), JudgmentOutcome::Unavailable)],
        }
    }

    #[test]
    fn master_reason_shows_raw_and_normalized_score() {
        let s = scored("F", Category::Wheel, 8.0);
        assert_eq!(
            s.master_reason(),
            "Tech Score: 8.00 -> 0.80. Tech: 0.80 | T1: N/A | T2: N/A | T3: N/A | Soc: N/A"
        );
        assert_eq!(s.target_entry().confidence, 0.8);
    }

    #[test]
    fn outcome_counts() {
        let s = scored("F", Category::Wheel, 8.0);
        assert_eq!(s.count(JudgmentOutcome::Unavailable), 1);
        assert_eq!(s.count(JudgmentOutcome::Valid), 0);
    }

    #[test]
    fn ranks_by_final_confidence() {
        let s = scored("NVDA", Category::Trend, 70.0);
        assert_eq!(s.category(), Category::Trend);
        assert!((s.rank_score() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn targets_keep_approved_best_first() {
        let config = ScoutConfig::default();
        let evidence = crate::EvidenceFile::default();
        let judge = crate::HttpJudge::new(&config.judge).unwrap();
        let scorer = Scorer::new(&config, &evidence, &evidence, &judge);

        let results = vec![
            scored("F", Category::Wheel, 8.0),
            scored("SOFI", Category::Wheel, 3.0),
            scored("AMD", Category::Wheel, 9.0),
            scored("CVNA", Category::Short, 70.0),
        ];
        let targets = scorer.targets(&results);

        let wheel: Vec<(&str, f64)> = targets
            .get(Category::Wheel)
            .iter()
            .map(|t| (t.symbol.as_str(), t.confidence))
            .collect();
        assert_eq!(wheel, vec![("AMD", 0.9), ("F", 0.8)]);
        assert_eq!(targets.get(Category::Short)[0].symbol, "CVNA");
        assert_eq!(targets.total(), 3);
    }
}
