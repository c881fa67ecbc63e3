//! Confidence aggregation.
//!
//! Blends the normalized technical score with up to four validated opinions.
//!
//! Multi-source mode: fixed weights per source; an unavailable source's
//! weight moves to the technical component. The result is divided by the
//! realized weight sum only when that sum is more than the tolerance away
//! from 1.0.
//!
//! Reduced mode: `technical × w_t + news × w_n` with a single combined news
//! opinion.
//!
//! Approval is strictly greater than the threshold in both modes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::domain::Category;
use crate::evidence::{Opinion, Source};

/// Multi-source weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub technical: f64,
    pub tier1_news: f64,
    pub tier2_news: f64,
    pub tier3_news: f64,
    pub social: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            technical: 0.30,
            tier1_news: 0.30,
            tier2_news: 0.20,
            tier3_news: 0.10,
            social: 0.10,
        }
    }
}

impl SourceWeights {
    pub fn get(&self, source: Source) -> f64 {
        match source {
            Source::Tier1News => self.tier1_news,
            Source::Tier2News => self.tier2_news,
            Source::Tier3News => self.tier3_news,
            Source::Social => self.social,
        }
    }

    pub fn sum(&self) -> f64 {
        self.technical + Source::ALL.iter().map(|s| self.get(*s)).sum::<f64>()
    }

    /// `(name, weight)` pairs, technical first.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("technical", self.technical),
            (Source::Tier1News.id(), self.tier1_news),
            (Source::Tier2News.id(), self.tier2_news),
            (Source::Tier3News.id(), self.tier3_news),
            (Source::Social.id(), self.social),
        ]
    }
}

/// Two-source blend for the reduced mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducedBlend {
    pub technical: f64,
    pub news: f64,
}

impl Default for ReducedBlend {
    fn default() -> Self {
        Self {
            technical: 0.4,
            news: 0.6,
        }
    }
}

/// Opinions gathered for one ticker, at most one per source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceOpinions {
    slots: [Option<Opinion>; 4],
}

impl SourceOpinions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an opinion under its own source, replacing any earlier one.
    pub fn insert(&mut self, opinion: Opinion) {
        let idx = opinion.source.index();
        self.slots[idx] = Some(opinion);
    }

    pub fn get(&self, source: Source) -> Option<&Opinion> {
        self.slots[source.index()].as_ref()
    }
}

impl FromIterator<Opinion> for SourceOpinions {
    fn from_iter<I: IntoIterator<Item = Opinion>>(iter: I) -> Self {
        let mut opinions = Self::new();
        for o in iter {
            opinions.insert(o);
        }
        opinions
    }
}

/// The evidence shape decides the aggregation mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// Per-source opinions; missing sources are reallocated.
    MultiSource(SourceOpinions),
    /// One combined news opinion. `None` degrades to technical only.
    Reduced(Option<Opinion>),
}

/// One component of a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Technical,
    #[serde(rename = "tier1_news")]
    Tier1News,
    #[serde(rename = "tier2_news")]
    Tier2News,
    #[serde(rename = "tier3_news")]
    Tier3News,
    Social,
    CombinedNews,
}

impl Component {
    pub fn label(self) -> &'static str {
        match self {
            Component::Technical => "Tech",
            Component::Tier1News => Source::Tier1News.label(),
            Component::Tier2News => Source::Tier2News.label(),
            Component::Tier3News => Source::Tier3News.label(),
            Component::Social => Source::Social.label(),
            Component::CombinedNews => "News",
        }
    }
}

impl From<Source> for Component {
    fn from(source: Source) -> Self {
        match source {
            Source::Tier1News => Component::Tier1News,
            Source::Tier2News => Component::Tier2News,
            Source::Tier3News => Component::Tier3News,
            Source::Social => Component::Social,
        }
    }
}

/// A component's contribution. `score` is `None` for an unavailable source,
/// whose weight is then zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub component: Component,
    pub weight: f64,
    pub score: Option<f64>,
    pub weighted: f64,
}

impl fmt::Display for BreakdownEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(s) => write!(f, "{}: {s:.2}", self.component.label()),
            None => write!(f, "{}: N/A", self.component.label()),
        }
    }
}

/// Final, immutable confidence for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub symbol: String,
    pub category: Category,
    pub technical: f64,
    pub final_confidence: f64,
    pub approved: bool,
    pub breakdown: Vec<BreakdownEntry>,
}

impl ConfidenceResult {
    /// e.g. `Tech: 0.60 | T1: 0.80 | T2: N/A | T3: N/A | Soc: 0.55`
    pub fn breakdown_line(&self) -> String {
        self.breakdown
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn score_for(&self, component: Component) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|e| e.component == component)
            .and_then(|e| e.score)
    }

    pub fn weight_sum(&self) -> f64 {
        self.breakdown.iter().map(|e| e.weight).sum()
    }
}

/// Aggregator with its weights fixed at construction.
#[derive(Debug, Clone)]
pub struct ConfidenceAggregator {
    weights: SourceWeights,
    reduced: ReducedBlend,
    approval_threshold: f64,
    renormalize_tolerance: f64,
}

impl Default for ConfidenceAggregator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ConfidenceAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            reduced: config.reduced.clone(),
            approval_threshold: config.approval_threshold,
            renormalize_tolerance: config.renormalize_tolerance,
        }
    }

    pub fn evaluate(
        &self,
        symbol: &str,
        category: Category,
        technical: f64,
        evidence: &Evidence,
    ) -> ConfidenceResult {
        let technical = unit(technical);
        let (final_confidence, breakdown) = match evidence {
            Evidence::MultiSource(opinions) => self.multi_source(technical, opinions),
            Evidence::Reduced(Some(news)) => self.reduced(technical, news),
            Evidence::Reduced(None) => self.multi_source(technical, &SourceOpinions::new()),
        };

        ConfidenceResult {
            symbol: symbol.to_string(),
            category,
            technical,
            final_confidence,
            approved: final_confidence > self.approval_threshold,
            breakdown,
        }
    }

    fn multi_source(&self, technical: f64, opinions: &SourceOpinions) -> (f64, Vec<BreakdownEntry>) {
        let mut tech_weight = self.weights.technical;
        let mut entries = Vec::with_capacity(5);

        for source in Source::ALL {
            match opinions.get(source) {
                Some(opinion) => {
                    let weight = self.weights.get(source);
                    let score = unit(opinion.score);
                    entries.push(BreakdownEntry {
                        component: source.into(),
                        weight,
                        score: Some(score),
                        weighted: weight * score,
                    });
                }
                None => {
                    tech_weight += self.weights.get(source);
                    entries.push(BreakdownEntry {
                        component: source.into(),
                        weight: 0.0,
                        score: None,
                        weighted: 0.0,
                    });
                }
            }
        }

        entries.insert(
            0,
            BreakdownEntry {
                component: Component::Technical,
                weight: tech_weight,
                score: Some(technical),
                weighted: tech_weight * technical,
            },
        );

        let total_weight: f64 = entries.iter().map(|e| e.weight).sum();
        let mut final_confidence: f64 = entries.iter().map(|e| e.weighted).sum();
        if total_weight > 0.0 && (total_weight - 1.0).abs() > self.renormalize_tolerance {
            final_confidence /= total_weight;
        }

        (unit(final_confidence), entries)
    }

    fn reduced(&self, technical: f64, news: &Opinion) -> (f64, Vec<BreakdownEntry>) {
        let news_score = unit(news.score);
        let entries = vec![
            BreakdownEntry {
                component: Component::Technical,
                weight: self.reduced.technical,
                score: Some(technical),
                weighted: self.reduced.technical * technical,
            },
            BreakdownEntry {
                component: Component::CombinedNews,
                weight: self.reduced.news,
                score: Some(news_score),
                weighted: self.reduced.news * news_score,
            },
        ];
        let final_confidence = entries.iter().map(|e| e.weighted).sum();
        (unit(final_confidence), entries)
    }
}

fn unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opinion(source: Source, score: f64) -> Opinion {
        Opinion {
            source,
            score,
            reason: "test".to_string(),
        }
    }

    fn all_sources(score: f64) -> Evidence {
        Evidence::MultiSource(Source::ALL.iter().map(|s| opinion(*s, score)).collect())
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert!((SourceWeights::default().sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn all_half_is_not_approved() {
        let r = ConfidenceAggregator::default().evaluate("SPY", Category::Condor, 0.5, &all_sources(0.5));
        assert!((r.final_confidence - 0.5).abs() < 1e-12);
        assert!(!r.approved);
    }

    #[test]
    fn all_missing_is_technical() {
        let r = ConfidenceAggregator::default().evaluate(
            "NVDA",
            Category::Trend,
            0.8,
            &Evidence::MultiSource(SourceOpinions::new()),
        );
        assert!((r.final_confidence - 0.8).abs() < 1e-12);
        assert!(r.approved);
        assert!((r.breakdown[0].weight - 1.0).abs() < 1e-12);
        assert_eq!(r.breakdown_line(), "Tech: 0.80 | T1: N/A | T2: N/A | T3: N/A | Soc: N/A");
    }

    #[test]
    fn missing_tier1_moves_weight_to_technical() {
        let opinions: SourceOpinions = vec![
            opinion(Source::Tier2News, 1.0),
            opinion(Source::Tier3News, 1.0),
            opinion(Source::Social, 1.0),
        ]
        .into_iter()
        .collect();
        let r = ConfidenceAggregator::default().evaluate(
            "AMD",
            Category::Wheel,
            0.0,
            &Evidence::MultiSource(opinions),
        );
        // tech weight 0.6 at score 0, remaining 0.4 at score 1
        assert!((r.final_confidence - 0.4).abs() < 1e-12);
        assert!((r.breakdown[0].weight - 0.6).abs() < 1e-12);
        assert!((r.weight_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_opinion_counts_as_present_zero() {
        let opinions: SourceOpinions = vec![Opinion::malformed(Source::Tier1News)].into_iter().collect();
        let r = ConfidenceAggregator::default().evaluate(
            "F",
            Category::Wheel,
            1.0,
            &Evidence::MultiSource(opinions),
        );
        // tier1 keeps its 0.30 weight at score 0
        assert!((r.final_confidence - 0.7).abs() < 1e-12);
        assert_eq!(r.score_for(Component::Tier1News), Some(0.0));
    }

    #[test]
    fn reduced_mode_blend() {
        let r = ConfidenceAggregator::default().evaluate(
            "TSLA",
            Category::Trend,
            0.5,
            &Evidence::Reduced(Some(opinion(Source::Tier1News, 0.6))),
        );
        // 0.4 * 0.5 + 0.6 * 0.6 = 0.56
        assert!((r.final_confidence - 0.56).abs() < 1e-12);
        assert!(r.approved);
        assert_eq!(r.breakdown_line(), "Tech: 0.50 | News: 0.60");
    }

    #[test]
    fn reduced_without_news_falls_back_to_technical() {
        let r = ConfidenceAggregator::default().evaluate(
            "TSLA",
            Category::Trend,
            0.45,
            &Evidence::Reduced(None),
        );
        assert!((r.final_confidence - 0.45).abs() < 1e-12);
        assert!(!r.approved);
    }

    #[test]
    fn unbalanced_weights_are_renormalized() {
        let config = EngineConfig {
            weights: SourceWeights {
                technical: 0.5,
                tier1_news: 0.5,
                tier2_news: 0.5,
                tier3_news: 0.25,
                social: 0.25,
            },
            ..EngineConfig::default()
        };
        let r = ConfidenceAggregator::new(&config).evaluate("X", Category::Short, 0.6, &all_sources(0.6));
        assert!((r.final_confidence - 0.6).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_inputs_are_bounded() {
        let r = ConfidenceAggregator::default().evaluate("X", Category::Short, 7.0, &all_sources(-3.0));
        assert!((0.0..=1.0).contains(&r.final_confidence));
        assert_eq!(r.technical, 1.0);
    }
}
