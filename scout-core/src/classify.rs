//! Strategy classification.
//!
//! An ordered, first-match-wins rule table maps an [`IndicatorSnapshot`] to at
//! most one [`Category`] and a category-specific raw score. The order is
//! policy: several predicates overlap (e.g. condor and short both accept a
//! price below the SMA200) and the earlier rule takes the ticker.

use serde::{Deserialize, Serialize};

use crate::domain::Category;
use crate::indicators::IndicatorSnapshot;

/// Outcome of classifying one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    Classified { category: Category, raw_score: f64 },
    Unclassified,
}

impl Classification {
    pub fn category(&self) -> Option<Category> {
        match self {
            Classification::Classified { category, .. } => Some(*category),
            Classification::Unclassified => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, Classification::Classified { .. })
    }
}

/// One row of the classification table.
pub struct Rule {
    pub category: Category,
    pub condition: &'static str,
    pub matches: fn(&IndicatorSnapshot) -> bool,
    pub score: fn(&IndicatorSnapshot) -> f64,
}

/// Evaluated top to bottom.
pub const RULES: [Rule; 5] = [
    Rule {
        category: Category::Trend,
        condition: "price > sma200 && adx > 25 && 55 < rsi < 75",
        matches: |s| s.price > s.sma200 && s.adx > 25.0 && s.rsi > 55.0 && s.rsi < 75.0,
        score: |s| s.adx,
    },
    Rule {
        category: Category::Survivor,
        condition: "price > sma200 && rsi < 40",
        matches: |s| s.price > s.sma200 && s.rsi < 40.0,
        score: |s| 50.0 - s.rsi,
    },
    Rule {
        category: Category::Wheel,
        condition: "price > sma200 && 40 <= rsi <= 55",
        matches: |s| s.price > s.sma200 && s.rsi >= 40.0 && s.rsi <= 55.0,
        score: |s| 50.0 - s.rsi,
    },
    Rule {
        category: Category::Condor,
        condition: "adx < 20 && 40 < rsi < 60",
        matches: |s| s.adx < 20.0 && s.rsi > 40.0 && s.rsi < 60.0,
        score: |s| 20.0 - s.adx,
    },
    Rule {
        category: Category::Short,
        condition: "price < sma200",
        matches: |s| s.price < s.sma200,
        score: |s| s.adx,
    },
];

/// Apply the rule table; the first matching rule wins.
pub fn classify(snapshot: &IndicatorSnapshot) -> Classification {
    RULES
        .iter()
        .find(|rule| (rule.matches)(snapshot))
        .map(|rule| Classification::Classified {
            category: rule.category,
            raw_score: (rule.score)(snapshot),
        })
        .unwrap_or(Classification::Unclassified)
}
