//! Opinion sources, judgment payload parsing, and the evidence validator.
//!
//! An external judge turns evidence text into a raw `(score, reason)` pair.
//! Every raw pair passes through [`validate`] before it reaches the
//! aggregator. A payload that cannot be parsed at all is still a present
//! opinion: it becomes [`Opinion::malformed`], score 0.0.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Independent opinion sources, in aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[serde(rename = "tier1_news")]
    Tier1News,
    #[serde(rename = "tier2_news")]
    Tier2News,
    #[serde(rename = "tier3_news")]
    Tier3News,
    Social,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Tier1News,
        Source::Tier2News,
        Source::Tier3News,
        Source::Social,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Source::Tier1News => "tier1_news",
            Source::Tier2News => "tier2_news",
            Source::Tier3News => "tier3_news",
            Source::Social => "social",
        }
    }

    /// Short label used in breakdown lines.
    pub fn label(self) -> &'static str {
        match self {
            Source::Tier1News => "T1",
            Source::Tier2News => "T2",
            Source::Tier3News => "T3",
            Source::Social => "Soc",
        }
    }

    pub fn is_news(self) -> bool {
        !matches!(self, Source::Social)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unvalidated judge output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJudgment {
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("judgment payload could not be parsed: {detail}")]
pub struct MalformedJudgment {
    pub detail: String,
}

impl MalformedJudgment {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Parse a judge payload into a raw judgment.
///
/// The whole text is tried as a JSON object first; failing that, the span from
/// the first `{` to the last `}`. A missing `score` is 0.0 and a missing
/// `reason` is "N/A". Numeric strings are accepted as scores.
pub fn parse_judgment(payload: &str) -> Result<RawJudgment, MalformedJudgment> {
    let object = match serde_json::from_str::<serde_json::Value>(payload.trim()) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => extract_object(payload)?,
    };

    let score = match object.get("score") {
        None | Some(serde_json::Value::Null) => 0.0,
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| MalformedJudgment::new("score is not representable"))?,
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| MalformedJudgment::new(format!("score '{s}' is not a number")))?,
        Some(other) => {
            return Err(MalformedJudgment::new(format!(
                "score has unexpected type: {other}"
            )))
        }
    };

    let reason = match object.get("reason") {
        None | Some(serde_json::Value::Null) => "N/A".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(RawJudgment { score, reason })
}

fn extract_object(
    payload: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, MalformedJudgment> {
    let (start, end) = match (payload.find('{'), payload.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(MalformedJudgment::new("no JSON object in payload")),
    };
    match serde_json::from_str::<serde_json::Value>(&payload[start..=end]) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(MalformedJudgment::new("embedded JSON is not an object")),
        Err(e) => Err(MalformedJudgment::new(e.to_string())),
    }
}

/// Validator thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorPolicy {
    /// Reasons shorter than this (in characters) are penalized.
    pub weak_reason_chars: usize,
    /// Multiplier applied to weakly-justified scores.
    pub weak_reason_penalty: f64,
    /// Score substituted when the judge signals it could not decide.
    pub neutral_score: f64,
    /// Case-insensitive phrases that signal an undecided judge.
    pub confusion_markers: Vec<String>,
}

impl Default for ValidatorPolicy {
    fn default() -> Self {
        Self {
            weak_reason_chars: 50,
            weak_reason_penalty: 0.7,
            neutral_score: 0.5,
            confusion_markers: vec!["insufficient".to_string(), "not enough".to_string()],
        }
    }
}

/// Adjustments the validator made. Returned so the caller can log them.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationNote {
    Clamped { from: f64, to: f64 },
    WeakReason { chars: usize },
    Confused { marker: String },
}

impl fmt::Display for ValidationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationNote::Clamped { from, to } => write!(f, "score {from} clamped to {to}"),
            ValidationNote::WeakReason { chars } => write!(f, "weak reasoning ({chars} chars)"),
            ValidationNote::Confused { marker } => {
                write!(f, "judge reported '{marker}', score set to neutral")
            }
        }
    }
}

/// A validated opinion from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub source: Source,
    pub score: f64,
    pub reason: String,
}

impl Opinion {
    pub const MALFORMED_REASON: &'static str = "judgment payload could not be parsed";

    /// Present, zero-confidence opinion for an unparseable payload.
    /// It does not pass through the validator.
    pub fn malformed(source: Source) -> Self {
        Self {
            source,
            score: 0.0,
            reason: Self::MALFORMED_REASON.to_string(),
        }
    }
}

/// Validator output: the sanitized opinion plus what was changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub opinion: Opinion,
    pub notes: Vec<ValidationNote>,
}

/// Sanitize one raw judgment. Never fails.
///
/// 1. clamp into [0, 1] (NaN counts as 0)
/// 2. short reason → score × penalty
/// 3. confusion marker in reason → neutral score
pub fn validate(source: Source, raw: RawJudgment, policy: &ValidatorPolicy) -> Validated {
    let mut notes = Vec::new();

    let mut score = if raw.score.is_nan() {
        0.0
    } else {
        raw.score.clamp(0.0, 1.0)
    };
    if score != raw.score {
        notes.push(ValidationNote::Clamped {
            from: raw.score,
            to: score,
        });
    }

    let chars = raw.reason.chars().count();
    if chars < policy.weak_reason_chars {
        score *= policy.weak_reason_penalty;
        notes.push(ValidationNote::WeakReason { chars });
    }

    let lowered = raw.reason.to_lowercase();
    if let Some(marker) = policy
        .confusion_markers
        .iter()
        .find(|m| lowered.contains(&m.to_lowercase()))
    {
        score = policy.neutral_score;
        notes.push(ValidationNote::Confused {
            marker: marker.clone(),
        });
    }

    Validated {
        opinion: Opinion {
            source,
            score,
            reason: raw.reason,
        },
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(score: f64, reason: &str) -> RawJudgment {
        RawJudgment {
            score,
            reason: reason.to_string(),
        }
    }

    const LONG_REASON: &str =
        "Strong earnings beat, raised guidance, and analysts upgraded the stock this week.";

    #[test]
    fn short_reason_is_penalized() {
        let v = validate(Source::Tier1News, raw(0.9, "Good news."), &ValidatorPolicy::default());
        assert!((v.opinion.score - 0.63).abs() < 1e-12);
        assert_eq!(v.notes, vec![ValidationNote::WeakReason { chars: 10 }]);
    }

    #[test]
    fn long_reason_passes_unchanged() {
        let v = validate(Source::Social, raw(0.8, LONG_REASON), &ValidatorPolicy::default());
        assert_eq!(v.opinion.score, 0.8);
        assert!(v.notes.is_empty());
    }

    #[test]
    fn clamps_before_penalty() {
        let v = validate(Source::Tier2News, raw(1.7, "ok"), &ValidatorPolicy::default());
        assert!((v.opinion.score - 0.7).abs() < 1e-12);
        assert_eq!(v.notes[0], ValidationNote::Clamped { from: 1.7, to: 1.0 });
    }

    #[test]
    fn nan_score_is_zero() {
        let v = validate(Source::Tier3News, raw(f64::NAN, LONG_REASON), &ValidatorPolicy::default());
        assert_eq!(v.opinion.score, 0.0);
    }

    #[test]
    fn confusion_overrides_everything() {
        let v = validate(
            Source::Tier1News,
            raw(0.95, "NOT ENOUGH data"),
            &ValidatorPolicy::default(),
        );
        assert_eq!(v.opinion.score, 0.5);
        assert!(matches!(
            v.notes.last(),
            Some(ValidationNote::Confused { marker }) if marker == "not enough"
        ));
    }

    #[test]
    fn reason_length_counts_characters() {
        // 50 multi-byte characters is not a weak reason
        let reason: String = "é".repeat(50);
        let v = validate(Source::Social, raw(0.6, &reason), &ValidatorPolicy::default());
        assert_eq!(v.opinion.score, 0.6);
    }

    #[test]
    fn parse_plain_json() {
        let j = parse_judgment(r#"{"score": 0.85, "reason": "Analysis"}"#).unwrap();
        assert_eq!(j, raw(0.85, "Analysis"));
    }

    #[test]
    fn parse_embedded_json() {
        let payload = "Here is my answer:\n{\"score\": 0.4, \"reason\": \"Mixed\"}\nThanks";
        assert_eq!(parse_judgment(payload).unwrap(), raw(0.4, "Mixed"));
    }

    #[test]
    fn parse_defaults_and_numeric_strings() {
        assert_eq!(parse_judgment("{}").unwrap(), raw(0.0, "N/A"));
        assert_eq!(
            parse_judgment(r#"{"score": "0.7"}"#).unwrap(),
            raw(0.7, "N/A")
        );
    }

    #[test]
    fn parse_failures() {
        assert!(parse_judgment("no json here").is_err());
        assert!(parse_judgment("} backwards {").is_err());
        assert!(parse_judgment("{\"score\": }").is_err());
        assert!(parse_judgment(r#"{"score": "high"}"#).is_err());
        assert!(parse_judgment("[0.5]").is_err());
    }

    #[test]
    fn malformed_opinion_is_present_with_zero_score() {
        let o = Opinion::malformed(Source::Social);
        assert_eq!(o.score, 0.0);
        assert_eq!(o.reason, "judgment payload could not be parsed");
    }

    #[test]
    fn source_ids() {
        assert_eq!(serde_json::to_string(&Source::Tier1News).unwrap(), "\"tier1_news\"");
        assert_eq!(Source::Social.to_string(), "social");
        assert!(Source::Tier3News.is_news());
        assert!(!Source::Social.is_news());
    }
}
