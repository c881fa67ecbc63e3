//! Judgment prompts and the HTTP judge adapter.
//!
//! Each request is framed by a persona derived from the category (what a
//! high score means differs between a short seller and an income trader) and
//! a context derived from the evidence kind.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use scout_core::Category;

use crate::config::JudgeConfig;
use crate::provider::{JudgeError, JudgmentProvider, JudgmentRequest};

/// How the judge should read evidence for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub role: &'static str,
    pub goal: &'static str,
    pub scoring: &'static str,
}

pub fn persona(category: Category) -> Persona {
    match category {
        Category::Short => Persona {
            role: "short seller",
            goal: "identifying weakness, bad earnings, or regulatory trouble",
            scoring: "High score (1.0) means CRASH LIKELY. Low score (0.0) means STRONG/SAFE.",
        },
        Category::Survivor => Persona {
            role: "value investor",
            goal: "identifying if a recent price drop is an overreaction",
            scoring: "High score (1.0) means SAFE TO BUY. Low score (0.0) means FALLING KNIFE.",
        },
        Category::Condor | Category::Wheel => Persona {
            role: "options income trader",
            goal: "identifying STABILITY and LACK of volatility",
            scoring: "High score (1.0) means BORING/STABLE. Low score (0.0) means VOLATILE/RISKY.",
        },
        Category::Trend => Persona {
            role: "growth investor",
            goal: "identifying breakouts, strong earnings, and momentum",
            scoring: "High score (1.0) means RALLY LIKELY. Low score (0.0) means WEAKNESS.",
        },
    }
}

/// Full prompt text for one request.
pub fn build_prompt(request: &JudgmentRequest) -> String {
    let p = persona(request.category);
    let (context, instruction) = if request.kind.is_social() {
        (
            "Reddit/Social Media Sentiment",
            "Analyze the retail sentiment. Look for hype, panic, or irrational exuberance.",
        )
    } else {
        ("Financial News", "Analyze the fundamental and headline risks.")
    };

    format!(
        "You are a hedge fund {role}. Analyze {symbol} based on this {context}.\n\
         Goal: {goal}\n\n\
         DATA:\n{evidence}\n\n\
         Instructions:\n\
         1. {instruction}\n\
         2. {scoring}\n\
         3. Return JSON: {{\"score\": 0.85, \"reason\": \"Analysis...\"}}",
        role = p.role,
        symbol = request.symbol,
        goal = p.goal,
        evidence = request.evidence,
        scoring = p.scoring,
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Judge backed by a local text-generation HTTP endpoint.
///
/// Posts `{model, prompt, stream: false, format: "json"}` and returns the
/// `response` field verbatim.
pub struct HttpJudge {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl HttpJudge {
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JudgeError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
        })
    }
}

impl JudgmentProvider for HttpJudge {
    fn name(&self) -> &str {
        &self.model
    }

    fn judge(&self, request: &JudgmentRequest) -> Result<String, JudgeError> {
        let prompt = build_prompt(request);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
            format: "json",
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| JudgeError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(JudgeError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| JudgeError::EmptyResponse(e.to_string()))?;
        parsed
            .response
            .ok_or_else(|| JudgeError::EmptyResponse("missing 'response' field".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EvidenceKind;
    use scout_core::Source;

    fn request(category: Category, kind: EvidenceKind) -> JudgmentRequest {
        JudgmentRequest {
            symbol: "CVNA".to_string(),
            category,
            kind,
            evidence: "- [Reuters] Carvana misses estimates".to_string(),
        }
    }

    #[test]
    fn every_category_has_a_persona() {
        for c in Category::ALL {
            let p = persona(c);
            assert!(!p.role.is_empty() && !p.goal.is_empty() && !p.scoring.is_empty());
        }
        assert_eq!(persona(Category::Wheel), persona(Category::Condor));
    }

    #[test]
    fn news_prompt() {
        let prompt = build_prompt(&request(Category::Short, EvidenceKind::Opinion(Source::Tier1News)));
        assert!(prompt.starts_with("You are a hedge fund short seller. Analyze CVNA based on this Financial News."));
        assert!(prompt.contains("DATA:\n- [Reuters] Carvana misses estimates\n"));
        assert!(prompt.contains("CRASH LIKELY"));
        assert!(prompt.ends_with(r#"3. Return JSON: {"score": 0.85, "reason": "Analysis..."}"#));
    }

    #[test]
    fn social_prompt_uses_sentiment_context() {
        let prompt = build_prompt(&request(Category::Trend, EvidenceKind::Opinion(Source::Social)));
        assert!(prompt.contains("Reddit/Social Media Sentiment"));
        assert!(prompt.contains("irrational exuberance"));
        assert!(prompt.contains("growth investor"));
    }

    #[test]
    fn combined_news_prompt_is_news() {
        let prompt = build_prompt(&request(Category::Survivor, EvidenceKind::CombinedNews));
        assert!(prompt.contains("Financial News"));
        assert!(prompt.contains("FALLING KNIFE"));
    }

    #[test]
    fn unreachable_judge_is_transport_error() {
        let config = JudgeConfig {
            url: "http://127.0.0.1:9/api/generate".to_string(),
            timeout_secs: 1,
            ..JudgeConfig::default()
        };
        let judge = HttpJudge::new(&config).unwrap();
        let err = judge
            .judge(&request(Category::Trend, EvidenceKind::CombinedNews))
            .unwrap_err();
        assert!(matches!(err, JudgeError::Transport(_)));
    }
}
