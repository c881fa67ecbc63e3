//! Runner configuration: engine policy plus collaborator settings.
//!
//! Loaded from TOML. Every section is optional and falls back to the built-in
//! defaults. Validation happens once, before any ticker is touched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use scout_core::{ConfigError, EngineConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub engine: EngineConfig,
    pub news: NewsConfig,
    pub social: SocialConfig,
    pub judge: JudgeConfig,
    pub scan: ScanConfig,
}

/// Publisher tiering and recency for news evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Items older than this are ignored.
    pub recency_hours: i64,
    /// Headlines kept per tier.
    pub items_per_tier: usize,
    /// Substrings of publisher names, matched case-sensitively.
    pub tier1_publishers: Vec<String>,
    pub tier2_publishers: Vec<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            recency_hours: 168,
            items_per_tier: 3,
            tier1_publishers: ["Bloomberg", "Reuters", "WSJ", "CNBC", "Financial Times"]
                .map(String::from)
                .to_vec(),
            tier2_publishers: [
                "MarketWatch",
                "Barron's",
                "Investor's Business Daily",
                "The Motley Fool",
                "Yahoo Finance",
                "Forbes",
                "Fortune",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Longest accepted news window: ten years.
pub const MAX_RECENCY_HOURS: i64 = 24 * 365 * 10;

impl NewsConfig {
    /// The recency window, `None` when `recency_hours` is outside
    /// `1..=MAX_RECENCY_HOURS`.
    pub fn recency_window(&self) -> Option<Duration> {
        if (1..=MAX_RECENCY_HOURS).contains(&self.recency_hours) {
            Duration::try_hours(self.recency_hours)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Minimum spacing between social lookups.
    pub min_interval_ms: u64,
    /// Posts scoring below this are noise.
    pub min_post_score: i64,
    pub top_posts: usize,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1000,
            min_post_score: 5,
            top_posts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Evaluate tickers on the rayon pool.
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ScoutConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        if self.news.recency_window().is_none() {
            return Err(ConfigError::Invalid(format!(
                "news.recency_hours must be between 1 and {MAX_RECENCY_HOURS}, got {}",
                self.news.recency_hours
            )));
        }
        if self.news.items_per_tier == 0 {
            return Err(invalid("news.items_per_tier must be at least 1"));
        }
        if self.social.top_posts == 0 {
            return Err(invalid("social.top_posts must be at least 1"));
        }
        if self.judge.url.trim().is_empty() {
            return Err(invalid("judge.url must not be empty"));
        }
        if self.judge.model.trim().is_empty() {
            return Err(invalid("judge.model must not be empty"));
        }
        if self.judge.timeout_secs == 0 {
            return Err(invalid("judge.timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Deterministic identifier for a run: blake3 over the engine policy and
    /// the run timestamp.
    pub fn run_id(&self, at: DateTime<Utc>) -> String {
        let mut hasher = blake3::Hasher::new();
        // EngineConfig is plain data; serialization cannot fail.
        let policy = serde_json::to_vec(&self.engine).unwrap_or_default();
        hasher.update(&policy);
        hasher.update(at.to_rfc3339().as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_validate() {
        ScoutConfig::default().validate().unwrap();
    }

    #[test]
    fn full_document() {
        let config = ScoutConfig::from_toml(
            r#"
[engine]
approval_threshold = 0.55

[engine.weights]
technical = 0.40
tier1_news = 0.20
tier2_news = 0.20
tier3_news = 0.10
social = 0.10

[news]
items_per_tier = 5

[social]
min_interval_ms = 0

[judge]
model = "mistral"

[scan]
parallel = false
"#,
        )
        .unwrap();
        assert_eq!(config.engine.approval_threshold, 0.55);
        assert_eq!(config.engine.weights.technical, 0.40);
        assert_eq!(config.news.items_per_tier, 5);
        assert_eq!(config.news.recency_hours, 168);
        assert_eq!(config.social.min_interval_ms, 0);
        assert_eq!(config.judge.model, "mistral");
        assert_eq!(config.judge.timeout_secs, 30);
        assert!(!config.scan.parallel);
    }

    #[test]
    fn engine_errors_surface() {
        let err = ScoutConfig::from_toml("[engine.weights]\nsocial = 0.9\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_recency() {
        for hours in ["0", "-5", "87601", "9223372036854775807"] {
            let err = ScoutConfig::from_toml(&format!("[news]\nrecency_hours = {hours}\n"))
                .unwrap_err();
            assert!(err.to_string().contains("news.recency_hours"), "{hours}: {err}");
        }
        let config = ScoutConfig::from_toml("[news]\nrecency_hours = 87600\n").unwrap();
        assert_eq!(config.news.recency_window(), Some(Duration::hours(MAX_RECENCY_HOURS)));
    }

    #[test]
    fn rejects_empty_judge_url() {
        let err = ScoutConfig::from_toml("[judge]\nurl = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("judge.url"));
    }

    #[test]
    fn run_id_depends_on_time_and_policy() {
        let config = ScoutConfig::default();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(config.run_id(t1), config.run_id(t1));
        assert_ne!(config.run_id(t1), config.run_id(t2));

        let mut other = ScoutConfig::default();
        other.engine.approval_threshold = 0.6;
        assert_ne!(config.run_id(t1), other.run_id(t1));
        assert_eq!(config.run_id(t1).len(), 64);
    }

    #[test]
    fn toml_round_trip() {
        let config = ScoutConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(ScoutConfig::from_toml(&text).unwrap(), config);
    }
}
