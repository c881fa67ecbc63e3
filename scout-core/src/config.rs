//! Engine configuration: weights, thresholds, validator policy.
//!
//! Every field defaults to the built-in policy, so an empty TOML document is a
//! valid configuration. [`EngineConfig::validate`] must pass before any ticker
//! is processed; a failure aborts the run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::confidence::{ReducedBlend, SourceWeights};
use crate::evidence::ValidatorPolicy;
use crate::indicators::{MIN_HISTORY, TREND_SMA_PERIOD};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Confidence must be strictly above this to approve.
    pub approval_threshold: f64,
    /// Maximum entries per category bucket.
    pub bucket_capacity: usize,
    /// Minimum bars before a ticker is evaluated.
    pub min_history: usize,
    /// Realized weight sums further than this from 1.0 are renormalized.
    pub renormalize_tolerance: f64,
    pub weights: SourceWeights,
    pub reduced: ReducedBlend,
    pub validator: ValidatorPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            approval_threshold: 0.50,
            bucket_capacity: 10,
            min_history: MIN_HISTORY,
            renormalize_tolerance: 0.01,
            weights: SourceWeights::default(),
            reduced: ReducedBlend::default(),
            validator: ValidatorPolicy::default(),
        }
    }
}

impl EngineConfig {
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
        for (name, weight) in self.weights.entries() {
            check_unit(&format!("weights.{name}"), weight)?;
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "source weights sum to {sum}, expected 1.0"
            )));
        }

        check_unit("reduced.technical", self.reduced.technical)?;
        check_unit("reduced.news", self.reduced.news)?;
        let reduced_sum = self.reduced.technical + self.reduced.news;
        if (reduced_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "reduced blend sums to {reduced_sum}, expected 1.0"
            )));
        }

        check_unit("approval_threshold", self.approval_threshold)?;
        if !self.renormalize_tolerance.is_finite() || self.renormalize_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "renormalize_tolerance must be a non-negative number, got {}",
                self.renormalize_tolerance
            )));
        }
        if self.bucket_capacity == 0 {
            return Err(ConfigError::Invalid("bucket_capacity must be at least 1".into()));
        }
        if self.min_history < TREND_SMA_PERIOD {
            return Err(ConfigError::Invalid(format!(
                "min_history {} is shorter than the {TREND_SMA_PERIOD}-bar trend SMA",
                self.min_history
            )));
        }

        check_unit("validator.weak_reason_penalty", self.validator.weak_reason_penalty)?;
        check_unit("validator.neutral_score", self.validator.neutral_score)?;
        if self.validator.confusion_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "validator.confusion_markers must not contain empty phrases".into(),
            ));
        }

        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}
