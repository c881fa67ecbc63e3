//! Evidence loaded from a JSON document, one entry per symbol:
//!
//! ```json
//! { "AAPL": { "news": [{"publisher": "Reuters", "title": "...", "published_at": "2024-06-10T12:00:00Z"}],
//!             "social": [{"title": "...", "score": 42, "community": "stocks"}],
//!             "combined_news": "..." } }
//! ```
//!
//! A symbol absent from the document simply has no evidence.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::provider::{DataError, NewsItem, NewsProvider, SocialPost, SocialProvider};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TickerEvidence {
    pub news: Vec<NewsItem>,
    pub social: Vec<SocialPost>,
    pub combined_news: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EvidenceFile {
    tickers: HashMap<String, TickerEvidence>,
}

impl EvidenceFile {
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path).map_err(|e| DataError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DataError> {
        let tickers: HashMap<String, TickerEvidence> =
            serde_json::from_str(content).map_err(|e| DataError::Malformed {
                symbol: "*".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { tickers })
    }

    pub fn get(&self, symbol: &str) -> Option<&TickerEvidence> {
        self.tickers.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl NewsProvider for EvidenceFile {
    fn headlines(&self, symbol: &str) -> Result<Vec<NewsItem>, DataError> {
        Ok(self.get(symbol).map(|t| t.news.clone()).unwrap_or_default())
    }

    fn combined_news(&self, symbol: &str) -> Option<String> {
        self.get(symbol).and_then(|t| t.combined_news.clone())
    }
}

impl SocialProvider for EvidenceFile {
    fn posts(&self, symbol: &str) -> Result<Vec<SocialPost>, DataError> {
        Ok(self.get(symbol).map(|t| t.social.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "AMD": {
            "news": [{"publisher": "Reuters", "title": "AMD wins contract", "published_at": "2024-06-10T09:00:00Z"}],
            "social": [{"title": "AMD to the moon", "score": 120, "community": "wallstreetbets"}]
        },
        "F": { "combined_news": "- Ford recalls trucks" }
    }"#;

    #[test]
    fn parses_entries() {
        let file = EvidenceFile::from_json(DOC).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.headlines("AMD").unwrap()[0].publisher, "Reuters");
        assert_eq!(file.posts("AMD").unwrap()[0].score, 120);
        assert_eq!(file.combined_news("AMD"), None);
        assert_eq!(file.combined_news("F").as_deref(), Some("- Ford recalls trucks"));
        assert!(file.headlines("F").unwrap().is_empty());
    }

    #[test]
    fn unknown_symbol_has_no_evidence() {
        let file = EvidenceFile::from_json(DOC).unwrap();
        assert!(file.headlines("ZZZ").unwrap().is_empty());
        assert!(file.posts("ZZZ").unwrap().is_empty());
    }

    #[test]
    fn malformed_document() {
        assert!(matches!(
            EvidenceFile::from_json("[1, 2]"),
            Err(DataError::Malformed { .. })
        ));
    }
}
