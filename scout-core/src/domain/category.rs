//! Strategy categories.
//!
//! The set is closed: every table keyed by category (normalization ceilings,
//! bucket keys, judgment personas) is an exhaustive `match`, so adding a
//! category is a compile-time-checked change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The strategy bucket a ticker is assigned to.
///
/// Declaration order is the output order of buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Trend,
    Survivor,
    Wheel,
    Condor,
    Short,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Trend,
        Category::Survivor,
        Category::Wheel,
        Category::Condor,
        Category::Short,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Trend => "trend",
            Category::Survivor => "survivor",
            Category::Wheel => "wheel",
            Category::Condor => "condor",
            Category::Short => "short",
        }
    }

    /// Key used for this category in snapshot files (e.g. `trend_targets`).
    pub fn bucket_key(self) -> &'static str {
        match self {
            Category::Trend => "trend_targets",
            Category::Survivor => "survivor_targets",
            Category::Wheel => "wheel_targets",
            Category::Condor => "condor_targets",
            Category::Short => "short_targets",
        }
    }

    /// Inverse of [`Category::bucket_key`].
    pub fn from_bucket_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.bucket_key() == key)
    }

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts either the bare name (`wheel`) or the bucket key (`wheel_targets`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == lower || c.bucket_key() == lower)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_keys_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_bucket_key(c.bucket_key()), Some(c));
        }
        assert_eq!(Category::from_bucket_key("updated"), None);
    }

    #[test]
    fn parse_accepts_name_and_key() {
        assert_eq!("condor".parse::<Category>().unwrap(), Category::Condor);
        assert_eq!("Short_Targets".parse::<Category>().unwrap(), Category::Short);
        assert!("momentum".parse::<Category>().is_err());
    }

    #[test]
    fn index_matches_all_order() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Category::Survivor).unwrap(), "\"survivor\"");
    }
}
