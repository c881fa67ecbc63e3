//! Per-category buckets.
//!
//! Every category is always present (possibly empty). Within a bucket entries
//! are sorted descending by their rank score with a stable sort, so ties keep
//! input order, then truncated to the bucket capacity.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;

use crate::confidence::ConfidenceResult;
use crate::domain::Category;

/// Something that can be placed into a category bucket.
pub trait Ranked {
    fn category(&self) -> Category;

    /// Higher ranks first.
    fn rank_score(&self) -> f64;
}

impl Ranked for ConfidenceResult {
    fn category(&self) -> Category {
        self.category
    }

    fn rank_score(&self) -> f64 {
        self.final_confidence
    }
}

/// One ordered, capped list per category.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets<T> {
    lists: [Vec<T>; 5],
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            lists: Default::default(),
        }
    }
}

impl<T: Ranked> Buckets<T> {
    /// Group, sort, and cap.
    pub fn assemble(items: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut buckets = Self::default();
        for item in items {
            buckets.lists[item.category().index()].push(item);
        }
        for list in buckets.lists.iter_mut() {
            list.sort_by(|a, b| {
                b.rank_score()
                    .partial_cmp(&a.rank_score())
                    .unwrap_or(Ordering::Equal)
            });
            list.truncate(capacity);
        }
        buckets
    }
}

impl Buckets<ConfidenceResult> {
    /// Only approved results enter the final buckets.
    pub fn from_approved(
        results: impl IntoIterator<Item = ConfidenceResult>,
        capacity: usize,
    ) -> Self {
        Self::assemble(results.into_iter().filter(|r| r.approved), capacity)
    }
}

impl<T> Buckets<T> {
    pub fn get(&self, category: Category) -> &[T] {
        &self.lists[category.index()]
    }

    /// `(category, entries)` in category declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[T])> {
        Category::ALL
            .into_iter()
            .map(move |c| (c, self.lists[c.index()].as_slice()))
    }

    pub fn total(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Buckets<U> {
        let [a, b, c, d, e] = self.lists;
        let mut convert = |v: Vec<T>| v.into_iter().map(&mut f).collect::<Vec<U>>();
        Buckets {
            lists: [convert(a), convert(b), convert(c), convert(d), convert(e)],
        }
    }
}

/// Serialized as a map keyed by bucket key (`trend_targets`, ...).
impl<T: Serialize> Serialize for Buckets<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (category, entries) in self.iter() {
            map.serialize_entry(category.bucket_key(), entries)?;
        }
        map.end()
    }
}
