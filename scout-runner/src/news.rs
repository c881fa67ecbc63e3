//! Evidence assembly: tiered headlines and ranked social posts.
//!
//! Turns raw collaborator output into the text handed to the judge, one block
//! per source. A source with nothing usable yields `None` and is treated as
//! unavailable downstream.

use chrono::{DateTime, Duration, Utc};

use scout_core::Source;

use crate::config::{NewsConfig, SocialConfig};
use crate::provider::{NewsItem, SocialPost};

/// Tier a publisher falls into: tier 1 or tier 2 by substring match, tier 3
/// for everyone else.
pub fn tier_of(publisher: &str, config: &NewsConfig) -> Source {
    if config.tier1_publishers.iter().any(|p| publisher.contains(p.as_str())) {
        Source::Tier1News
    } else if config.tier2_publishers.iter().any(|p| publisher.contains(p.as_str())) {
        Source::Tier2News
    } else {
        Source::Tier3News
    }
}

/// Evidence text per news tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TieredNews {
    pub tier1: Option<String>,
    pub tier2: Option<String>,
    pub tier3: Option<String>,
}

impl TieredNews {
    pub fn get(&self, source: Source) -> Option<&str> {
        match source {
            Source::Tier1News => self.tier1.as_deref(),
            Source::Tier2News => self.tier2.as_deref(),
            Source::Tier3News => self.tier3.as_deref(),
            Source::Social => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tier1.is_none() && self.tier2.is_none() && self.tier3.is_none()
    }
}

/// Bucket recent headlines by tier and format each tier's first items as
/// `- [publisher] title` lines. Provider order is kept within a tier.
pub fn tiered_news(items: &[NewsItem], now: DateTime<Utc>, config: &NewsConfig) -> TieredNews {
    let cutoff = recency_cutoff(now, config);
    let mut lines: [Vec<String>; 3] = Default::default();

    for item in items.iter().filter(|i| i.published_at >= cutoff) {
        let slot = &mut lines[tier_of(&item.publisher, config).index()];
        if slot.len() < config.items_per_tier {
            slot.push(format!("- [{}] {}", item.publisher, item.title));
        }
    }

    let [t1, t2, t3] = lines;
    TieredNews {
        tier1: join_nonempty(t1),
        tier2: join_nonempty(t2),
        tier3: join_nonempty(t3),
    }
}

/// Oldest publication time still considered recent. A window that does not
/// fit the calendar keeps every item instead of panicking; validated configs
/// never produce one.
fn recency_cutoff(now: DateTime<Utc>, config: &NewsConfig) -> DateTime<Utc> {
    config
        .recency_window()
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Drop low-engagement posts, rank by score, and format the top ones as
/// `- [r/community] title (N pts)` lines.
pub fn social_evidence(posts: &[SocialPost], config: &SocialConfig) -> Option<String> {
    let mut kept: Vec<&SocialPost> = posts
        .iter()
        .filter(|p| p.score >= config.min_post_score)
        .collect();
    kept.sort_by(|a, b| b.score.cmp(&a.score));
    join_nonempty(
        kept.into_iter()
            .take(config.top_posts)
            .map(|p| format!("- [r/{}] {} ({} pts)", p.community, p.title, p.score))
            .collect(),
    )
}

fn join_nonempty(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn item(publisher: &str, title: &str, hours_ago: i64) -> NewsItem {
        NewsItem {
            publisher: publisher.to_string(),
            title: title.to_string(),
            published_at: now() - Duration::hours(hours_ago),
        }
    }

    fn post(title: &str, score: i64) -> SocialPost {
        SocialPost {
            title: title.to_string(),
            score,
            community: "stocks".to_string(),
        }
    }

    #[test]
    fn publishers_are_tiered_by_substring() {
        let config = NewsConfig::default();
        assert_eq!(tier_of("Reuters", &config), Source::Tier1News);
        assert_eq!(tier_of("Bloomberg Markets", &config), Source::Tier1News);
        assert_eq!(tier_of("Barron's", &config), Source::Tier2News);
        assert_eq!(tier_of("Seeking Alpha", &config), Source::Tier3News);
        assert_eq!(tier_of("reuters", &config), Source::Tier3News);
    }

    #[test]
    fn tiers_format_and_cap() {
        let items = vec![
            item("Reuters", "A", 1),
            item("Bloomberg", "B", 2),
            item("CNBC", "C", 3),
            item("WSJ", "D", 4),
            item("Forbes", "E", 5),
        ];
        let news = tiered_news(&items, now(), &NewsConfig::default());
        assert_eq!(
            news.tier1.as_deref(),
            Some("- [Reuters] A\n- [Bloomberg] B\n- [CNBC] C")
        );
        assert_eq!(news.tier2.as_deref(), Some("- [Forbes] E"));
        assert_eq!(news.tier3, None);
        assert_eq!(news.get(Source::Tier2News), Some("- [Forbes] E"));
    }

    #[test]
    fn stale_items_are_dropped() {
        let items = vec![item("Reuters", "old", 169), item("Reuters", "edge", 168)];
        let news = tiered_news(&items, now(), &NewsConfig::default());
        assert_eq!(news.tier1.as_deref(), Some("- [Reuters] edge"));
    }

    #[test]
    fn no_news_is_empty() {
        assert!(tiered_news(&[], now(), &NewsConfig::default()).is_empty());
    }

    #[test]
    fn unrepresentable_window_keeps_items_without_panicking() {
        let config = NewsConfig {
            recency_hours: i64::MAX,
            ..NewsConfig::default()
        };
        let items = vec![item("Reuters", "old", 24 * 365 * 30)];
        let news = tiered_news(&items, now(), &config);
        assert_eq!(news.tier1.as_deref(), Some("- [Reuters] old"));
    }

    #[test]
    fn social_filters_sorts_and_caps() {
        let posts = vec![
            post("meh", 4),
            post("ok", 12),
            post("hot", 250),
            post("fine", 5),
            post("warm", 40),
        ];
        assert_eq!(
            social_evidence(&posts, &SocialConfig::default()).as_deref(),
            Some("- [r/stocks] hot (250 pts)\n- [r/stocks] warm (40 pts)\n- [r/stocks] ok (12 pts)")
        );
    }

    #[test]
    fn low_score_posts_only_is_unavailable() {
        assert_eq!(social_evidence(&[post("spam", 1)], &SocialConfig::default()), None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        const PUBLISHERS: [&str; 5] = ["Reuters", "Forbes", "Tiny Blog", "CNBC", "Yahoo Finance"];

        proptest! {
            #[test]
            fn tiers_never_exceed_cap(
                picks in prop::collection::vec((0usize..5, 0i64..400), 0..40),
                cap in 1usize..6,
            ) {
                let items: Vec<NewsItem> = picks
                    .iter()
                    .map(|&(p, age)| item(PUBLISHERS[p], "headline", age))
                    .collect();
                let config = NewsConfig { items_per_tier: cap, ..NewsConfig::default() };
                let news = tiered_news(&items, now(), &config);
                for tier in [&news.tier1, &news.tier2, &news.tier3] {
                    if let Some(text) = tier {
                        prop_assert!(text.lines().count() <= cap);
                    }
                }
            }

            #[test]
            fn social_is_ranked_and_capped(scores in prop::collection::vec(-10i64..500, 0..30)) {
                let posts: Vec<SocialPost> = scores.iter().map(|&s| post("p", s)).collect();
                let config = SocialConfig::default();
                match social_evidence(&posts, &config) {
                    None => prop_assert!(scores.iter().all(|&s| s < config.min_post_score)),
                    Some(text) => {
                        let kept: Vec<i64> = text
                            .lines()
                            .map(|l| {
                                let pts = l.rsplit('(').next().unwrap_or_default();
                                pts.trim_end_matches(" pts)").parse().unwrap()
                            })
                            .collect();
                        prop_assert!(kept.len() <= config.top_posts);
                        prop_assert!(kept.windows(2).all(|w| w[0] >= w[1]));
                        prop_assert!(kept.iter().all(|&s| s >= config.min_post_score));
                    }
                }
            }
        }
    }
}
