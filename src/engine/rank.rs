// Ranking — Top-K orderings over finished group statistics.
//
// "Top-K" and "all" are the same call with a different limit; there is no
// separate code path, so the two presentations can never drift apart.

use crate::engine::aggregate::GroupStat;

/// The comparator criteria a ranking can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Activity: number of (deduplicated, scored) comments.
    CommentCount,
    /// Toxicity: average toxicity across the group.
    AverageToxicity,
    /// Popularity: total likes across the group.
    LikeSum,
}

/// An ordered ranking produced by one comparator.
#[derive(Debug, Clone)]
pub struct RankedView {
    /// Entries in descending comparator order, truncated to the limit.
    pub entries: Vec<GroupStat>,
    /// The minimum-support threshold that was applied.
    pub min_support: u64,
    /// How many groups passed the filter, before truncation.
    pub total_qualifying: usize,
}

/// Filter by minimum support, sort descending, truncate.
///
/// `limit: None` is "all" mode. The sort is stable and the input slice is
/// in the aggregator's first-seen key order, so ties keep key insertion
/// order — repeated calls on identical input produce identical orderings.
pub fn rank(
    stats: &[GroupStat],
    by: RankBy,
    min_support: u64,
    limit: Option<usize>,
) -> RankedView {
    let mut qualifying: Vec<GroupStat> = stats
        .iter()
        .filter(|stat| stat.count >= min_support)
        .cloned()
        .collect();

    qualifying.sort_by(|a, b| match by {
        RankBy::CommentCount => b.count.cmp(&a.count),
        RankBy::AverageToxicity => b.average_toxicity.total_cmp(&a.average_toxicity),
        RankBy::LikeSum => b.like_sum.cmp(&a.like_sum),
    });

    let total_qualifying = qualifying.len();
    if let Some(limit) = limit {
        qualifying.truncate(limit);
    }

    RankedView {
        entries: qualifying,
        min_support,
        total_qualifying,
    }
}
