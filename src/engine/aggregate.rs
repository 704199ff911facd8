// Grouped aggregation — fold comments into per-key running statistics.
//
// One fold pass builds a GroupStat per grouping key (video id, author key,
// or a constant key for whole-channel stats); a finalize pass computes the
// averages. The same deduplicated slice can be folded several times with
// different key functions without touching the store again.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::store::models::AnnotatedComment;

/// Running statistics for one grouping key.
///
/// Created lazily on the first contributing comment, so a GroupStat with
/// `count == 0` cannot exist. `average_toxicity` is only meaningful after
/// the finalize pass inside [`aggregate`] — the fold never reads it.
#[derive(Debug, Clone)]
pub struct GroupStat {
    pub key: String,
    pub count: u64,
    pub toxicity_sum: f64,
    pub average_toxicity: f64,
    pub max_toxicity: f64,
    pub min_toxicity: f64,
    pub like_sum: i64,
    pub earliest_timestamp: DateTime<Utc>,
    /// The comment achieving `max_toxicity` within the group.
    pub most_toxic_comment: Option<AnnotatedComment>,
}

impl GroupStat {
    fn seeded(key: String, comment: &AnnotatedComment, score: f64) -> Self {
        Self {
            key,
            count: 1,
            toxicity_sum: score,
            average_toxicity: 0.0,
            max_toxicity: score,
            min_toxicity: score,
            like_sum: comment.like_count,
            earliest_timestamp: comment.timestamp,
            most_toxic_comment: Some(comment.clone()),
        }
    }

    fn fold(&mut self, comment: &AnnotatedComment, score: f64) {
        self.count += 1;
        self.toxicity_sum += score;
        self.like_sum += comment.like_count;
        // Strictly-greater comparison keeps the first comment on ties.
        if score > self.max_toxicity {
            self.max_toxicity = score;
            self.most_toxic_comment = Some(comment.clone());
        }
        if score < self.min_toxicity {
            self.min_toxicity = score;
        }
        // Strictly-earlier comparison keeps the first comment on ties.
        if comment.timestamp < self.earliest_timestamp {
            self.earliest_timestamp = comment.timestamp;
        }
    }
}

/// Fold comments into per-key statistics.
///
/// Comments without a toxicity score are skipped entirely — they contribute
/// to no field of any group (absence is a hard exclusion, never imputed).
/// The returned Vec is in first-seen key order, which downstream ranking
/// relies on for deterministic tie-breaks.
pub fn aggregate<F>(comments: &[AnnotatedComment], key_of: F) -> Vec<GroupStat>
where
    F: Fn(&AnnotatedComment) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats: Vec<GroupStat> = Vec::new();

    for comment in comments {
        let Some(score) = comment.toxicity_score else {
            continue;
        };
        let key = key_of(comment);
        match index.get(&key) {
            Some(&slot) => stats[slot].fold(comment, score),
            None => {
                index.insert(key.clone(), stats.len());
                stats.push(GroupStat::seeded(key, comment, score));
            }
        }
    }

    // Finalize: every group has count >= 1 by construction.
    for stat in &mut stats {
        stat.average_toxicity = stat.toxicity_sum / stat.count as f64;
    }

    stats
}
