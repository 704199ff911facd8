// Toxicity/engagement co-moment.
//
// The observed system labels this value a "correlation coefficient", but it
// is the raw mean of the pairwise products — not mean-centered and not
// divided by the standard deviations. It is unbounded and not comparable
// across channels with different toxicity or like scales. The formula is
// reproduced as observed rather than silently replaced with a Pearson
// coefficient.

use crate::store::models::AnnotatedComment;

/// Mean of `toxicity_score * like_count` over the score-bearing comments.
///
/// Callers pass the deduplicated set. Returns 0.0 when no comment carries
/// a score.
pub fn engagement_co_moment(comments: &[AnnotatedComment]) -> f64 {
    let mut sum = 0.0;
    let mut n: u64 = 0;
    for comment in comments {
        if let Some(score) = comment.toxicity_score {
            sum += score * comment.like_count as f64;
            n += 1;
        }
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
