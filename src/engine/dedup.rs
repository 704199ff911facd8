// Duplicate collapse — one canonical record per real-world comment.
//
// The ingestion pipeline re-inserts rows on retry, so the same comment can
// exist under several storage ids. Two rows with the same normalized text,
// video, and author are treated as the same comment; the first one seen in
// scan order is kept.
//
// Dedup runs BEFORE the toxicity-score filter: a score-less row still
// claims its identity key, so a scored duplicate arriving later does not
// sneak back in. Which downstream grouping needs the score is not this
// module's concern.

use std::collections::HashSet;

use crate::store::models::AnnotatedComment;

/// Composite identity for a comment: normalized text + video + author.
///
/// Normalization is trim + lowercase. Like and timestamp differences
/// between rows with equal keys are ignored — duplicates come from
/// storage-layer re-insertion, not from genuinely distinct comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    text: String,
    video_id: String,
    author_key: String,
}

impl DedupKey {
    pub fn of(comment: &AnnotatedComment) -> Self {
        Self {
            text: comment.text.trim().to_lowercase(),
            video_id: comment.video_id.clone(),
            author_key: comment.author_key.clone(),
        }
    }
}

/// Collapse duplicates, preserving first-seen order.
///
/// Single pass; O(n) time, O(n) auxiliary space when every comment is
/// unique. Given the same input order the output is deterministic. A
/// re-ordered input may keep a different representative per duplicate set,
/// which is fine — only the aggregate statistics need to be stable.
pub fn dedupe(comments: Vec<AnnotatedComment>) -> Vec<AnnotatedComment> {
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(comments.len());
    comments
        .into_iter()
        .filter(|comment| seen.insert(DedupKey::of(comment)))
        .collect()
}
