// Data models — Rust structs that map to store rows.
//
// These are the types that flow through the application. They're separate
// from the store queries so the engine can use them without depending on
// rusqlite directly.
//
// CommentRow keeps the loose shapes the ingested data actually has (float
// like counts, missing authors, missing scores); AnnotatedComment is the
// canonical shape every engine component consumes. Normalization happens
// exactly once, at the scan boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A channel whose comments have been ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
}

/// A video belonging to a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub view_count: i64,
    pub comment_count: i64,
    /// RFC 3339, as the platform API reported it. Not used for ordering.
    pub published_at: Option<String>,
}

/// A raw comment row exactly as the store returns it.
///
/// The ingestion pipeline stored whatever the platform API gave it:
/// `like_count` arrived as a float, author id and display name are both
/// nullable, and rows ingested before scoring ran have no toxicity score.
#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: String,
    pub video_id: String,
    pub text: Option<String>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub like_count: Option<f64>,
    pub published_at: Option<String>,
    pub toxicity_score: Option<f64>,
}

/// The canonical comment shape the engine consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedComment {
    pub id: String,
    pub video_id: String,
    /// Raw comment body; never mutated by the engine.
    pub text: String,
    /// Stable author identity: author id, falling back to display name,
    /// falling back to a per-record synthetic placeholder.
    pub author_key: String,
    pub like_count: i64,
    pub timestamp: DateTime<Utc>,
    /// Externally computed score in [0,1]. Absence excludes the comment
    /// from every statistic — it is never zero-filled.
    pub toxicity_score: Option<f64>,
}

impl AnnotatedComment {
    /// Normalize a raw row into the canonical shape.
    ///
    /// Per-record shape anomalies recover locally: missing text becomes an
    /// empty string, a fully anonymous author gets a synthetic key derived
    /// from the comment id, unparseable timestamps fall back to the Unix
    /// epoch. A missing toxicity score is preserved as `None` — downstream
    /// exclusion is the aggregator's contract, not a normalization concern.
    pub fn from_row(row: CommentRow) -> Self {
        let author_key = match (row.author_id, row.author_name) {
            (Some(id), _) if !id.is_empty() => id,
            (_, Some(name)) if !name.is_empty() => name,
            _ => format!("anonymous#{}", row.id),
        };

        let timestamp = row
            .published_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            author_key,
            text: row.text.unwrap_or_default(),
            like_count: row.like_count.map(|l| l.max(0.0) as i64).unwrap_or(0),
            timestamp,
            toxicity_score: row.toxicity_score,
            id: row.id,
            video_id: row.video_id,
        }
    }
}

// --- Import dump shapes ---
//
// `vitriol import` loads a JSON dump produced by the (external) ingestion
// pipeline. Field names and the loose numeric/nullable shapes mirror what
// that pipeline stores.

/// A full channel dump: the channel, its videos, and all their comments.
#[derive(Debug, Deserialize)]
pub struct ChannelDump {
    pub channel: ChannelRecord,
    #[serde(default)]
    pub videos: Vec<VideoImport>,
    #[serde(default)]
    pub comments: Vec<CommentImport>,
}

#[derive(Debug, Deserialize)]
pub struct VideoImport {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default, alias = "timestamp")]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentImport {
    pub id: String,
    pub video_id: String,
    pub text: Option<String>,
    #[serde(default, alias = "user_id")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    /// The ingestion pipeline stored this as a float.
    #[serde(default)]
    pub like_count: Option<f64>,
    #[serde(default, alias = "timestamp")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub toxicity_score: Option<f64>,
}

/// Scope selector for comment page queries.
///
/// Video scope wins when both are set — a video id is already the narrower
/// selection.
#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
}

impl CommentFilter {
    pub fn for_video(video_id: &str) -> Self {
        Self {
            video_id: Some(video_id.to_string()),
            channel_id: None,
        }
    }

    pub fn for_channel(channel_id: &str) -> Self {
        Self {
            channel_id: Some(channel_id.to_string()),
            video_id: None,
        }
    }
}

/// Row counts from a completed import.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportStats {
    pub videos: u64,
    pub comments: u64,
}

/// Store-wide counts for the status display.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    pub channels: u64,
    pub videos: u64,
    pub comments: u64,
    pub scored_comments: u64,
}
