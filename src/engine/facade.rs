// Analytics facade — one request-scoped composition of the engine.
//
// A ChannelAnalytics is built once per request: one concurrent scan, one
// dedup pass, then three keyed aggregation passes over the same comment
// set. Every view derives from that shared state, so the channel summary,
// video list, author rankings, and timeline can never disagree about which
// comments exist. Nothing survives the request — callers build a fresh
// instance next time.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::aggregate::{aggregate, GroupStat};
use crate::engine::correlation::engagement_co_moment;
use crate::engine::dedup;
use crate::engine::rank::{rank, RankBy, RankedView};
use crate::engine::scanner;
use crate::store::models::{AnnotatedComment, ChannelRecord, VideoRecord};
use crate::store::CommentStore;

/// Grouping key for the whole-channel aggregation pass.
const CHANNEL_KEY: &str = "channel";

/// Tunables for one analysis run.
pub struct AnalyzeOptions {
    /// Rows per page request against the store.
    pub page_size: u32,
    /// How many per-video scans run concurrently.
    pub fetch_concurrency: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            page_size: 1000,
            fetch_concurrency: 8,
        }
    }
}

// --- Output shapes ---
//
// These are the JSON shapes the presentation layer consumes. Zero
// qualifying comments produces zero-valued fields and empty lists, never
// an error — presentation code only ever checks "is this list empty".

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub video_count: u64,
    pub comment_count: u64,
    pub average_toxicity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub view_count: i64,
    pub comment_count: u64,
    pub average_toxicity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub author_key: String,
    pub comment_count: u64,
    pub average_toxicity: f64,
    pub max_toxicity: f64,
    pub total_likes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_toxic_comment_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRankings {
    pub most_active: Vec<AuthorEntry>,
    pub most_toxic: Vec<AuthorEntry>,
    pub most_liked: Vec<AuthorEntry>,
    /// Authors that met the threshold, before any Top-K truncation.
    pub total_users: u64,
    pub min_comments_threshold: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub toxicity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

/// See [`engagement_co_moment`] — the field name is the one the observed
/// system used, but the value is a raw co-moment, not a Pearson
/// coefficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEstimate {
    pub coefficient: f64,
}

/// Every view bundled into a single serializable report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelReport {
    pub channel_id: String,
    pub channel_name: String,
    pub summary: ChannelSummary,
    pub videos: Vec<VideoSummary>,
    pub authors: AuthorRankings,
    pub timeline: Vec<TimelinePoint>,
    pub correlation: CorrelationEstimate,
}

// --- The facade ---

/// Finished analytics for one channel, built by [`ChannelAnalytics::analyze`].
pub struct ChannelAnalytics {
    channel: ChannelRecord,
    videos: Vec<VideoRecord>,
    /// Deduplicated comments in scan order. Score-less comments are still
    /// present — they matter for dedup identity, not for statistics.
    comments: Vec<AnnotatedComment>,
    channel_stats: Option<GroupStat>,
    video_stats: Vec<GroupStat>,
    author_stats: Vec<GroupStat>,
}

impl ChannelAnalytics {
    /// Run the full pipeline for a channel: scan, dedup, aggregate.
    ///
    /// The per-video scans run concurrently under the configured cap; any
    /// scan failure fails the whole analysis with no partial result. An
    /// unknown channel id is an error; a channel with no comments is not.
    pub async fn analyze(
        store: &Arc<dyn CommentStore>,
        channel_id: &str,
        options: &AnalyzeOptions,
    ) -> Result<Self> {
        let channel = store
            .get_channel(channel_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Channel {channel_id} not found in database"))?;
        let videos = store.list_videos(channel_id).await?;

        let fetched =
            scanner::scan_videos(store, &videos, options.page_size, options.fetch_concurrency)
                .await?;
        let fetched_count = fetched.len();
        let comments = dedup::dedupe(fetched);

        info!(
            channel = %channel.id,
            videos = videos.len(),
            fetched = fetched_count,
            deduplicated = comments.len(),
            "Aggregation input ready"
        );

        let video_stats = aggregate(&comments, |c| c.video_id.clone());
        let author_stats = aggregate(&comments, |c| c.author_key.clone());
        let channel_stats = aggregate(&comments, |_| CHANNEL_KEY.to_string())
            .into_iter()
            .next();

        Ok(Self {
            channel,
            videos,
            comments,
            channel_stats,
            video_stats,
            author_stats,
        })
    }

    pub fn channel(&self) -> &ChannelRecord {
        &self.channel
    }

    /// Whole-channel totals. `video_count` is how many videos the store
    /// holds for the channel — it stays meaningful even when no comment
    /// qualifies for statistics.
    pub fn channel_summary(&self) -> ChannelSummary {
        let video_count = self.videos.len() as u64;
        match &self.channel_stats {
            Some(stat) => ChannelSummary {
                video_count,
                comment_count: stat.count,
                average_toxicity: stat.average_toxicity,
            },
            None => ChannelSummary {
                video_count,
                comment_count: 0,
                average_toxicity: 0.0,
            },
        }
    }

    /// Per-video summaries, most toxic first.
    pub fn video_summaries(&self) -> Vec<VideoSummary> {
        let by_id: HashMap<&str, &VideoRecord> =
            self.videos.iter().map(|v| (v.id.as_str(), v)).collect();

        rank(&self.video_stats, RankBy::AverageToxicity, 1, None)
            .entries
            .into_iter()
            .map(|stat| {
                let video = by_id.get(stat.key.as_str());
                VideoSummary {
                    // A comment can reference a video missing from the
                    // videos table; fall back to the id rather than drop
                    // the group.
                    title: video.map(|v| v.title.clone()).unwrap_or_else(|| stat.key.clone()),
                    view_count: video.map(|v| v.view_count).unwrap_or(0),
                    comment_count: stat.count,
                    average_toxicity: stat.average_toxicity,
                    id: stat.key,
                }
            })
            .collect()
    }

    /// Author rankings under all three criteria, sharing one threshold.
    ///
    /// `limit: None` is "all" mode; Top-K and "all" go through the same
    /// ranking call, so truncating the "all" view client-side always
    /// matches the server-computed Top-K.
    pub fn author_rankings(&self, min_support: u64, limit: Option<usize>) -> AuthorRankings {
        let most_active = rank(&self.author_stats, RankBy::CommentCount, min_support, limit);
        let most_toxic = rank(&self.author_stats, RankBy::AverageToxicity, min_support, limit);
        let most_liked = rank(&self.author_stats, RankBy::LikeSum, min_support, limit);

        let total_users = most_active.total_qualifying as u64;
        AuthorRankings {
            most_active: author_entries(most_active),
            most_toxic: author_entries(most_toxic),
            most_liked: author_entries(most_liked),
            total_users,
            min_comments_threshold: min_support,
        }
    }

    /// Per-video (earliest timestamp, average toxicity) points, ascending
    /// by timestamp.
    pub fn toxicity_timeline(&self) -> Vec<TimelinePoint> {
        let by_id: HashMap<&str, &VideoRecord> =
            self.videos.iter().map(|v| (v.id.as_str(), v)).collect();

        let mut points: Vec<TimelinePoint> = self
            .video_stats
            .iter()
            .map(|stat| TimelinePoint {
                timestamp: stat.earliest_timestamp,
                toxicity_score: stat.average_toxicity,
                video_title: by_id.get(stat.key.as_str()).map(|v| v.title.clone()),
                video_id: Some(stat.key.clone()),
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Raw toxicity/engagement co-moment over the deduplicated set.
    pub fn correlation_estimate(&self) -> CorrelationEstimate {
        CorrelationEstimate {
            coefficient: engagement_co_moment(&self.comments),
        }
    }

    /// Every view in one serializable bundle.
    pub fn report(&self, min_support: u64, limit: Option<usize>) -> ChannelReport {
        ChannelReport {
            channel_id: self.channel.id.clone(),
            channel_name: self.channel.name.clone(),
            summary: self.channel_summary(),
            videos: self.video_summaries(),
            authors: self.author_rankings(min_support, limit),
            timeline: self.toxicity_timeline(),
            correlation: self.correlation_estimate(),
        }
    }
}

fn author_entries(view: RankedView) -> Vec<AuthorEntry> {
    view.entries
        .into_iter()
        .map(|stat| AuthorEntry {
            author_key: stat.key,
            comment_count: stat.count,
            average_toxicity: stat.average_toxicity,
            max_toxicity: stat.max_toxicity,
            total_likes: stat.like_sum,
            most_toxic_comment_text: stat.most_toxic_comment.map(|c| c.text),
        })
        .collect()
}
