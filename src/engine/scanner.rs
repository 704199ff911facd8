// Paged comment scanning — bounded page requests against the store.
//
// The store is a paged source with an offset/limit contract: the scanner
// keeps requesting fixed-size pages until a short page comes back. Raw rows
// are normalized into the canonical AnnotatedComment shape here, at the
// boundary, so every downstream component sees exactly one record shape.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::store::models::{AnnotatedComment, CommentFilter, VideoRecord};
use crate::store::CommentStore;

/// Fetch every comment matching the filter, one bounded page at a time.
///
/// Pages cover `[offset, offset + page_size)`; a page with fewer than
/// `page_size` rows (including zero) ends the scan. A page of exactly
/// `page_size` always triggers one more request — one wasted round trip at
/// exact boundaries buys a scanner with no lookahead state. The scanner
/// holds no cursor between calls; every call restarts from offset 0.
///
/// Any page failure fails the whole scan. A truncated sequence is never
/// returned.
pub async fn scan_comments(
    store: &dyn CommentStore,
    filter: &CommentFilter,
    page_size: u32,
) -> Result<Vec<AnnotatedComment>> {
    anyhow::ensure!(page_size > 0, "page size must be at least 1");

    let mut comments = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let rows = store
            .comments_page(filter, offset, page_size)
            .await
            .with_context(|| format!("Comment page fetch failed at offset {offset}"))?;
        let fetched = rows.len();
        comments.extend(rows.into_iter().map(AnnotatedComment::from_row));

        debug!(offset, fetched, total = comments.len(), "Fetched comment page");

        if fetched < page_size as usize {
            break;
        }
        offset += page_size as u64;
    }

    Ok(comments)
}

/// Scan several videos' comments concurrently, merged in video order.
///
/// At most `concurrency` per-video scans are in flight at once. `videos`
/// must already be in a stable order (`list_videos` sorts by id) so
/// repeated runs over unchanged storage produce the same merged sequence —
/// completion order is discarded. If any video's scan fails the whole scan
/// fails; partial merges are never returned as success.
pub async fn scan_videos(
    store: &Arc<dyn CommentStore>,
    videos: &[VideoRecord],
    page_size: u32,
    concurrency: usize,
) -> Result<Vec<AnnotatedComment>> {
    let pb = ProgressBar::new(videos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Scanning [{bar:30}] {pos}/{len} ({eta})")
            .unwrap(),
    );

    let mut results: Vec<(usize, &str, Result<Vec<AnnotatedComment>>)> =
        stream::iter(videos.iter().enumerate().map(|(idx, video)| {
            let store = Arc::clone(store);
            let pb = pb.clone();
            async move {
                let filter = CommentFilter::for_video(&video.id);
                let result = scan_comments(store.as_ref(), &filter, page_size).await;
                pb.inc(1);
                (idx, video.id.as_str(), result)
            }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    // Merge in video order, not completion order.
    results.sort_by_key(|(idx, _, _)| *idx);

    let mut merged = Vec::new();
    for (_, video_id, result) in results {
        let scanned =
            result.with_context(|| format!("Comment scan failed for video {video_id}"))?;
        merged.extend(scanned);
    }

    info!(
        videos = videos.len(),
        comments = merged.len(),
        "Channel comment scan complete"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{ChannelDump, ChannelRecord, CommentRow, ImportStats, StoreStats};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockStore {
        rows: Vec<CommentRow>,
        page_requests: AtomicUsize,
        fail_from_offset: Option<u64>,
    }

    impl MockStore {
        fn with_rows(rows: Vec<CommentRow>) -> Self {
            Self {
                rows,
                page_requests: AtomicUsize::new(0),
                fail_from_offset: None,
            }
        }
    }

    fn row(id: &str, video_id: &str) -> CommentRow {
        CommentRow {
            id: id.to_string(),
            video_id: video_id.to_string(),
            text: Some(format!("text {id}")),
            author_id: Some("UC1".to_string()),
            author_name: None,
            like_count: Some(0.0),
            published_at: None,
            toxicity_score: Some(0.5),
        }
    }

    #[async_trait]
    impl CommentStore for MockStore {
        async fn table_count(&self) -> Result<i64> {
            Ok(0)
        }

        async fn get_channel(&self, _channel_id: &str) -> Result<Option<ChannelRecord>> {
            Ok(None)
        }

        async fn list_videos(
            &self,
            _channel_id: &str,
        ) -> Result<Vec<crate::store::models::VideoRecord>> {
            Ok(vec![])
        }

        async fn comments_page(
            &self,
            filter: &CommentFilter,
            offset: u64,
            limit: u32,
        ) -> Result<Vec<CommentRow>> {
            self.page_requests.fetch_add(1, Ordering::SeqCst);
            if let Some(fail_at) = self.fail_from_offset {
                if offset >= fail_at {
                    anyhow::bail!("storage unavailable");
                }
            }
            Ok(self
                .rows
                .iter()
                .filter(|r| {
                    filter
                        .video_id
                        .as_deref()
                        .map_or(true, |v| v == r.video_id)
                })
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn import_dump(&self, _dump: &ChannelDump) -> Result<ImportStats> {
            anyhow::bail!("not supported by the mock")
        }

        async fn store_stats(&self) -> Result<StoreStats> {
            Ok(StoreStats::default())
        }
    }

    #[tokio::test]
    async fn five_rows_with_page_size_two_takes_three_requests() {
        let store = MockStore::with_rows(vec![
            row("c1", "v1"),
            row("c2", "v1"),
            row("c3", "v1"),
            row("c4", "v1"),
            row("c5", "v1"),
        ]);
        let comments = scan_comments(&store, &CommentFilter::for_video("v1"), 2)
            .await
            .unwrap();
        assert_eq!(comments.len(), 5);
        // Pages of 2, 2, 1 — the short final page ends the scan.
        assert_eq!(store.page_requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exact_boundary_costs_one_extra_empty_request() {
        let store = MockStore::with_rows(vec![row("c1", "v1"), row("c2", "v1")]);
        let comments = scan_comments(&store, &CommentFilter::for_video("v1"), 2)
            .await
            .unwrap();
        assert_eq!(comments.len(), 2);
        // Full first page, then a zero-row page to prove the end.
        assert_eq!(store.page_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_source_is_one_request_and_no_comments() {
        let store = MockStore::with_rows(vec![]);
        let comments = scan_comments(&store, &CommentFilter::for_video("v1"), 10)
            .await
            .unwrap();
        assert!(comments.is_empty());
        assert_eq!(store.page_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn page_failure_fails_the_whole_scan() {
        let mut store = MockStore::with_rows(vec![
            row("c1", "v1"),
            row("c2", "v1"),
            row("c3", "v1"),
        ]);
        store.fail_from_offset = Some(2);
        let result = scan_comments(&store, &CommentFilter::for_video("v1"), 2).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let store = MockStore::with_rows(vec![]);
        let result = scan_comments(&store, &CommentFilter::default(), 0).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn multi_video_scan_merges_in_video_order() {
        use crate::store::models::VideoRecord;

        let store: Arc<dyn CommentStore> = Arc::new(MockStore::with_rows(vec![
            row("b1", "vb"),
            row("a1", "va"),
            row("a2", "va"),
        ]));
        let videos = vec![
            VideoRecord {
                id: "va".to_string(),
                channel_id: "ch1".to_string(),
                title: "A".to_string(),
                view_count: 0,
                comment_count: 0,
                published_at: None,
            },
            VideoRecord {
                id: "vb".to_string(),
                channel_id: "ch1".to_string(),
                title: "B".to_string(),
                view_count: 0,
                comment_count: 0,
                published_at: None,
            },
        ];

        let merged = scan_videos(&store, &videos, 10, 4).await.unwrap();
        let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        // va's comments first regardless of completion order.
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
    }

    #[tokio::test]
    async fn multi_video_scan_fails_when_any_video_fails() {
        use crate::store::models::VideoRecord;

        let mut mock = MockStore::with_rows(vec![row("a1", "va"), row("b1", "vb")]);
        // Offset-based failure triggers for every video's first page when
        // fail_from_offset is 0 — simulate a store outage mid-request.
        mock.fail_from_offset = Some(0);
        let store: Arc<dyn CommentStore> = Arc::new(mock);

        let videos = vec![VideoRecord {
            id: "va".to_string(),
            channel_id: "ch1".to_string(),
            title: "A".to_string(),
            view_count: 0,
            comment_count: 0,
            published_at: None,
        }];
        assert!(scan_videos(&store, &videos, 10, 4).await.is_err());
    }
}
