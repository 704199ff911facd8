// CommentStore trait — backend-agnostic async interface for the comment
// source.
//
// Implementor: SqliteStore (wraps rusqlite). All methods are async so both
// sync (rusqlite via Mutex) and native async backends fit behind a single
// interface.
//
// The engine only ever sees this trait. The store is constructed by the
// caller and passed into the analytics facade — there is no process-global
// client instance.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{
    ChannelDump, ChannelRecord, CommentFilter, CommentRow, ImportStats, StoreStats, VideoRecord,
};

#[async_trait]
pub trait CommentStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Channel scope ---

    /// Look up a channel by id.
    async fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>>;

    /// List a channel's videos, ordered by video id so callers that fan out
    /// per video merge results deterministically.
    async fn list_videos(&self, channel_id: &str) -> Result<Vec<VideoRecord>>;

    // --- Paged comment source ---

    /// Fetch one page of raw comment rows matching the filter.
    ///
    /// Rows come back in storage insertion order. A page shorter than
    /// `limit` means the scan is done; a page of exactly `limit` rows says
    /// nothing about whether more exist.
    async fn comments_page(
        &self,
        filter: &CommentFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<CommentRow>>;

    // --- Import / status ---

    /// Load a channel dump (channel + videos + comments), upserting rows.
    async fn import_dump(&self, dump: &ChannelDump) -> Result<ImportStats>;

    /// Store-wide row counts for the status display.
    async fn store_stats(&self) -> Result<StoreStats>;
}
