// SqliteStore — rusqlite backend implementing the CommentStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points — Rust enforces this because
// MutexGuard is !Send.
//
// The free functions in queries.rs remain usable against a bare Connection,
// which is what the unit tests there do.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{
    ChannelDump, ChannelRecord, CommentFilter, CommentRow, ImportStats, StoreStats, VideoRecord,
};
use super::traits::CommentStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl CommentStore for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>> {
        let conn = self.conn.lock().await;
        super::queries::get_channel(&conn, channel_id)
    }

    async fn list_videos(&self, channel_id: &str) -> Result<Vec<VideoRecord>> {
        let conn = self.conn.lock().await;
        super::queries::list_videos(&conn, channel_id)
    }

    async fn comments_page(
        &self,
        filter: &CommentFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<CommentRow>> {
        let conn = self.conn.lock().await;
        super::queries::comments_page(&conn, filter, offset, limit)
    }

    async fn import_dump(&self, dump: &ChannelDump) -> Result<ImportStats> {
        let conn = self.conn.lock().await;
        super::queries::import_dump(&conn, dump)
    }

    async fn store_stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;
        super::queries::store_stats(&conn)
    }
}
