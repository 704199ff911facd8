// Store schema — table creation and migrations.
//
// We use a simple version-based migration approach: a `schema_version` table
// tracks which migrations have run, and each migration is a function that
// executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Channels whose comments have been ingested
        CREATE TABLE IF NOT EXISTS channels (
            id TEXT PRIMARY KEY,               -- platform channel id
            name TEXT NOT NULL
        );

        -- Videos belonging to a channel
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,               -- platform video id
            channel_id TEXT NOT NULL,
            title TEXT NOT NULL,
            view_count INTEGER NOT NULL DEFAULT 0,
            comment_count INTEGER NOT NULL DEFAULT 0,
            published_at TEXT                  -- RFC 3339
        );

        -- Raw ingested comments. Text, author, likes and timestamp are all
        -- nullable — the ingestion pipeline stored whatever the platform
        -- API returned, including partial rows.
        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            video_id TEXT NOT NULL,
            text TEXT,
            author_id TEXT,
            author_name TEXT,
            like_count REAL,                   -- stored as float upstream
            published_at TEXT                  -- RFC 3339
        );

        -- Index for paging a single video's comments
        CREATE INDEX IF NOT EXISTS idx_comments_video
            ON comments(video_id);

        -- Index for listing a channel's videos
        CREATE INDEX IF NOT EXISTS idx_videos_channel
            ON videos(channel_id);
        ",
    )
    .context("Failed to create store tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: add toxicity_score column to comments.
    // Scores are computed by an external classifier after ingestion, so the
    // column arrived later than the initial ingestion schema. NULL means
    // the comment has not been scored.
    run_migration(conn, 2, |c| {
        c.execute_batch("ALTER TABLE comments ADD COLUMN toxicity_score REAL;")
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
/// The migration function receives the connection and should execute its SQL.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
