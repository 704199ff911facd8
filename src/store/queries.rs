// Store queries — CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust
// interfaces.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{
    ChannelDump, ChannelRecord, CommentFilter, CommentImport, CommentRow, ImportStats, StoreStats,
    VideoImport, VideoRecord,
};

// --- Channels ---

/// Insert or update a channel.
pub fn upsert_channel(conn: &Connection, channel: &ChannelRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO channels (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = ?2",
        params![channel.id, channel.name],
    )?;
    Ok(())
}

/// Look up a channel by id.
pub fn get_channel(conn: &Connection, channel_id: &str) -> Result<Option<ChannelRecord>> {
    let mut stmt = conn.prepare("SELECT id, name FROM channels WHERE id = ?1")?;
    let result = stmt
        .query_row(params![channel_id], |row| {
            Ok(ChannelRecord {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?;
    Ok(result)
}

// --- Videos ---

/// Insert or update a video under the given channel.
pub fn upsert_video(conn: &Connection, channel_id: &str, video: &VideoImport) -> Result<()> {
    conn.execute(
        "INSERT INTO videos (id, channel_id, title, view_count, comment_count, published_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            channel_id = ?2,
            title = ?3,
            view_count = ?4,
            comment_count = ?5,
            published_at = ?6",
        params![
            video.id,
            channel_id,
            video.title,
            video.view_count,
            video.comment_count,
            video.published_at,
        ],
    )?;
    Ok(())
}

/// List a channel's videos, ordered by video id.
///
/// The ordering is part of the contract — callers fan out one comment scan
/// per video and rely on a stable video order to merge deterministically.
pub fn list_videos(conn: &Connection, channel_id: &str) -> Result<Vec<VideoRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, channel_id, title, view_count, comment_count, published_at
         FROM videos
         WHERE channel_id = ?1
         ORDER BY id",
    )?;
    let videos = stmt
        .query_map(params![channel_id], |row| {
            Ok(VideoRecord {
                id: row.get(0)?,
                channel_id: row.get(1)?,
                title: row.get(2)?,
                view_count: row.get(3)?,
                comment_count: row.get(4)?,
                published_at: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(videos)
}

// --- Comments ---

/// Insert or update a single comment row.
pub fn upsert_comment(conn: &Connection, comment: &CommentImport) -> Result<()> {
    conn.execute(
        "INSERT INTO comments
            (id, video_id, text, author_id, author_name, like_count, published_at, toxicity_score)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            video_id = ?2,
            text = ?3,
            author_id = ?4,
            author_name = ?5,
            like_count = ?6,
            published_at = ?7,
            toxicity_score = ?8",
        params![
            comment.id,
            comment.video_id,
            comment.text,
            comment.author_id,
            comment.author_name,
            comment.like_count,
            comment.published_at,
            comment.toxicity_score,
        ],
    )?;
    Ok(())
}

fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        video_id: row.get(1)?,
        text: row.get(2)?,
        author_id: row.get(3)?,
        author_name: row.get(4)?,
        like_count: row.get(5)?,
        published_at: row.get(6)?,
        toxicity_score: row.get(7)?,
    })
}

const COMMENT_COLUMNS: &str =
    "c.id, c.video_id, c.text, c.author_id, c.author_name, c.like_count, c.published_at, c.toxicity_score";

/// Fetch one page of comment rows matching the filter.
///
/// Rows are ordered by rowid — storage insertion order — so repeated scans
/// over an unchanged store see the same sequence and the same duplicates
/// first. Video scope wins over channel scope when both are set.
pub fn comments_page(
    conn: &Connection,
    filter: &CommentFilter,
    offset: u64,
    limit: u32,
) -> Result<Vec<CommentRow>> {
    let rows = match (&filter.video_id, &filter.channel_id) {
        (Some(video_id), _) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c
                 WHERE c.video_id = ?1
                 ORDER BY c.rowid
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(params![video_id, limit, offset as i64], row_to_comment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        (None, Some(channel_id)) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c
                 JOIN videos v ON v.id = c.video_id
                 WHERE v.channel_id = ?1
                 ORDER BY c.rowid
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(params![channel_id, limit, offset as i64], row_to_comment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        (None, None) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c
                 ORDER BY c.rowid
                 LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, offset as i64], row_to_comment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(rows)
}

// --- Import / status ---

/// Load a full channel dump, upserting every row.
pub fn import_dump(conn: &Connection, dump: &ChannelDump) -> Result<ImportStats> {
    upsert_channel(conn, &dump.channel)?;

    let mut stats = ImportStats::default();
    for video in &dump.videos {
        upsert_video(conn, &dump.channel.id, video)?;
        stats.videos += 1;
    }
    for comment in &dump.comments {
        upsert_comment(conn, comment)?;
        stats.comments += 1;
    }
    Ok(stats)
}

/// Store-wide row counts for the status display.
pub fn store_stats(conn: &Connection) -> Result<StoreStats> {
    let count = |sql: &str| -> Result<u64> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as u64)
    };
    Ok(StoreStats {
        channels: count("SELECT COUNT(*) FROM channels")?,
        videos: count("SELECT COUNT(*) FROM videos")?,
        comments: count("SELECT COUNT(*) FROM comments")?,
        scored_comments: count("SELECT COUNT(*) FROM comments WHERE toxicity_score IS NOT NULL")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::create_tables;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn comment(id: &str, video_id: &str) -> CommentImport {
        CommentImport {
            id: id.to_string(),
            video_id: video_id.to_string(),
            text: Some(format!("text for {id}")),
            author_id: Some("UC1".to_string()),
            author_name: Some("Alice".to_string()),
            like_count: Some(1.0),
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
            toxicity_score: Some(0.1),
        }
    }

    #[test]
    fn channel_roundtrip() {
        let conn = test_conn();
        assert!(get_channel(&conn, "ch1").unwrap().is_none());
        upsert_channel(
            &conn,
            &ChannelRecord {
                id: "ch1".to_string(),
                name: "Test Channel".to_string(),
            },
        )
        .unwrap();
        let found = get_channel(&conn, "ch1").unwrap().unwrap();
        assert_eq!(found.name, "Test Channel");
    }

    #[test]
    fn list_videos_is_ordered_by_id() {
        let conn = test_conn();
        for id in ["vc", "va", "vb"] {
            upsert_video(
                &conn,
                "ch1",
                &VideoImport {
                    id: id.to_string(),
                    title: id.to_uppercase(),
                    view_count: 0,
                    comment_count: 0,
                    published_at: None,
                },
            )
            .unwrap();
        }
        let videos = list_videos(&conn, "ch1").unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["va", "vb", "vc"]);
    }

    #[test]
    fn comments_page_respects_offset_and_limit() {
        let conn = test_conn();
        for i in 0..5 {
            upsert_comment(&conn, &comment(&format!("c{i}"), "v1")).unwrap();
        }
        let filter = CommentFilter::for_video("v1");

        let first = comments_page(&conn, &filter, 0, 2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, "c0");

        let second = comments_page(&conn, &filter, 2, 2).unwrap();
        assert_eq!(second[0].id, "c2");

        let last = comments_page(&conn, &filter, 4, 2).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, "c4");
    }

    #[test]
    fn comments_page_channel_scope_joins_through_videos() {
        let conn = test_conn();
        upsert_video(
            &conn,
            "ch1",
            &VideoImport {
                id: "v1".to_string(),
                title: "One".to_string(),
                view_count: 0,
                comment_count: 0,
                published_at: None,
            },
        )
        .unwrap();
        upsert_video(
            &conn,
            "ch2",
            &VideoImport {
                id: "v2".to_string(),
                title: "Other".to_string(),
                view_count: 0,
                comment_count: 0,
                published_at: None,
            },
        )
        .unwrap();
        upsert_comment(&conn, &comment("c1", "v1")).unwrap();
        upsert_comment(&conn, &comment("c2", "v2")).unwrap();

        let rows = comments_page(&conn, &CommentFilter::for_channel("ch1"), 0, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "c1");
    }

    #[test]
    fn null_fields_survive_the_roundtrip() {
        let conn = test_conn();
        let mut partial = comment("c1", "v1");
        partial.text = None;
        partial.author_id = None;
        partial.author_name = None;
        partial.like_count = None;
        partial.published_at = None;
        partial.toxicity_score = None;
        upsert_comment(&conn, &partial).unwrap();

        let rows = comments_page(&conn, &CommentFilter::for_video("v1"), 0, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].text.is_none());
        assert!(rows[0].toxicity_score.is_none());
    }

    #[test]
    fn import_dump_counts_rows() {
        let conn = test_conn();
        let dump = ChannelDump {
            channel: ChannelRecord {
                id: "ch1".to_string(),
                name: "Test".to_string(),
            },
            videos: vec![VideoImport {
                id: "v1".to_string(),
                title: "One".to_string(),
                view_count: 100,
                comment_count: 2,
                published_at: None,
            }],
            comments: vec![comment("c1", "v1"), comment("c2", "v1")],
        };
        let stats = import_dump(&conn, &dump).unwrap();
        assert_eq!(stats.videos, 1);
        assert_eq!(stats.comments, 2);

        let totals = store_stats(&conn).unwrap();
        assert_eq!(totals.channels, 1);
        assert_eq!(totals.comments, 2);
        assert_eq!(totals.scored_comments, 2);
    }
}
