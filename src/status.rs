// System status display — shows DB stats and scoring coverage.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::store::CommentStore;

/// Display system status to the terminal.
pub async fn show(store: &Arc<dyn CommentStore>, db_display_path: &str) -> Result<()> {
    if !Path::new(db_display_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `vitriol init` to set up the database.");
        return Ok(());
    }

    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let stats = store.store_stats().await?;
    println!(
        "Ingested: {} channels, {} videos, {} comments",
        stats.channels, stats.videos, stats.comments
    );

    if stats.comments == 0 {
        println!("No comments yet. Run `vitriol import <dump.json>` to load data.");
        return Ok(());
    }

    let coverage = stats.scored_comments as f64 / stats.comments as f64 * 100.0;
    println!(
        "Scored: {} of {} comments ({:.1}%)",
        stats.scored_comments, stats.comments, coverage
    );
    if stats.scored_comments < stats.comments {
        println!("  Unscored comments are excluded from every statistic.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
