// Colored terminal output for channel reports.
//
// This module handles all terminal-specific formatting: colors, tables,
// truncation. The main.rs display functions delegate here.

use colored::Colorize;

use crate::engine::facade::{
    AuthorEntry, AuthorRankings, ChannelSummary, CorrelationEstimate, TimelinePoint, VideoSummary,
};
use crate::store::models::ChannelRecord;

/// Display the whole-channel summary block.
pub fn display_channel_summary(channel: &ChannelRecord, summary: &ChannelSummary) {
    println!(
        "\n{}",
        format!("=== {} ({}) ===", channel.name, channel.id).bold()
    );
    println!("  Videos:   {}", summary.video_count);
    println!("  Comments: {} (deduplicated)", summary.comment_count);
    println!(
        "  Average toxicity: {}",
        colorize_toxicity(summary.average_toxicity)
    );
}

/// Display the per-video table, most toxic first.
pub fn display_video_summaries(videos: &[VideoSummary]) {
    if videos.is_empty() {
        println!("No videos with scored comments.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Videos ({}) ===", videos.len()).bold()
    );
    println!();
    println!(
        "  {:<44} {:>9} {:>9} {:>8}",
        "Title".dimmed(),
        "Views".dimmed(),
        "Comments".dimmed(),
        "Avg tox".dimmed(),
    );
    println!("  {}", "-".repeat(74).dimmed());

    for video in videos {
        println!(
            "  {:<44} {:>9} {:>9} {:>8}",
            super::truncate_chars(&video.title, 40),
            video.view_count,
            video.comment_count,
            colorize_toxicity(video.average_toxicity),
        );
    }
}

/// Display the three author rankings.
pub fn display_author_rankings(rankings: &AuthorRankings) {
    println!(
        "\n{}",
        format!(
            "=== Authors ({} with >= {} comments) ===",
            rankings.total_users, rankings.min_comments_threshold
        )
        .bold()
    );

    display_author_table("Most active", &rankings.most_active);
    display_author_table("Most toxic", &rankings.most_toxic);
    display_author_table("Most liked", &rankings.most_liked);
}

fn display_author_table(heading: &str, entries: &[AuthorEntry]) {
    if entries.is_empty() {
        return;
    }

    println!("\n  {}", heading.bold());
    println!(
        "  {:>4}  {:<28} {:>9} {:>8} {:>8} {:>7}",
        "Rank".dimmed(),
        "Author".dimmed(),
        "Comments".dimmed(),
        "Avg tox".dimmed(),
        "Max tox".dimmed(),
        "Likes".dimmed(),
    );

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "  {:>4}. {:<28} {:>9} {:>8} {:>8} {:>7}",
            i + 1,
            super::truncate_chars(&entry.author_key, 26),
            entry.comment_count,
            colorize_toxicity(entry.average_toxicity),
            colorize_toxicity(entry.max_toxicity),
            entry.total_likes,
        );
    }
}

/// Display the toxicity timeline, oldest first.
pub fn display_timeline(points: &[TimelinePoint]) {
    if points.is_empty() {
        println!("No timeline data — no scored comments.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Toxicity Timeline ({} points) ===", points.len()).bold()
    );
    println!();

    for point in points {
        let label = point
            .video_title
            .as_deref()
            .or(point.video_id.as_deref())
            .unwrap_or("?");
        println!(
            "  {}  {}  {}",
            point.timestamp.format("%Y-%m-%d"),
            colorize_toxicity(point.toxicity_score),
            super::truncate_chars(label, 50).dimmed(),
        );
    }
}

/// Display the toxicity/engagement estimate.
pub fn display_correlation(estimate: &CorrelationEstimate) {
    println!(
        "\n  Toxicity/engagement co-moment: {:.4}",
        estimate.coefficient
    );
    println!(
        "  {}",
        "(raw mean of toxicity x likes — not a normalized correlation)".dimmed()
    );
}

/// Colorize a toxicity score in [0,1].
fn colorize_toxicity(score: f64) -> colored::ColoredString {
    let formatted = format!("{score:.3}");
    if score >= 0.7 {
        formatted.red().bold()
    } else if score >= 0.4 {
        formatted.yellow()
    } else {
        formatted.green()
    }
}
