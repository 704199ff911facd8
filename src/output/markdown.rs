// Markdown report generation.
//
// Writes the full channel report as a markdown document with tables for
// each view. Comment text goes into table cells, so pipe characters are
// escaped and long text is truncated.

use anyhow::{Context, Result};
use std::fmt::Write as _;

use crate::engine::facade::{AuthorEntry, ChannelReport};

/// Write the channel report as markdown to `path`.
pub fn generate_report(report: &ChannelReport, path: &str) -> Result<()> {
    let content = render_report(report);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {path}"))?;
    Ok(())
}

fn render_report(report: &ChannelReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Toxicity Report: {}", escape_pipes(&report.channel_name));
    let _ = writeln!(out, "\nChannel id: `{}`\n", report.channel_id);

    // Summary
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| Videos | {} |", report.summary.video_count);
    let _ = writeln!(
        out,
        "| Comments (deduplicated) | {} |",
        report.summary.comment_count
    );
    let _ = writeln!(
        out,
        "| Average toxicity | {:.3} |",
        report.summary.average_toxicity
    );
    let _ = writeln!(
        out,
        "| Toxicity/engagement co-moment | {:.4} |",
        report.correlation.coefficient
    );

    // Videos
    if !report.videos.is_empty() {
        let _ = writeln!(out, "\n## Videos (most toxic first)\n");
        let _ = writeln!(out, "| Title | Views | Comments | Avg toxicity |");
        let _ = writeln!(out, "|-------|------:|---------:|-------------:|");
        for video in &report.videos {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.3} |",
                escape_pipes(&super::truncate_chars(&video.title, 60)),
                video.view_count,
                video.comment_count,
                video.average_toxicity,
            );
        }
    }

    // Authors
    let _ = writeln!(
        out,
        "\n## Authors ({} with >= {} comments)",
        report.authors.total_users, report.authors.min_comments_threshold
    );
    author_table(&mut out, "Most active", &report.authors.most_active);
    author_table(&mut out, "Most toxic", &report.authors.most_toxic);
    author_table(&mut out, "Most liked", &report.authors.most_liked);

    // Timeline
    if !report.timeline.is_empty() {
        let _ = writeln!(out, "\n## Toxicity timeline\n");
        let _ = writeln!(out, "| Date | Avg toxicity | Video |");
        let _ = writeln!(out, "|------|-------------:|-------|");
        for point in &report.timeline {
            let label = point
                .video_title
                .as_deref()
                .or(point.video_id.as_deref())
                .unwrap_or("?");
            let _ = writeln!(
                out,
                "| {} | {:.3} | {} |",
                point.timestamp.format("%Y-%m-%d"),
                point.toxicity_score,
                escape_pipes(&super::truncate_chars(label, 60)),
            );
        }
    }

    out
}

fn author_table(out: &mut String, heading: &str, entries: &[AuthorEntry]) {
    if entries.is_empty() {
        return;
    }

    let _ = writeln!(out, "\n### {heading}\n");
    let _ = writeln!(
        out,
        "| Rank | Author | Comments | Avg toxicity | Max toxicity | Likes | Most toxic comment |"
    );
    let _ = writeln!(
        out,
        "|-----:|--------|---------:|-------------:|-------------:|------:|--------------------|"
    );
    for (i, entry) in entries.iter().enumerate() {
        let evidence = entry
            .most_toxic_comment_text
            .as_deref()
            .map(|text| escape_pipes(&super::truncate_chars(text, 80)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.3} | {:.3} | {} | {} |",
            i + 1,
            escape_pipes(&entry.author_key),
            entry.comment_count,
            entry.average_toxicity,
            entry.max_toxicity,
            entry.total_likes,
            evidence,
        );
    }
}

/// Escape pipe characters so comment text can't break markdown tables.
fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::facade::{
        AuthorRankings, ChannelSummary, CorrelationEstimate, TimelinePoint, VideoSummary,
    };
    use chrono::{DateTime, Utc};

    fn report() -> ChannelReport {
        ChannelReport {
            channel_id: "ch1".to_string(),
            channel_name: "Test Channel".to_string(),
            summary: ChannelSummary {
                video_count: 1,
                comment_count: 2,
                average_toxicity: 0.45,
            },
            videos: vec![VideoSummary {
                id: "v1".to_string(),
                title: "A | B".to_string(),
                view_count: 100,
                comment_count: 2,
                average_toxicity: 0.45,
            }],
            authors: AuthorRankings {
                most_active: vec![AuthorEntry {
                    author_key: "alice".to_string(),
                    comment_count: 2,
                    average_toxicity: 0.45,
                    max_toxicity: 0.8,
                    total_likes: 5,
                    most_toxic_comment_text: Some("this | breaks | tables".to_string()),
                }],
                most_toxic: vec![],
                most_liked: vec![],
                total_users: 1,
                min_comments_threshold: 2,
            },
            timeline: vec![TimelinePoint {
                timestamp: DateTime::<Utc>::UNIX_EPOCH,
                toxicity_score: 0.45,
                video_title: Some("A | B".to_string()),
                video_id: Some("v1".to_string()),
            }],
            correlation: CorrelationEstimate { coefficient: 1.25 },
        }
    }

    #[test]
    fn report_contains_all_sections() {
        let content = render_report(&report());
        assert!(content.contains("# Toxicity Report: Test Channel"));
        assert!(content.contains("## Summary"));
        assert!(content.contains("| Videos | 1 |"));
        assert!(content.contains("| Comments (deduplicated) | 2 |"));
        assert!(content.contains("### Most active"));
        assert!(content.contains("## Toxicity timeline"));
    }

    #[test]
    fn pipes_in_text_are_escaped() {
        let content = render_report(&report());
        assert!(
            content.contains("this \\| breaks \\| tables"),
            "Pipe chars should be escaped in markdown tables"
        );
        assert!(content.contains("A \\| B"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut r = report();
        r.videos.clear();
        r.timeline.clear();
        r.authors.most_active.clear();
        let content = render_report(&r);
        assert!(!content.contains("## Videos"));
        assert!(!content.contains("## Toxicity timeline"));
        assert!(!content.contains("### Most active"));
        // The summary section is always present.
        assert!(content.contains("## Summary"));
    }

    #[test]
    fn generate_report_writes_the_file() {
        let tmp_path = "/tmp/vitriol_test_report.md";
        generate_report(&report(), tmp_path).unwrap();
        let content = std::fs::read_to_string(tmp_path).unwrap();
        assert!(content.contains("# Toxicity Report"));
        let _ = std::fs::remove_file(tmp_path);
    }
}
