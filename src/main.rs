use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use vitriol::config::Config;
use vitriol::engine::facade::{AnalyzeOptions, ChannelAnalytics};
use vitriol::output::{markdown, terminal};
use vitriol::store::models::ChannelDump;
use vitriol::store::sqlite::SqliteStore;
use vitriol::store::{self, CommentStore};

/// Vitriol: toxicity analytics for YouTube channel comments.
///
/// Turns a store of already-ingested, already-scored comments into channel,
/// video, and author summaries with rankings, a toxicity timeline, and an
/// engagement estimate.
#[derive(Parser)]
#[command(name = "vitriol", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Import a channel dump (channel + videos + comments JSON)
    Import {
        /// Path to the JSON dump file
        file: PathBuf,
    },

    /// Print the full channel report
    Report {
        /// The channel id to analyze
        channel_id: String,

        /// Emit the report as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Also write the report as markdown to this path
        #[arg(long)]
        markdown: Option<String>,

        /// Minimum comments for an author to be ranked (default: VITRIOL_MIN_COMMENTS)
        #[arg(long)]
        min_comments: Option<u64>,

        /// Entries per author ranking (default: 10)
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Rank all qualifying authors instead of the top N
        #[arg(long)]
        all: bool,
    },

    /// Show the whole-channel summary
    Summary {
        /// The channel id to analyze
        channel_id: String,
    },

    /// List videos, most toxic first
    Videos {
        /// The channel id to analyze
        channel_id: String,
    },

    /// Author rankings: most active, most toxic, most liked
    Authors {
        /// The channel id to analyze
        channel_id: String,

        /// Minimum comments for an author to be ranked (default: VITRIOL_MIN_COMMENTS)
        #[arg(long)]
        min_comments: Option<u64>,

        /// Entries per ranking (default: 10)
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Rank all qualifying authors instead of the top N
        #[arg(long)]
        all: bool,
    },

    /// Per-video toxicity timeline, oldest first
    Timeline {
        /// The channel id to analyze
        channel_id: String,
    },

    /// Toxicity/engagement co-moment for a channel
    Correlation {
        /// The channel id to analyze
        channel_id: String,
    },

    /// Show system status (DB stats, scoring coverage)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vitriol=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing vitriol database...");
            let config = Config::load()?;
            let store = init_store(&config)?;
            let table_count = store.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: load a channel dump");
            println!("  vitriol import <dump.json>");
        }

        Commands::Import { file } => {
            let config = Config::load()?;
            let store = init_store(&config)?;

            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let dump: ChannelDump = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", file.display()))?;

            println!(
                "Importing channel {} ({})...",
                dump.channel.name, dump.channel.id
            );
            let stats = store.import_dump(&dump).await?;
            info!(
                channel = %dump.channel.id,
                videos = stats.videos,
                comments = stats.comments,
                "Import complete"
            );
            println!(
                "{}",
                format!(
                    "Imported {} videos and {} comments.",
                    stats.videos, stats.comments
                )
                .bold()
            );
            println!("\nNext step: vitriol report {}", dump.channel.id);
        }

        Commands::Report {
            channel_id,
            json,
            markdown: markdown_path,
            min_comments,
            limit,
            all,
        } => {
            let config = Config::load()?;
            let analytics = analyze_channel(&config, &channel_id).await?;
            let min_support = min_comments.unwrap_or(config.min_comments);
            let report = analytics.report(min_support, ranking_limit(all, limit));

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                terminal::display_channel_summary(analytics.channel(), &report.summary);
                terminal::display_video_summaries(&report.videos);
                terminal::display_author_rankings(&report.authors);
                terminal::display_timeline(&report.timeline);
                terminal::display_correlation(&report.correlation);
            }

            if let Some(path) = markdown_path {
                markdown::generate_report(&report, &path)?;
                println!("\nMarkdown report written to {path}");
            }
        }

        Commands::Summary { channel_id } => {
            let config = Config::load()?;
            let analytics = analyze_channel(&config, &channel_id).await?;
            terminal::display_channel_summary(analytics.channel(), &analytics.channel_summary());
        }

        Commands::Videos { channel_id } => {
            let config = Config::load()?;
            let analytics = analyze_channel(&config, &channel_id).await?;
            terminal::display_video_summaries(&analytics.video_summaries());
        }

        Commands::Authors {
            channel_id,
            min_comments,
            limit,
            all,
        } => {
            let config = Config::load()?;
            let analytics = analyze_channel(&config, &channel_id).await?;
            let min_support = min_comments.unwrap_or(config.min_comments);
            let rankings = analytics.author_rankings(min_support, ranking_limit(all, limit));
            terminal::display_author_rankings(&rankings);
        }

        Commands::Timeline { channel_id } => {
            let config = Config::load()?;
            let analytics = analyze_channel(&config, &channel_id).await?;
            terminal::display_timeline(&analytics.toxicity_timeline());
        }

        Commands::Correlation { channel_id } => {
            let config = Config::load()?;
            let analytics = analyze_channel(&config, &channel_id).await?;
            terminal::display_correlation(&analytics.correlation_estimate());
        }

        Commands::Status => {
            let config = Config::load()?;
            match open_store(&config) {
                Ok(store) => vitriol::status::show(&store, &config.db_path).await?,
                Err(_) => {
                    println!("Database: not initialized");
                    println!("\nRun `vitriol init` to set up the database.");
                }
            }
        }
    }

    Ok(())
}

/// Open an existing store (fails with a hint if `init` hasn't run).
fn open_store(config: &Config) -> Result<Arc<dyn CommentStore>> {
    let conn = store::open(&config.db_path)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

/// Open the store, creating the database file if needed.
fn init_store(config: &Config) -> Result<Arc<dyn CommentStore>> {
    let conn = store::initialize(&config.db_path)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

/// Run the full analysis pipeline for one channel.
async fn analyze_channel(config: &Config, channel_id: &str) -> Result<ChannelAnalytics> {
    config.require_scan_settings()?;
    let store = open_store(config)?;
    let options = AnalyzeOptions {
        page_size: config.page_size,
        fetch_concurrency: config.fetch_concurrency,
    };
    ChannelAnalytics::analyze(&store, channel_id, &options).await
}

fn ranking_limit(all: bool, limit: usize) -> Option<usize> {
    if all {
        None
    } else {
        Some(limit)
    }
}
