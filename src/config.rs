use std::env;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// Nothing here is secret — the store is a local file and the engine makes
/// no network calls. The .env file is loaded automatically at startup via
/// dotenvy.
pub struct Config {
    pub db_path: String,
    /// Page size for comment scans (the store is queried in fixed-size
    /// offset/limit pages; a short page ends the scan).
    pub page_size: u32,
    /// How many per-video comment scans run concurrently.
    pub fetch_concurrency: usize,
    /// Default minimum comment count for an author to appear in rankings.
    pub min_comments: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every value has a default — `vitriol init` and `vitriol import`
    /// work out of the box with no .env file at all.
    pub fn load() -> Result<Self> {
        let page_size = parse_env("VITRIOL_PAGE_SIZE", 1000)?;
        let fetch_concurrency = parse_env("VITRIOL_FETCH_CONCURRENCY", 8)?;
        let min_comments = parse_env("VITRIOL_MIN_COMMENTS", 2)?;

        Ok(Self {
            db_path: env::var("VITRIOL_DB_PATH").unwrap_or_else(|_| "./vitriol.db".to_string()),
            page_size,
            fetch_concurrency,
            min_comments,
        })
    }

    /// Check that the scan settings are usable.
    /// Call this before any command that runs a channel scan.
    pub fn require_scan_settings(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("VITRIOL_PAGE_SIZE must be at least 1");
        }
        if self.fetch_concurrency == 0 {
            anyhow::bail!("VITRIOL_FETCH_CONCURRENCY must be at least 1");
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Env vars are process-global, so only assert on keys no test sets.
        let config = Config::load().unwrap();
        assert!(config.page_size >= 1);
        assert!(config.fetch_concurrency >= 1);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = Config {
            db_path: String::new(),
            page_size: 0,
            fetch_concurrency: 8,
            min_comments: 2,
        };
        assert!(config.require_scan_settings().is_err());
    }
}
