//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::media::{DEFAULT_HTTP_PORT, MediaUrls, SiteConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When None, pages live in memory.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Hostname of the default site (default: localhost).
    pub site_hostname: String,

    /// Port of the default site (default: 80).
    pub site_port: u16,

    /// Base URL for media files (default: /media/).
    pub media_url: String,

    /// Archive that book metadata is imported from.
    pub archive_url: String,

    /// Archive fetch timeout (default: 10s).
    pub archive_timeout: Duration,

    /// Prefix for a book's `webview_link`.
    pub webview_base_url: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let site_hostname = var("SITE_HOSTNAME").unwrap_or_else(|| "localhost".to_string());

        let site_port = match var("SITE_PORT") {
            Some(v) => v.parse().context("SITE_PORT must be a valid u16")?,
            None => DEFAULT_HTTP_PORT,
        };

        let media_url = var("MEDIA_URL").unwrap_or_else(|| "/media/".to_string());

        let archive_url = var("CNX_ARCHIVE_URL")
            .unwrap_or_else(|| "https://archive.cnx.org".to_string())
            .trim_end_matches('/')
            .to_string();

        let archive_timeout = var("ARCHIVE_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("ARCHIVE_TIMEOUT_SECS must be a whole number of seconds")?;

        let webview_base_url =
            var("WEBVIEW_BASE_URL").unwrap_or_else(|| "https://cnx.org/contents/".to_string());

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            site_hostname,
            site_port,
            media_url,
            archive_url,
            archive_timeout,
            webview_base_url,
            cors_allowed_origins,
        })
    }

    pub fn media_urls(&self) -> MediaUrls {
        MediaUrls::new(
            SiteConfig::new(self.site_hostname.clone(), self.site_port),
            self.media_url.clone(),
        )
    }
}
