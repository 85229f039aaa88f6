//! Runtime configuration from the environment and `.env` files

use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SubdxError};

pub const DEFAULT_BASE_URL: &str = "https://www.subdivx.com";

static PROXY_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[\w.-]+(?::\d{1,5})?/?$").unwrap());

static PROXY_IP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:25[0-5]|2[0-4]\d|1?\d?\d)(?:\.(?:25[0-5]|2[0-4]\d|1?\d?\d)){3}:\d{1,5}$")
        .unwrap()
});

/// Directory holding `.env` and the log file
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subdx"))
}

/// Load `.env` from the working directory, falling back to the config directory
pub fn load_env() {
    if dotenvy::dotenv().is_err() {
        if let Some(dir) = config_dir() {
            dotenvy::from_path(dir.join(".env")).ok();
        }
    }
}

/// Backoff and pause timings for the HTTP backend
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra search attempts when the site answers with an empty page
    pub attempts: u32,
    /// Backoff delay is `backoff_factor * 2^attempts`
    pub backoff_factor: Duration,
    /// Pause between download servers
    pub download_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff_factor: Duration::from_secs(2),
            download_pause: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// No waiting at all, for tests against a local server
    pub fn immediate() -> Self {
        Self {
            attempts: 2,
            backoff_factor: Duration::ZERO,
            download_pause: Duration::ZERO,
        }
    }

    pub fn backoff(&self, attempts: u32) -> Duration {
        self.backoff_factor * 2u32.saturating_pow(attempts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    /// Anti-bot token sent with every search
    pub token: String,
    /// Suffix the site appends to the `buscar` form field
    pub search_field: String,
    pub cookie: Option<String>,
    pub proxy: Option<String>,
    /// Upper bound on rows per page
    pub lines: Option<usize>,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            search_field: String::new(),
            cookie: None,
            proxy: None,
            lines: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Read `SDX_*` variables; unset ones keep their defaults
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

        let config = Self {
            base_url: var("SDX_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: var("SDX_TOKEN").unwrap_or_default(),
            search_field: var("SDX_SEARCH_FIELD").unwrap_or_default(),
            cookie: var("SDX_COOKIE"),
            proxy: var("SDX_PROXY"),
            lines: var("SDX_LINES").and_then(|l| l.parse().ok()),
            retry: RetryPolicy::default(),
        };

        debug!(
            "Config: base_url={} token_set={} cookie_set={} proxy={:?}",
            config.base_url,
            !config.token.is_empty(),
            config.cookie.is_some(),
            config.proxy
        );
        config
    }

    /// Config pointing at `base_url` with no waiting, for tests
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::immediate(),
            ..Self::default()
        }
    }
}

/// Check a proxy setting and return it as a URL.
///
/// Accepts `http://host:port`, `https://host:port` or `IP:PORT`; the bare
/// form gets an `http://` prefix.
pub fn validate_proxy(proxy: &str) -> Result<String> {
    let proxy = proxy.trim();
    if PROXY_URL_RE.is_match(proxy) {
        Ok(proxy.to_string())
    } else if PROXY_IP_RE.is_match(proxy) {
        Ok(format!("http://{}", proxy))
    } else {
        Err(SubdxError::InvalidProxy(proxy.to_string()))
    }
}
