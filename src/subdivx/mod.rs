//! subdivx backend: search, comments and archive download

pub mod comments;
pub mod download;
pub mod search;

use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::config::{validate_proxy, Config, RetryPolicy};
use crate::error::Result;
use crate::markup::to_plain_text;
use crate::matching::MatchTier;

pub use download::ArchiveKind;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Timestamp format used by the site
const SITE_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Subtitle search result
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: u64,
    /// Raw site markup
    pub title: String,
    /// Raw site markup
    pub description: String,
    pub downloads: u64,
    pub comment_count: u64,
    pub uploaded_at: Option<NaiveDateTime>,
    pub uploader: String,
    /// Set by the relevance scorer
    pub score: f64,
    /// Set by the result filter
    pub tier: Option<MatchTier>,
}

impl Candidate {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: String::new(),
            downloads: 0,
            comment_count: 0,
            uploaded_at: None,
            uploader: String::new(),
            score: 0.0,
            tier: None,
        }
    }

    pub fn title_text(&self) -> String {
        to_plain_text(&self.title)
    }

    pub fn description_text(&self) -> String {
        to_plain_text(&self.description)
    }

    pub fn uploaded_str(&self) -> String {
        format_datetime(self.uploaded_at)
    }
}

/// One comment on a subtitle
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub author: String,
    pub created_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn created_str(&self) -> String {
        format_datetime(self.created_at)
    }
}

/// Parse a site timestamp; anything malformed is unknown
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), SITE_DATETIME).ok()
}

/// `dd/mm/yyyy HH:MM`, or `--- --` when unknown
pub fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "--- --".to_string())
}

/// The site sends counters either as JSON numbers or as strings
pub(crate) fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

pub(crate) fn de_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// HTTP client with browser headers, the session cookie and optional proxy
pub fn create_client(config: &Config) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = &config.cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(_) => warn!("Ignoring SDX_COOKIE: not a valid header value"),
        }
    }

    let mut builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .default_headers(headers);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(validate_proxy(proxy)?)?);
    }

    builder.build().map_err(Into::into)
}

/// Client for the subdivx AJAX endpoints
#[derive(Debug, Clone)]
pub struct SubdivxClient {
    client: Client,
    base_url: String,
    token: String,
    search_field: String,
    retry: RetryPolicy,
}

impl SubdivxClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            search_field: config.search_field.clone(),
            retry: config.retry.clone(),
        })
    }

    fn ajax_url(&self) -> String {
        format!("{}/inc/ajax.php", self.base_url)
    }
}
