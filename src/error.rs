//! Error types for the subdx library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubdxError>;

#[derive(Debug, Error)]
pub enum SubdxError {
    /// The backend reported zero records for the query
    #[error("No subtitle records found for: {0}")]
    NoResults(String),

    /// Records came back but none survived filtering
    #[error("No suitable subtitles were found for: \"{0}\"")]
    NoSuitable(String),

    #[error("Site message: {0}")]
    SiteMessage(String),

    #[error("Could not load results page")]
    EmptyResponse,

    #[error("No suitable subtitle download for id {0}")]
    NoArchive(u64),

    #[error("Incorrect proxy setting: {0}. Only http, https or IP:PORT is accepted")]
    InvalidProxy(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubdxError {
    /// True for the conditions the CLI reports as "no suitable subtitles"
    /// and moves on from, rather than aborting a batch.
    pub fn is_no_results(&self) -> bool {
        matches!(
            self,
            SubdxError::NoResults(_) | SubdxError::NoSuitable(_) | SubdxError::SiteMessage(_)
        )
    }
}
