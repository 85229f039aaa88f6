//! Search query built from a filename or free text
//!
//! Recognises:
//! - "Show.S01E02.720p"      -> episode, number s01e02
//! - "Show.S01.1080p"        -> whole season, number s01
//! - "Show 1x02"             -> episode, number s01e02
//! - "Movie.Title.1999.1080p" -> movie, number (1999)

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::metadata::file_stem;

static SXXEXX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)[\s.]*\bs(\d{1,2})\s*e(\d{1,3})\b").unwrap());

static SEASON_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)[\s.]*\bs(\d{1,2})\b").unwrap());

static NXNN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)[\s.]*\b(\d{1,2})x(\d{2,3})\b").unwrap());

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)[\s.(\[]*\b((?:19|20)\d{2})\b").unwrap());

/// Where the title of a movie without a year ends
static QUALITY_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(2160p|1080p|720p|480p|4k|uhd|hdr|bluray|web|webrip|web-dl|hdtv|dvdrip|brrip|x264|x265|h264)\b")
        .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Movie,
    Episode,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Movie => write!(f, "movie"),
            Kind::Episode => write!(f, "episode"),
        }
    }
}

/// What the operator is looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    /// `s01e02`, `s01`, `(1999)` or empty
    pub number: String,
    pub kind: Kind,
    /// Only a season is targeted, not a specific episode
    pub season_mode: bool,
}

impl SearchQuery {
    pub fn new(title: &str, number: &str, kind: Kind, season_mode: bool) -> Self {
        Self {
            title: title.to_string(),
            number: number.to_string(),
            kind,
            season_mode,
        }
    }

    /// Text sent to the search backend
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.number).trim().to_string()
    }

    /// Heading for the results screen
    pub fn display_title(&self) -> String {
        format!("{} {}", self.title, self.number.to_uppercase()).trim().to_string()
    }
}

/// Replace search separators with spaces
fn clean_search(text: &str) -> String {
    text.replace(['.', '-', '*', ':', ';', ',', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a query from a filename or free-text search.
///
/// `season` forces season mode when a season number is known.
/// `title_override` replaces the guessed title.
pub fn guess_query(search: &str, season: bool, title_override: Option<&str>) -> SearchQuery {
    let stem = file_stem(search);

    let mut query = if let Some(caps) = SXXEXX_RE.captures(&stem) {
        let title = episode_title(&caps[1]);
        let season_no: u32 = caps[2].parse().unwrap_or(0);
        let episode_no: u32 = caps[3].parse().unwrap_or(0);
        if season {
            SearchQuery::new(&title, &format!("s{:02}", season_no), Kind::Episode, true)
        } else {
            SearchQuery::new(
                &title,
                &format!("s{:02}e{:02}", season_no, episode_no),
                Kind::Episode,
                false,
            )
        }
    } else if let Some(caps) = NXNN_RE.captures(&stem).filter(|c| !c[1].trim().is_empty()) {
        let title = episode_title(&caps[1]);
        let season_no: u32 = caps[2].parse().unwrap_or(0);
        let episode_no: u32 = caps[3].parse().unwrap_or(0);
        if season {
            SearchQuery::new(&title, &format!("s{:02}", season_no), Kind::Episode, true)
        } else {
            SearchQuery::new(
                &title,
                &format!("s{:02}e{:02}", season_no, episode_no),
                Kind::Episode,
                false,
            )
        }
    } else if let Some(caps) = SEASON_ONLY_RE.captures(&stem).filter(|c| !c[1].trim().is_empty()) {
        let title = episode_title(&caps[1]);
        let season_no: u32 = caps[2].parse().unwrap_or(0);
        SearchQuery::new(&title, &format!("s{:02}", season_no), Kind::Episode, true)
    } else if let Some(caps) = YEAR_RE.captures(&stem).filter(|c| !c[1].trim().is_empty()) {
        let title = clean_search(&caps[1]);
        SearchQuery::new(&title, &format!("({})", &caps[2]), Kind::Movie, false)
    } else {
        let head = match QUALITY_BOUNDARY_RE.find(&stem) {
            Some(m) if m.start() > 0 => &stem[..m.start()],
            _ => stem.as_str(),
        };
        SearchQuery::new(&clean_search(head), "", Kind::Movie, false)
    };

    if let Some(title) = title_override {
        query.title = title.trim().to_string();
    }

    query
}

/// Episode titles keep a trailing year as `Title (year)`
fn episode_title(raw: &str) -> String {
    let cleaned = clean_search(raw);
    match YEAR_RE.captures(&cleaned) {
        Some(caps) if !caps[1].trim().is_empty() => {
            format!("{} ({})", clean_search(&caps[1]), &caps[2])
        }
        _ => cleaned,
    }
}
