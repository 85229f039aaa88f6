//! Release metadata pulled from a video filename
//!
//! Tags feed the relevance scorer and the description highlighter.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Qualities, from flexget's quality list
const QUALITIES: &[&str] = &[
    "1080i", "1080p", "2160p", "8bits", "10bit", "1280x720", "1920x1080", "360p", "368p", "480",
    "480p", "576p", "720i", "720p", "bdrip", "brrip", "bdscr", "bluray", "blurayrip", "cam", "dl",
    "dsrdsrip", "dvb", "dvdrip", "dvdripdvd", "dvdscr", "hdtv", "hr", "ppvrip", "preair",
    "sdtvpdtv", "tvrip", "web", "web-dl", "web-dlwebdl", "webrip", "workprint", "avc",
];

/// Release groups and streaming sources
const KEYWORDS: &[&str] = &[
    "2hd", "adrenaline", "amzn", "asap", "axxo", "compulsion", "crimson", "ctrlhd", "ctu",
    "dimension", "ebp", "gttv", "ettv", "eztv", "fanta", "fov", "fqm", "ftv", "galaxyrg",
    "galaxytv", "hazmatt", "immerse", "internal", "ion10", "killers", "loki", "lol", "mement",
    "minx", "notv", "phoenix", "rarbg", "sfm", "sva", "sparks", "turbo", "torrentgalaxy", "psa",
    "nf", "rrb", "pcok", "edith", "successfulcrab", "megusta", "ethel", "ntb", "flux", "yts",
    "rbb", "xebec", "rubik",
];

const CODECS: &[&str] = &["xvid", "x264", "h264", "x265", "hevc"];

const AUDIO: &[&str] = &["dts-hd", "dts", "ma", "5.1", "ddp5.1", "hdr", "atmos"];

/// Extensions stripped before matching
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "avi", "mkv", "mp4", "mpg", "m4v", "ogv", "vob", "3gp", "part", "temp", "tmp",
];

static SCREEN_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{3,4}[pi]|4k)\b").unwrap());

static VIDEO_CODEC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(x\.?26[45]|h\.?26[45]|hevc|avc|xvid|divx)\b").unwrap());

static AUDIO_CHANNELS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\d.])([257]\.[01])(?:[^\d]|$)").unwrap());

static SOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(web-?dl|web-?rip|blu-?ray|bd-?rip|br-?rip|hdtv|dvd-?rip|hd-?rip)\b").unwrap()
});

static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([A-Za-z0-9]+)(?:\[[^\]]*\])?$").unwrap());

/// Tags guessed from a filename, all lowercase and deduplicated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pub keywords: Vec<String>,
    pub quality: Vec<String>,
    pub codec: Vec<String>,
    pub audio: Vec<String>,
}

impl Tags {
    /// Every tag, keywords first
    pub fn iter_all(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .chain(&self.quality)
            .chain(&self.codec)
            .chain(&self.audio)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.iter_all().next().is_none()
    }
}

fn base_name(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}

/// Strip directories and a trailing video extension from `filename`
pub fn file_stem(filename: &str) -> String {
    let mut stem = base_name(filename);
    // `movie.mkv.part` style names carry two extensions
    for _ in 0..2 {
        match stem.rsplit_once('.') {
            Some((head, ext)) if VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {
                stem = head;
            }
            _ => break,
        }
    }
    stem.to_string()
}

/// Extract tags from `filename`, appending the user's extra keywords
pub fn extract_tags(filename: &str, extra_keywords: Option<&str>) -> Tags {
    let stem = file_stem(filename);
    let lower = stem.to_lowercase();

    let matching = |options: &[&str]| -> Vec<String> {
        options
            .iter()
            .filter(|o| lower.contains(*o))
            .map(|o| o.to_string())
            .collect()
    };

    let mut tags = Tags {
        keywords: matching(KEYWORDS),
        quality: matching(QUALITIES),
        codec: matching(CODECS),
        audio: matching(AUDIO),
    };

    let has_extension = stem.len() < base_name(filename).len();
    for word in guessed_words(&stem, has_extension) {
        push_unique(&mut tags.keywords, word);
    }

    if let Some(extra) = extra_keywords {
        for word in extra.split_whitespace() {
            push_unique(&mut tags.keywords, word.to_lowercase());
        }
    }

    debug!("Extracted tags from {}: {:?}", filename, tags);
    tags
}

/// Screen size, video codec, audio channels, release group and source
/// read out of the name. Codec and source lose their dots and dashes.
///
/// A trailing `-word` is only a release group when the name looks like a
/// release: it had a video extension or carries a size, codec or source.
/// Plain titles such as `Spider-Man` keep their last word.
fn guessed_words(stem: &str, has_extension: bool) -> Vec<String> {
    let clean = |s: &str| s.replace(['.', '-'], "").to_lowercase();
    let mut words = Vec::new();

    let screen_size = SCREEN_SIZE_RE.captures(stem).and_then(|c| c.get(1));
    let codec = VIDEO_CODEC_RE.captures(stem).and_then(|c| c.get(1));
    let source = SOURCE_RE.captures(stem).and_then(|c| c.get(1));
    let is_release = has_extension || screen_size.is_some() || codec.is_some() || source.is_some();

    if let Some(m) = screen_size {
        words.push(m.as_str().to_lowercase());
    }
    if let Some(m) = codec {
        words.push(clean(m.as_str()));
    }
    if let Some(m) = AUDIO_CHANNELS_RE.captures(stem).and_then(|c| c.get(1)) {
        words.push(m.as_str().to_string());
    }
    if is_release {
        if let Some(m) = GROUP_RE.captures(stem).and_then(|c| c.get(1)) {
            words.push(m.as_str().to_lowercase());
        }
    }
    if let Some(m) = source {
        words.push(clean(m.as_str()));
    }

    words
}

fn push_unique(list: &mut Vec<String>, word: String) {
    if !word.is_empty() && !list.contains(&word) {
        list.push(word);
    }
}
