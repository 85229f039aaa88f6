//! Search, filter and rank, plus resolving what the operator asked for

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SubdxError};
use crate::filter::filter;
use crate::metadata::{Tags, VIDEO_EXTENSIONS};
use crate::query::SearchQuery;
use crate::scoring::score;
use crate::subdivx::{Candidate, SubdivxClient};

/// Terminal lines kept for chrome around the results table
pub const RESULTS_OFFSET: u16 = 10;
/// Terminal lines kept for chrome around the comments table
pub const COMMENTS_OFFSET: u16 = 15;

const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ssa", "ass", "sub"];

/// Filter and score search results.
///
/// An empty filter result becomes `NoSuitable`; it is never replaced with
/// the unfiltered set.
pub fn rank(query: &SearchQuery, candidates: Vec<Candidate>, tags: &Tags) -> Result<Vec<Candidate>> {
    let found = candidates.len();
    let filtered = filter(query, candidates);
    debug!("Filtered {} of {} results for {}", filtered.len(), found, query.display_title());

    if filtered.is_empty() {
        return Err(SubdxError::NoSuitable(query.display_title()));
    }
    Ok(score(filtered, tags))
}

/// Search the backend for `query` and rank what comes back
pub async fn find_subtitles(client: &SubdivxClient, query: &SearchQuery, tags: &Tags) -> Result<Vec<Candidate>> {
    let candidates = client.search(&query.search_text()).await?;
    rank(query, candidates, tags)
}

/// Rows per page for a terminal `lines` tall.
///
/// Falls back to the full height when the chrome does not fit, honours the
/// `--lines` cap and never returns 0.
pub fn row_budget(lines: u16, offset: u16, cap: Option<usize>) -> usize {
    let rows = match lines.saturating_sub(offset) {
        0 => lines as usize,
        rows => rows as usize,
    };
    cap.map_or(rows, |cap| rows.min(cap)).max(1)
}

/// One video file waiting for a subtitle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub video: PathBuf,
    /// File name used to guess the query and the tags
    pub name: String,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Free text search
    Search(String),
    /// Video files, from a single path or a directory
    Files(Vec<Job>),
}

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Subtitle files already sitting next to `video`
pub fn existing_subtitles(video: &Path) -> Vec<PathBuf> {
    SUBTITLE_EXTENSIONS
        .iter()
        .map(|ext| video.with_extension(ext))
        .filter(|p| p.is_file())
        .collect()
}

/// Decide what `search` names.
///
/// Videos that already have a subtitle are skipped; with `force` the old
/// subtitle is deleted and the video is kept. Without `out_dir` each job
/// writes next to its video.
pub fn resolve_target(search: &str, out_dir: Option<&Path>, force: bool) -> Result<Target> {
    let path = Path::new(search);

    let videos = if path.is_dir() {
        let mut videos: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_video(p))
            .collect();
        videos.sort();
        debug!("Found {} videos in {}", videos.len(), path.display());
        videos
    } else if path.is_file() && is_video(path) {
        vec![path.to_path_buf()]
    } else {
        return Ok(Target::Search(search.to_string()));
    };

    let mut jobs = Vec::with_capacity(videos.len());
    for video in videos {
        let existing = existing_subtitles(&video);
        if !existing.is_empty() {
            if !force {
                info!("Subtitle already exists, skipping: {}", video.display());
                continue;
            }
            for sub in existing {
                info!("Removing existing subtitle: {}", sub.display());
                fs::remove_file(&sub)?;
            }
        }

        let name = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => video.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        jobs.push(Job { video, name, out_dir: dir });
    }

    Ok(Target::Files(jobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Kind;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_row_budget() {
        assert_eq!(row_budget(40, RESULTS_OFFSET, None), 30);
        assert_eq!(row_budget(8, RESULTS_OFFSET, None), 8);
        assert_eq!(row_budget(40, RESULTS_OFFSET, Some(5)), 5);
        assert_eq!(row_budget(0, COMMENTS_OFFSET, None), 1);
        assert_eq!(row_budget(40, COMMENTS_OFFSET, Some(0)), 1);
    }

    #[test]
    fn test_rank_reports_nothing_suitable() {
        let query = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        let err = rank(&query, vec![Candidate::new(1, "Else")], &Tags::default()).unwrap_err();
        assert!(matches!(err, SubdxError::NoSuitable(ref t) if t == "Show S01E02"));
    }

    #[test]
    fn test_rank_scores_filtered() {
        let query = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        let mut a = Candidate::new(1, "Show s01e02");
        a.downloads = 5;
        let b = Candidate::new(2, "Show s01e02");

        let ranked = rank(&query, vec![a, b, Candidate::new(3, "Else")], &Tags::default()).unwrap();
        assert_eq!(ranked.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ranked[0].score, 0.5);
    }

    #[test]
    fn test_free_text_is_search() {
        let target = resolve_target("the matrix 1999", None, false).unwrap();
        assert_eq!(target, Target::Search("the matrix 1999".to_string()));
    }

    #[test]
    fn test_directory_skips_subtitled_videos() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Show.S01E02.mkv"));
        touch(&dir.path().join("Show.S01E03.MP4"));
        touch(&dir.path().join("Show.S01E03.srt"));
        touch(&dir.path().join("notes.txt"));

        let Target::Files(jobs) = resolve_target(dir.path().to_str().unwrap(), None, false).unwrap() else {
            panic!("expected files");
        };
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Show.S01E02.mkv");
        assert_eq!(jobs[0].out_dir, dir.path());
    }

    #[test]
    fn test_force_removes_existing_subtitle() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("Movie.2019.1080p.mkv");
        touch(&video);
        touch(&dir.path().join("Movie.2019.1080p.srt"));
        let out = tempfile::tempdir().unwrap();

        let target = resolve_target(video.to_str().unwrap(), Some(out.path()), true).unwrap();
        let Target::Files(jobs) = target else { panic!("expected files") };
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].out_dir, out.path());
        assert!(existing_subtitles(&video).is_empty());
    }
}
