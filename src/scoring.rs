//! Relevance scoring of filtered candidates

use std::cmp::Ordering;

use crate::metadata::Tags;
use crate::subdivx::Candidate;

const KEYWORD_WEIGHT: f64 = 0.75;
const QUALITY_WEIGHT: f64 = 0.25;
const CODEC_WEIGHT: f64 = 0.25;
const AUDIO_WEIGHT: f64 = 0.25;
/// Bonus for the most downloaded candidate(s)
const MAX_DOWNLOADS_BONUS: f64 = 0.5;

/// Score every candidate against `tags` and sort best first.
///
/// Tags are matched as case-insensitive substrings of the plain-text
/// description. Every candidate sharing the highest download count gets the
/// bonus.
pub fn score(candidates: Vec<Candidate>, tags: &Tags) -> Vec<Candidate> {
    let max_downloads = candidates.iter().map(|c| c.downloads).max();

    let mut scored: Vec<Candidate> = candidates
        .into_iter()
        .map(|mut candidate| {
            let description = candidate.description_text().to_lowercase();
            let found = |list: &[String]| {
                list.iter()
                    .filter(|t| !t.is_empty() && description.contains(&t.to_lowercase()))
                    .count() as f64
            };

            let mut points = found(&tags.keywords) * KEYWORD_WEIGHT
                + found(&tags.quality) * QUALITY_WEIGHT
                + found(&tags.codec) * CODEC_WEIGHT
                + found(&tags.audio) * AUDIO_WEIGHT;
            if Some(candidate.downloads) == max_downloads {
                points += MAX_DOWNLOADS_BONUS;
            }

            candidate.score = points;
            candidate
        })
        .collect();

    sort_by_relevance(&mut scored);
    scored
}

/// `(score, downloads)` descending; stable for full ties
pub fn by_relevance(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.downloads.cmp(&a.downloads))
}

pub fn sort_by_relevance(candidates: &mut [Candidate]) {
    candidates.sort_by(by_relevance);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, description: &str, downloads: u64) -> Candidate {
        Candidate {
            description: description.to_string(),
            downloads,
            ..Candidate::new(id, "title")
        }
    }

    fn tags() -> Tags {
        Tags {
            keywords: vec!["flux".to_string(), "amzn".to_string()],
            quality: vec!["1080p".to_string()],
            codec: vec!["x265".to_string()],
            audio: vec!["atmos".to_string()],
        }
    }

    #[test]
    fn test_keywords_outweigh_download_bonus() {
        let out = score(
            vec![candidate(1, "Sync FLUX AMZN", 100), candidate(2, "nada", 500)],
            &tags(),
        );

        assert_eq!(out[0].id, 1);
        assert_eq!(out[0].score, 1.5);
        assert_eq!(out[1].id, 2);
        assert_eq!(out[1].score, 0.5);
    }

    #[test]
    fn test_every_tag_kind_counts() {
        let out = score(vec![candidate(1, "<b>1080p</b> x265 ATMOS flux", 0)], &tags());
        // keyword 0.75 + quality, codec, audio 0.25 each + sole max downloads 0.5
        assert_eq!(out[0].score, 2.0);
    }

    #[test]
    fn test_tied_max_downloads_all_get_bonus() {
        let out = score(
            vec![candidate(1, "", 300), candidate(2, "", 300), candidate(3, "", 10)],
            &tags(),
        );
        let scores: Vec<(u64, f64)> = out.iter().map(|c| (c.id, c.score)).collect();
        assert_eq!(scores, vec![(1, 0.5), (2, 0.5), (3, 0.0)]);
    }

    #[test]
    fn test_downloads_break_score_ties() {
        let out = score(
            vec![candidate(1, "flux", 10), candidate(2, "flux", 20), candidate(3, "flux 1080p", 30)],
            &tags(),
        );
        // 3: 0.75 + 0.25 + 0.5; 2 and 1 tie on 0.75
        assert_eq!(out.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_extra_match_never_lowers_score() {
        let base = candidate(1, "720p", 5);
        let richer = candidate(2, "720p x265", 5);
        let out = score(vec![base, richer], &tags());
        let by_id = |id: u64| out.iter().find(|c| c.id == id).unwrap().score;
        assert!(by_id(2) >= by_id(1));
    }

    #[test]
    fn test_empty_input() {
        assert!(score(Vec::new(), &tags()).is_empty());
    }
}
