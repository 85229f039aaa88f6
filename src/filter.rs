//! Result filtering by match tier

use tracing::debug;

use crate::matching::{Classifier, MatchTier};
use crate::query::{Kind, SearchQuery};
use crate::subdivx::Candidate;

/// Candidates grouped by tier, in input order
#[derive(Debug, Default)]
struct Buckets {
    full: Vec<Candidate>,
    pattern: Vec<Candidate>,
    partial: Vec<Candidate>,
    any: Vec<Candidate>,
}

impl Buckets {
    fn classify(query: &SearchQuery, candidates: Vec<Candidate>) -> Self {
        let classifier = Classifier::new(query);
        let mut buckets = Buckets::default();

        for mut candidate in candidates {
            let tier = classifier.classify(&candidate.title);
            candidate.tier = Some(tier);
            match tier {
                MatchTier::Full => buckets.full.push(candidate),
                MatchTier::Pattern => buckets.pattern.push(candidate),
                MatchTier::Partial => buckets.partial.push(candidate),
                MatchTier::Any => buckets.any.push(candidate),
                MatchTier::None => {}
            }
        }

        debug!(
            "Tiers: full={} pattern={} partial={} any={}",
            buckets.full.len(),
            buckets.pattern.len(),
            buckets.partial.len(),
            buckets.any.len()
        );
        buckets
    }

    fn combine(self, query: &SearchQuery) -> Vec<Candidate> {
        let Buckets { full, pattern, partial, any } = self;

        match query.kind {
            Kind::Movie => {
                if !full.is_empty() || !pattern.is_empty() {
                    [full, pattern].concat()
                } else if !partial.is_empty() {
                    partial
                } else {
                    any
                }
            }
            Kind::Episode if query.season_mode => {
                if !partial.is_empty() {
                    [full, partial].concat()
                } else {
                    [full, pattern].concat()
                }
            }
            Kind::Episode => {
                if !full.is_empty() {
                    full
                } else if !partial.is_empty() {
                    partial
                } else if !pattern.is_empty() {
                    pattern
                } else {
                    any
                }
            }
        }
    }
}

/// Keep the candidates that best match `query`, newest id first.
///
/// A movie query without a number has nothing to match against and keeps
/// every candidate. An empty result means nothing was suitable.
pub fn filter(query: &SearchQuery, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut filtered = if query.kind == Kind::Movie && query.number.trim().is_empty() {
        candidates
    } else {
        Buckets::classify(query, candidates).combine(query)
    };

    filtered.sort_by(|a, b| b.id.cmp(&a.id));
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(candidates: &[Candidate]) -> Vec<u64> {
        candidates.iter().map(|c| c.id).collect()
    }

    fn batch(titles: &[(u64, &str)]) -> Vec<Candidate> {
        titles.iter().map(|(id, t)| Candidate::new(*id, t)).collect()
    }

    #[test]
    fn test_movie_without_number_keeps_all() {
        let q = SearchQuery::new("Amelie", "", Kind::Movie, false);
        let out = filter(&q, batch(&[(1, "Amelie"), (3, "Unrelated"), (2, "Other")]));
        assert_eq!(ids(&out), vec![3, 2, 1]);
        assert!(out.iter().all(|c| c.tier.is_none()));
    }

    #[test]
    fn test_movie_prefers_full_and_pattern() {
        let q = SearchQuery::new("The Matrix", "(1999)", Kind::Movie, false);
        let out = filter(
            &q,
            batch(&[
                (1, "The Matrix (1999)"),
                (2, "The Matrix 1999 BluRay"),
                (3, "The Matrix Reloaded 2003"),
                (4, "Matrix 1999"),
            ]),
        );
        assert_eq!(ids(&out), vec![2, 1]);
    }

    #[test]
    fn test_movie_falls_back_to_partial() {
        let q = SearchQuery::new("The Matrix", "(1999)", Kind::Movie, false);
        let out = filter(&q, batch(&[(1, "Matrix The 1999 remaster"), (2, "Matrix 1999")]));
        assert_eq!(ids(&out), vec![1]);
        assert_eq!(out[0].tier, Some(MatchTier::Partial));
    }

    #[test]
    fn test_movie_falls_back_to_any() {
        let q = SearchQuery::new("The Matrix", "(1999)", Kind::Movie, false);
        let out = filter(&q, batch(&[(5, "Matrix 1999 remaster"), (6, "Nothing")]));
        assert_eq!(ids(&out), vec![5]);
        assert_eq!(out[0].tier, Some(MatchTier::Any));
    }

    #[test]
    fn test_episode_full_only_when_present() {
        let q = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        let out = filter(
            &q,
            batch(&[(1, "Show s01e02"), (2, "Show s01e02 720p"), (3, "Show 1x02")]),
        );
        assert_eq!(ids(&out), vec![1]);
    }

    #[test]
    fn test_episode_prefers_partial_over_pattern() {
        let q = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        let out = filter(&q, batch(&[(2, "Show s01e02 720p"), (3, "Show 1x02"), (4, "Show 1x02 HDTV")]));
        assert_eq!(ids(&out), vec![4, 3]);
    }

    #[test]
    fn test_episode_pattern_then_any() {
        let q = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        let out = filter(&q, batch(&[(2, "Show s01e02 720p"), (9, "Other s01e02")]));
        assert_eq!(ids(&out), vec![2]);

        let q = SearchQuery::new("Big Show", "s01e02", Kind::Episode, false);
        let out = filter(&q, batch(&[(7, "The Show s01e02"), (8, "Nothing")]));
        assert_eq!(ids(&out), vec![7]);
    }

    #[test]
    fn test_season_mode_combines_full_and_partial() {
        let q = SearchQuery::new("Dark", "s02", Kind::Episode, true);
        let out = filter(
            &q,
            batch(&[(1, "Dark s02"), (2, "Dark S02E05"), (3, "Dark Temporada completa season 2")]),
        );
        assert_eq!(ids(&out), vec![3, 1]);

        let out = filter(&q, batch(&[(1, "Dark s02"), (2, "Dark S02E05")]));
        assert_eq!(ids(&out), vec![2, 1]);
    }

    #[test]
    fn test_output_is_subset_without_duplicates() {
        let q = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        let input = batch(&[(5, "Show 1x02"), (1, "Show s01e02"), (3, "x"), (4, "Show s01e02")]);
        let out = filter(&q, input.clone());

        let mut seen = std::collections::HashSet::new();
        for c in &out {
            assert!(input.iter().any(|i| i.id == c.id));
            assert!(seen.insert(c.id));
        }
        assert!(out.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn test_nothing_suitable_is_empty() {
        let q = SearchQuery::new("Show", "s01e02", Kind::Episode, false);
        assert!(filter(&q, batch(&[(1, "Different thing")])).is_empty());
    }
}
