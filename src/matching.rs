//! Match classification of candidate titles against a search query
//!
//! A candidate title is tested against an ordered list of rules, strongest
//! first; the first rule that holds decides the tier.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::markup::to_plain_text;
use crate::query::{Kind, SearchQuery};

/// Characters removed from both sides before matching
const SPECIAL_CHARS: &[char] = &['`', '\'', '´', ':', '.', '?'];

static EPISODE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^s(\d{1,3})e(\d{1,4})$").unwrap());

static SEASON_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^s(\d{1,3})$").unwrap());

/// Strength of the textual match between a candidate and the query.
///
/// Variants are declared strongest first, so `Full < Pattern < ... < None`
/// under `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Full,
    Pattern,
    Partial,
    Any,
    None,
}

impl MatchTier {
    pub fn is_match(self) -> bool {
        self != MatchTier::None
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchTier::Full => "full",
            MatchTier::Pattern => "pattern",
            MatchTier::Partial => "partial",
            MatchTier::Any => "any",
            MatchTier::None => "none",
        };
        f.pad(name)
    }
}

/// Remove the characters titles are inconsistently written with
pub fn strip_special(text: &str) -> String {
    text.replace(SPECIAL_CHARS, "")
}

/// Candidate text prepared for the rules
struct Subject<'a> {
    classifier: &'a Classifier,
    text: String,
}

type Rule = fn(&Subject<'_>) -> bool;

/// Evaluated top to bottom, first hit wins
const RULES: &[(MatchTier, Rule)] = &[
    (MatchTier::Full, full_match),
    (MatchTier::Pattern, pattern_match),
    (MatchTier::Partial, title_prefix_match),
    (MatchTier::Partial, all_title_words),
    (MatchTier::Any, any_title_word),
];

/// Regexes for one query, compiled once and reused for every candidate
pub struct Classifier {
    full_text: String,
    pattern: Option<Regex>,
    title_prefix: Option<Regex>,
    title_words: Vec<Regex>,
    number_tokens: Vec<Regex>,
}

impl Classifier {
    pub fn new(query: &SearchQuery) -> Self {
        let title = normalize_spaces(&strip_special(&query.title));
        let number = query.number.trim();

        let full_text = format!("{} {}", title, number).trim().to_lowercase();

        let anchor = match query.kind {
            Kind::Movie => title.as_str(),
            // episodes are titled more loosely, anchor on the first word only
            Kind::Episode => title.split_whitespace().next().unwrap_or(""),
        };
        let literal_number = number
            .split_whitespace()
            .map(|t| regex::escape(strip_parens(t)))
            .collect::<Vec<_>>()
            .join(" ");
        let pattern = build(&format!(
            r"^{}.*{}.*$",
            regex::escape(anchor),
            literal_number
        ));

        let title_prefix = if title.is_empty() {
            None
        } else if title.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
            build(&format!(r"^{}\b", regex::escape(&title)))
        } else {
            build(&format!(r"^{}", regex::escape(&title)))
        };

        let title_words: Vec<Regex> = title.split_whitespace().filter_map(whole_word).collect();
        let number_tokens: Vec<Regex> = number
            .split_whitespace()
            .filter_map(|token| number_token(token, query.season_mode))
            .collect();

        Self {
            full_text,
            pattern,
            title_prefix,
            title_words,
            number_tokens,
        }
    }

    /// Tier for one candidate title (site markup)
    pub fn classify(&self, title_markup: &str) -> MatchTier {
        let subject = Subject {
            classifier: self,
            text: normalize_spaces(&strip_special(&to_plain_text(title_markup))),
        };

        RULES
            .iter()
            .find(|(_, rule)| rule(&subject))
            .map(|(tier, _)| *tier)
            .unwrap_or(MatchTier::None)
    }

    fn number_matches(&self, text: &str) -> bool {
        self.number_tokens.iter().all(|re| re.is_match(text))
    }
}

/// Tier of `title_markup` for `query`
pub fn classify(query: &SearchQuery, title_markup: &str) -> MatchTier {
    Classifier::new(query).classify(title_markup)
}

fn full_match(s: &Subject<'_>) -> bool {
    !s.classifier.full_text.is_empty() && s.text.to_lowercase() == s.classifier.full_text
}

fn pattern_match(s: &Subject<'_>) -> bool {
    s.classifier
        .pattern
        .as_ref()
        .is_some_and(|re| re.is_match(&s.text))
}

fn title_prefix_match(s: &Subject<'_>) -> bool {
    let c = s.classifier;
    c.title_prefix.as_ref().is_some_and(|re| re.is_match(&s.text)) && c.number_matches(&s.text)
}

/// Every title word anywhere, plus the number.
///
/// Alternate titles ("X aka Y") land here too: the "aka" word itself never
/// decides the tier, only the title words and number around it.
fn all_title_words(s: &Subject<'_>) -> bool {
    let c = s.classifier;
    !c.title_words.is_empty()
        && c.title_words.iter().all(|re| re.is_match(&s.text))
        && c.number_matches(&s.text)
}

fn any_title_word(s: &Subject<'_>) -> bool {
    let c = s.classifier;
    c.title_words.iter().any(|re| re.is_match(&s.text)) && c.number_matches(&s.text)
}

fn build(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .ok()
}

fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_parens(token: &str) -> &str {
    token.trim_matches(|c: char| c == '(' || c == ')')
}

/// Whole-word regex for `word`. Punctuation at the edges (a `(1999)` year)
/// is dropped so the word boundaries land on the word itself.
fn whole_word(word: &str) -> Option<Regex> {
    let core = word.trim_matches(|c: char| !c.is_alphanumeric());
    if core.is_empty() {
        build(&regex::escape(word))
    } else {
        build(&format!(r"\b{}\b", regex::escape(core)))
    }
}

/// Regex for one token of the query number.
///
/// `sNNeMM` also accepts `NxMM` and `Season N Episode M`; `sNN` also accepts
/// `Season N`. In season mode anything may follow the token except another
/// digit of the same number.
fn number_token(token: &str, season_mode: bool) -> Option<Regex> {
    let alternatives = if let Some(caps) = EPISODE_TOKEN_RE.captures(token) {
        let season = unpadded(&caps[1]);
        let episode = unpadded(&caps[2]);
        format!(
            r"s0*{s}e0*{e}|0*{s}x0*{e}|season\W*0*{s}\W*episode\W*0*{e}",
            s = season,
            e = episode
        )
    } else if let Some(caps) = SEASON_TOKEN_RE.captures(token) {
        let season = unpadded(&caps[1]);
        format!(r"s0*{s}|season\W*0*{s}", s = season)
    } else {
        let core = strip_parens(token).trim_matches(|c: char| !c.is_alphanumeric());
        if core.is_empty() {
            return None;
        }
        regex::escape(core)
    };

    if season_mode {
        build(&format!(r"\b(?:{})(?:\D|$)", alternatives))
    } else {
        build(&format!(r"\b(?:{})\b", alternatives))
    }
}

/// Number without zero padding, `0` stays `0`
fn unpadded(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(title: &str, number: &str) -> SearchQuery {
        SearchQuery::new(title, number, Kind::Episode, false)
    }

    fn season(title: &str, number: &str) -> SearchQuery {
        SearchQuery::new(title, number, Kind::Episode, true)
    }

    fn movie(title: &str, number: &str) -> SearchQuery {
        SearchQuery::new(title, number, Kind::Movie, false)
    }

    #[test]
    fn test_exact_title_is_full() {
        assert_eq!(classify(&episode("Show", "s01e02"), "Show s01e02"), MatchTier::Full);
        assert_eq!(classify(&episode("Show", "s01e02"), "  <b>SHOW S01E02</b> "), MatchTier::Full);
    }

    #[test]
    fn test_special_chars_are_ignored() {
        let q = episode("Grey's Anatomy", "s05e01");
        assert_eq!(classify(&q, "Greys Anatomy s05e01"), MatchTier::Full);
        assert_eq!(classify(&q, "Grey´s Anatomy: s05e01"), MatchTier::Full);
    }

    #[test]
    fn test_episode_pattern_uses_first_word() {
        let q = episode("The Office", "s02e01");
        assert_eq!(classify(&q, "The Office US s02e01 720p"), MatchTier::Pattern);
        assert_eq!(classify(&q, "The Oficina s02e01"), MatchTier::Pattern);
    }

    #[test]
    fn test_movie_pattern_uses_full_title() {
        let q = movie("The Matrix", "(1999)");
        assert_eq!(classify(&q, "The Matrix (1999)"), MatchTier::Full);
        assert_eq!(classify(&q, "The Matrix 1999 BluRay"), MatchTier::Pattern);
        assert_ne!(classify(&q, "The Animatrix 1999"), MatchTier::Pattern);
    }

    #[test]
    fn test_verbose_episode_with_aka_is_partial() {
        let q = episode("Show", "s01e02");
        assert_eq!(
            classify(&q, "Show Season 1 Episode 2 aka The Thing"),
            MatchTier::Partial
        );
    }

    #[test]
    fn test_aka_does_not_change_the_tier() {
        let q = episode("Doctor Who", "s01e01");
        assert_eq!(classify(&q, "Who is the Doctor aka Rose 1x01"), MatchTier::Partial);
        assert_eq!(classify(&q, "Who is the Doctor Rose 1x01"), MatchTier::Partial);
        assert_eq!(classify(&q, "Strange Doctor aka Rose s01e01"), MatchTier::Any);
        assert_eq!(classify(&q, "Doctor Who aka s01e02"), MatchTier::None);
    }

    #[test]
    fn test_nxnn_numbering_is_partial() {
        let q = episode("Friends", "s03e14");
        assert_eq!(classify(&q, "Friends 3x14 The One with Phoebe"), MatchTier::Partial);
    }

    #[test]
    fn test_title_words_anywhere_is_partial() {
        let q = episode("Doctor Who", "s01e01");
        assert_eq!(classify(&q, "Serie: Who is the Doctor 1x01"), MatchTier::Partial);
    }

    #[test]
    fn test_single_title_word_is_any() {
        let q = episode("Doctor Who", "s01e01");
        assert_eq!(classify(&q, "Strange Doctor s01e01"), MatchTier::Any);
    }

    #[test]
    fn test_wrong_episode_is_none() {
        let q = episode("Show", "s01e02");
        assert_eq!(classify(&q, "Show s01e03"), MatchTier::None);
        assert_eq!(classify(&q, "Show s01e20"), MatchTier::None);
        assert_eq!(classify(&q, "Completely unrelated"), MatchTier::None);
    }

    #[test]
    fn test_season_mode_accepts_trailing_episode() {
        let q = season("Dark", "s02");
        assert_eq!(classify(&q, "Dark s02"), MatchTier::Full);
        assert_eq!(classify(&q, "Dark S02E05 WEB-DL"), MatchTier::Pattern);
        assert_eq!(classify(&q, "Dark Temporada 2 season 2"), MatchTier::Partial);
        assert_eq!(classify(&q, "Dark s12"), MatchTier::None);
    }

    #[test]
    fn test_year_in_episode_title() {
        let q = episode("Doctor Who (2005)", "s01e01");
        assert_eq!(classify(&q, "Doctor Who (2005) s01e01"), MatchTier::Full);
        assert_eq!(classify(&q, "Doctor Who 2005 1x01 Rose"), MatchTier::Partial);
    }

    #[test]
    fn test_full_also_satisfies_pattern() {
        let q = episode("Show", "s01e02");
        let c = Classifier::new(&q);
        let pattern = c.pattern.as_ref().unwrap();
        assert!(pattern.is_match("Show s01e02"));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let q = episode("Show", "s01e02");
        let c = Classifier::new(&q);
        for text in ["Show s01e02", "Show 1x02", "Other", "Show aka s01e02"] {
            assert_eq!(c.classify(text), c.classify(text));
            assert_eq!(c.classify(text), classify(&q, text));
        }
    }

    #[test]
    fn test_number_never_loosens_the_tier() {
        // Full is exact equality, so adding the number may only promote to Full
        let cases = [
            (movie("The Matrix", "(1999)"), movie("The Matrix", "")),
            (episode("Show", "s01e02"), episode("Show", "")),
            (season("Dark", "s02"), season("Dark", "")),
        ];
        let titles = [
            "The Matrix (1999)",
            "The Matrix 1999 BluRay",
            "The Matrix Reloaded 2003",
            "Matrix The 1999 remaster",
            "Matrix 1999",
            "The Matrix",
            "Show s01e02",
            "Show 1x02",
            "Other s01e02",
            "Dark S02E05",
            "Dark",
            "Nothing at all",
        ];

        for (with_number, without_number) in &cases {
            for title in titles {
                let with = classify(with_number, title);
                let without = classify(without_number, title);
                assert!(
                    with == MatchTier::Full || with >= without,
                    "{:?}: {} with number, {} without",
                    title,
                    with,
                    without
                );
            }
        }
    }

    #[test]
    fn test_tier_ordering() {
        assert!(MatchTier::Full < MatchTier::Pattern);
        assert!(MatchTier::Partial < MatchTier::Any);
        assert!(!MatchTier::None.is_match());
    }
}
