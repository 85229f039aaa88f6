//! Markup to text conversion and tag highlighting

use regex::{Regex, RegexBuilder};
use scraper::{Html, Node};

use crate::metadata::Tags;

/// A run of description text, flagged when it matched one of the file's tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub matched: bool,
}

impl Fragment {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), matched: false }
    }

    fn matched(text: &str) -> Self {
        Self { text: text.to_string(), matched: true }
    }
}

/// Convert site markup into plain text.
///
/// Raw newlines are whitespace like any other, only `<br>` and block
/// elements start new lines. Entities are decoded.
pub fn to_plain_text(markup: &str) -> String {
    if !markup.contains('<') && !markup.contains('&') {
        return collapse_lines(&markup.replace(['\n', '\r'], " "));
    }

    let fragment = Html::parse_fragment(markup);
    let mut out = String::new();

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(&text.replace(['\n', '\r'], " ")),
            Node::Element(el) => match el.name() {
                "br" => out.push('\n'),
                "p" | "div" | "li" if !out.is_empty() => out.push('\n'),
                _ => {}
            },
            _ => {}
        }
    }

    collapse_lines(&out)
}

fn collapse_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Split `text` into fragments, flagging the first case-insensitive
/// occurrence of every tag. Overlapping matches keep the earlier tag.
pub fn highlight(text: &str, tags: &Tags) -> Vec<Fragment> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    for tag in tags.iter_all().filter(|t| !t.is_empty()) {
        let Some(re) = tag_regex(tag) else { continue };
        if let Some(m) = re.find(text) {
            let overlaps = ranges.iter().any(|&(s, e)| m.start() < e && s < m.end());
            if !overlaps {
                ranges.push((m.start(), m.end()));
            }
        }
    }

    ranges.sort_unstable();

    let mut fragments = Vec::new();
    let mut cursor = 0;
    for (start, end) in ranges {
        if start > cursor {
            fragments.push(Fragment::plain(&text[cursor..start]));
        }
        fragments.push(Fragment::matched(&text[start..end]));
        cursor = end;
    }
    if cursor < text.len() {
        fragments.push(Fragment::plain(&text[cursor..]));
    }

    fragments
}

fn tag_regex(tag: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(tag))
        .case_insensitive(true)
        .build()
        .ok()
}
