//! Choice link tokens: `[[label->Target]]`, `[[Target<-label]]`, `[[Target]]`.

use std::sync::OnceLock;

use regex::Regex;

/// Matches one double-bracketed choice token, capturing its inner text.
pub(crate) fn choice_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").expect("choice token regex must compile"))
}

/// Whether a line contains at least one choice token.
pub fn has_choice_token(line: &str) -> bool {
    choice_token_regex().is_match(line)
}

/// Label and target title resolved from a choice token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceLink {
    pub label: String,
    pub target: String,
}

/// Every choice token on a line, left to right.
pub fn choice_links(line: &str) -> impl Iterator<Item = ChoiceLink> + '_ {
    choice_token_regex()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|inner| parse_choice_inner(inner.as_str()))
}

/// Resolve the text between `[[` and `]]`.
///
/// A forward arrow puts the label before the target, a backward arrow after.
/// Without an arrow the token is both label and target. Arrows nested inside
/// brackets, parentheses or braces are not considered.
pub fn parse_choice_inner(inner: &str) -> ChoiceLink {
    let inner = inner.trim();
    let (label, target) = if let Some(pos) = index_of_unnested(inner, "->") {
        (inner[..pos].trim(), inner[pos + 2..].trim())
    } else if let Some(pos) = index_of_unnested(inner, "<-") {
        (inner[pos + 2..].trim(), inner[..pos].trim())
    } else {
        (inner, inner)
    };

    ChoiceLink {
        label: strip_surrounding_quotes(label).to_string(),
        target: strip_surrounding_quotes(target).to_string(),
    }
}

/// Byte offset of the first occurrence of `token` at nesting depth zero.
///
/// Depth rises on `(`, `[`, `{` and falls (never below zero) on `)`, `]`, `}`.
/// The character at each offset updates the depth before the match is tested.
pub fn index_of_unnested(text: &str, token: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let needle = token.as_bytes();
    if needle.is_empty() || needle.len() > bytes.len() {
        return None;
    }

    let mut depth: usize = 0;
    for i in 0..=bytes.len() - needle.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && &bytes[i..i + needle.len()] == needle {
            return Some(i);
        }
    }
    None
}

/// Remove one layer of matching single or double quotes.
pub fn strip_surrounding_quotes(s: &str) -> &str {
    let s = s.trim();
    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')));
    if quoted {
        s[1..s.len() - 1].trim()
    } else {
        s
    }
}
