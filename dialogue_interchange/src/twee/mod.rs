//! Twee script parser - splits a passage-linked dialogue script into passages.
//!
//! Parsing steps:
//! 1. **Comments**: `<!-- ... -->` blocks are removed from the whole text
//! 2. **Passages**: the text is split on `::` header lines
//! 3. **Headers**: trailing `{...}` metadata and surrounding quotes are stripped;
//!    story-shell headers (`StoryTitle`, `StoryData`, ...) are dropped
//! 4. **Lines**: the body becomes trimmed, non-empty lines with inline `{...}`
//!    directives removed
//! 5. **Choices**: every `[[...]]` token in the body becomes a [`ParsedChoice`]
//!    on the passage's branch node
//!
//! Parsing never fails. Anything that does not look like dialogue is either
//! dropped or carried through as plain text.

mod choice;

pub use choice::*;

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// Passage titles that configure the story shell rather than hold dialogue.
pub const RESERVED_HEADERS: &[&str] = &[
    "StoryTitle",
    "StorySubtitle",
    "StoryAuthor",
    "StoryMenu",
    "StorySettings",
    "StoryIncludes",
    "StoryData",
    "UserStylesheet",
    "UserScript",
    "stylesheet",
    "script",
];

/// Suffix of the id given to a passage's branch node.
pub const BRANCH_ID_SUFFIX: &str = "_branch";

/// Id of the branch node built for a passage.
pub fn branch_id_for(title: &str) -> String {
    format!("{}{}", title, BRANCH_ID_SUFFIX)
}

/// A choice harvested from a passage body, waiting for its target to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChoice {
    pub choice_text: String,
    /// Title of the passage the choice leads to.
    pub next_id: String,
    /// Id of the branch node that owns the choice.
    pub branch_id: String,
    pub port_index: usize,
}

/// One passage of the script. Lives only between parsing and graph building.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPassage {
    pub title: String,
    pub lines: Vec<String>,
    pub choices: Vec<ParsedChoice>,
}

impl ParsedPassage {
    /// Index of the first line holding a choice token.
    ///
    /// Sequential dialogue stops at this line even if more lines follow.
    pub fn branch_line(&self) -> Option<usize> {
        self.lines.iter().position(|l| has_choice_token(l))
    }

    /// Lines that form the linear chain before the branch (or all lines).
    pub fn chain_lines(&self) -> &[String] {
        match self.branch_line() {
            Some(end) => &self.lines[..end],
            None => &self.lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A dialogue line split into speaker and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
}

/// Split `Speaker: Text` on the first colon. Without a colon the speaker is empty.
pub fn parse_dialogue_line(line: &str) -> DialogueLine {
    match line.split_once(':') {
        Some((speaker, text)) => DialogueLine {
            speaker: speaker.trim().to_string(),
            text: strip_directives(text),
        },
        None => DialogueLine {
            speaker: String::new(),
            text: line.trim().to_string(),
        },
    }
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<!--[\s\S]*?-->").expect("comment regex must compile"))
}

fn header_split_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*::\s*").expect("header regex must compile"))
}

fn header_metadata_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\{[\s\S]*\}\s*$").expect("metadata regex must compile"))
}

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*?\}").expect("directive regex must compile"))
}

/// Remove block comments from the whole script.
pub fn strip_comments(text: &str) -> String {
    comment_regex().replace_all(text, "").into_owned()
}

/// Remove inline `{...}` directives and trim the result.
pub fn strip_directives(line: &str) -> String {
    directive_regex().replace_all(line, "").trim().to_string()
}

/// Normalise a header line into a passage title.
///
/// Returns `None` for empty and reserved titles.
pub fn parse_header(header: &str) -> Option<String> {
    let header = header_metadata_regex().replace(header.trim(), "");
    let mut title = header.trim();
    if title.len() >= 2 && title.starts_with('"') && title.ends_with('"') {
        title = &title[1..title.len() - 1];
    }
    if title.is_empty() || RESERVED_HEADERS.contains(&title) {
        return None;
    }
    Some(title.to_string())
}

/// Split a passage body into trimmed, non-empty, directive-free lines.
pub fn body_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(strip_directives)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Collect the choices of a passage.
///
/// Tokens are harvested from every line of the body, not only the branch
/// line, and numbered in the order they appear.
fn harvest_choices(title: &str, lines: &[String]) -> Vec<ParsedChoice> {
    let branch_id = branch_id_for(title);
    lines
        .iter()
        .flat_map(|line| choice_links(line))
        .enumerate()
        .map(|(port_index, link)| ParsedChoice {
            choice_text: link.label,
            next_id: link.target,
            branch_id: branch_id.clone(),
            port_index,
        })
        .collect()
}

/// Parse a full script into passages, preserving input order.
pub fn parse_passages(text: &str) -> Vec<ParsedPassage> {
    let text = strip_comments(text);
    let mut passages = Vec::new();

    for raw in header_split_regex().split(&text) {
        let chunk = raw.trim();
        if chunk.is_empty() {
            continue;
        }

        let (header, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
        let Some(title) = parse_header(header) else {
            debug!(header = header.trim(), "skipped passage header");
            continue;
        };

        let lines = body_lines(body);
        let choices = harvest_choices(&title, &lines);
        debug!(
            title = %title,
            lines = lines.len(),
            choices = choices.len(),
            "parsed passage"
        );

        passages.push(ParsedPassage {
            title,
            lines,
            choices,
        });
    }

    passages
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
:: StoryTitle
The Lantern

:: StoryData
{
  "ifid": "D674C58C-DEFA-4F70-B7A2-27742230C0FC"
}

:: Start {"position":"100,100"}
Guide: Welcome, traveller.
You hear a creak.{(set: $creak to true)}
[["Open the door"->Door]] [[Cellar<-Go down]]

:: Door
Guide: It's dark inside.

:: Cellar
"#;

    #[test]
    fn test_parse_passages_skips_reserved() {
        let passages = parse_passages(SCRIPT);
        let titles: Vec<_> = passages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Start", "Door", "Cellar"]);
    }

    #[test]
    fn test_story_title_never_produces_passage() {
        let passages = parse_passages(":: StoryTitle\nGuide: hello\n[[Somewhere]]");
        assert!(passages.is_empty());
    }

    #[test]
    fn test_header_metadata_and_directives_stripped() {
        let passages = parse_passages(SCRIPT);
        let start = &passages[0];
        assert_eq!(start.title, "Start");
        assert_eq!(start.lines[1], "You hear a creak.");
    }

    #[test]
    fn test_choices_harvested_in_order() {
        let passages = parse_passages(SCRIPT);
        let start = &passages[0];
        assert_eq!(start.branch_line(), Some(2));
        assert_eq!(start.chain_lines().len(), 2);
        assert_eq!(start.choices.len(), 2);

        assert_eq!(start.choices[0].choice_text, "Open the door");
        assert_eq!(start.choices[0].next_id, "Door");
        assert_eq!(start.choices[0].port_index, 0);
        assert_eq!(start.choices[1].choice_text, "Go down");
        assert_eq!(start.choices[1].next_id, "Cellar");
        assert_eq!(start.choices[1].branch_id, "Start_branch");
        assert_eq!(start.choices[1].port_index, 1);
    }

    #[test]
    fn test_empty_body_passage() {
        let passages = parse_passages(SCRIPT);
        let cellar = &passages[2];
        assert!(cellar.is_empty());
        assert!(cellar.choices.is_empty());
    }

    #[test]
    fn test_comments_removed_before_split() {
        let text = "<!--\n:: Hidden\nnot here\n-->\n:: Shown\nline";
        let passages = parse_passages(text);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].title, "Shown");
    }

    #[test]
    fn test_quoted_and_indented_header() {
        let passages = parse_passages("   :: \"A Title\" {\"size\":\"100,100\"}\r\nHello\r\n");
        assert_eq!(passages[0].title, "A Title");
        assert_eq!(passages[0].lines, ["Hello"]);
    }

    #[test]
    fn test_choices_collected_from_all_lines() {
        let text = ":: Hub\n[[A]]\nNarrator: after the branch\n[[B]]";
        let passages = parse_passages(text);
        let hub = &passages[0];
        assert_eq!(hub.branch_line(), Some(0));
        assert!(hub.chain_lines().is_empty());
        let targets: Vec<_> = hub.choices.iter().map(|c| c.next_id.as_str()).collect();
        assert_eq!(targets, ["A", "B"]);
    }

    #[test]
    fn test_parse_dialogue_line() {
        let line = parse_dialogue_line("Guide: Time: now");
        assert_eq!(line.speaker, "Guide");
        assert_eq!(line.text, "Time: now");

        let line = parse_dialogue_line("Just narration");
        assert_eq!(line.speaker, "");
        assert_eq!(line.text, "Just narration");
    }

    #[test]
    fn test_empty_title_skipped() {
        let passages = parse_passages(":: {\"position\":\"1,1\"}\nOrphan body");
        assert!(passages.is_empty());
    }
}
