//! Text clean-up helpers shared by the converter

use regex::Regex;
use std::sync::LazyLock;

/// Player and sharing widgets that leak into extracted text
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Copy link(?:Facebook|Email|Notes|More|\s)*",
        r"Audio playback is not supported.*?upgrade\.",
        r"\d+:\d+:\d+Current time:.*?Total time:.*?\d+:\d+:\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("BOILERPLATE regex"))
    .collect()
});

/// Bullet or numbered list marker at the start of a trimmed line
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*|\d+\.)(?: |$)").expect("LIST_MARKER regex"));

/// Text that Markdown would read as a heading, quote, list or rule marker
static BLOCK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(?:([#>*+=-])|(\d+)([.)])(\s|$))").expect("BLOCK_MARKER regex")
});

/// Collapse every whitespace run, newlines included, to a single space
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Heading, quote and list markers opening a rendered line
static LINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:#{1,6}|>|\*|\d+\.)(?: |$))*").expect("LINE_PREFIX regex")
});

/// Split a rendered line into its block markers and the text after them
pub fn split_block_prefix(line: &str) -> (&str, &str) {
    let end = LINE_PREFIX.find(line).map_or(0, |m| m.end());
    line.split_at(end)
}

/// Backslash-escape a block marker at the start of a text run
pub fn escape_block_marker(text: &str) -> String {
    BLOCK_MARKER
        .replace(text, |caps: &regex::Captures<'_>| match caps.get(2) {
            Some(marker) => format!("{}\\{}", &caps[1], marker.as_str()),
            None => format!("{}{}\\{}{}", &caps[1], &caps[3], &caps[4], &caps[5]),
        })
        .into_owned()
}

/// Remove known UI boilerplate from a run of text
pub fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

/// Flatten content to one trimmed line
pub fn single_line(text: &str) -> String {
    collapse_whitespace(&strip_boilerplate(&collapse_whitespace(text)))
        .trim()
        .to_string()
}

/// Tidy paragraph content, keeping explicit line breaks
pub fn tidy_block(text: &str) -> String {
    text.split('\n')
        .map(single_line)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

/// Final layout pass over rendered Markdown
///
/// Outside fenced code, runs of blank lines collapse to one, trailing
/// whitespace is dropped and only list lines keep their indentation.
pub fn normalize(markdown: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut fence: Option<String> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if let Some(open) = &fence {
            lines.push(line);
            if trimmed == open.as_str() {
                fence = None;
            }
            continue;
        }

        if trimmed.starts_with("```") {
            fence = Some(trimmed.chars().take_while(|c| *c == '`').collect());
            lines.push(trimmed);
            continue;
        }

        if trimmed.is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push("");
            }
            continue;
        }

        if LIST_MARKER.is_match(trimmed) {
            lines.push(line.trim_end());
        } else {
            lines.push(trimmed);
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
