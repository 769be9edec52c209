//! Transcript clean-up
//!
//! Interview and podcast pages often lose the line breaks between speaker
//! turns, leaving `HOST: Hi. GUEST: Hello. HOST: ...` in a single paragraph.
//! This pass puts every turn back on its own line.
//!
//! A line is treated as a transcript when it starts with a speaker label and
//! contains at least one more. A label is one or two capitalized words of at
//! most [`MAX_LABEL_WORD_LEN`] characters followed by a colon and a space.
//! Headings, list items, quotes, tables and fenced code are left alone.
//!
//! The pass is best effort and idempotent: once split, every line holds a
//! single label and no longer qualifies.

use regex::Regex;
use std::sync::LazyLock;

/// Longest word accepted inside a speaker label
pub const MAX_LABEL_WORD_LEN: usize = 24;

/// Minimum number of labels on a line before it is split
const MIN_TURNS: usize = 2;

static SPEAKER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    let word = format!(r"\p{{Lu}}[\p{{L}}\p{{N}}.'’-]{{0,{}}}", MAX_LABEL_WORD_LEN - 1);
    Regex::new(&format!(r"(?:^|\s)({word}(?: {word})?):\s", word = word))
        .expect("SPEAKER_LABEL regex")
});

/// Put each speaker turn on its own line
pub fn clean_transcripts(markdown: &str) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        }

        if in_fence || is_structural(trimmed) {
            out.push(line.to_string());
            continue;
        }

        match split_turns(line) {
            Some(turns) => out.push(turns.join("\n\n")),
            None => out.push(line.to_string()),
        }
    }

    out.join("\n")
}

/// Lines whose Markdown role must not change
fn is_structural(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with('>')
        || line.starts_with('|')
        || line.starts_with("```")
        || line.starts_with("* ")
        || line.starts_with("- ")
        || line.split_once(". ").is_some_and(|(n, _)| {
            !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())
        })
}

/// Split a line before every speaker label, or `None` if it is not a transcript
fn split_turns(line: &str) -> Option<Vec<String>> {
    let starts: Vec<usize> = SPEAKER_LABEL
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).map(|m| m.start()))
        .collect();

    if starts.len() < MIN_TURNS || starts.first() != Some(&0) {
        return None;
    }

    let mut turns = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(line.len());
        let turn = line[start..end].trim();
        if !turn.is_empty() {
            turns.push(turn.to_string());
        }
    }
    Some(turns)
}
