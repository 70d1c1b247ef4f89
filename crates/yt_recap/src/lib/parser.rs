//! # Input & caption parsing
//!
//! Turns raw command line inputs into channel handles / video ids, and WebVTT
//! caption files (as written by yt-dlp) into plain transcript text.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

/// Inline cue markup: `<c>`, `<i>`, `<b>`, voice spans and the per-word
/// `<00:00:01.120>` timestamps of YouTube auto-captions.
static VTT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

const VTT_BLOCK_KEYWORDS: [&str; 4] = ["WEBVTT", "NOTE", "STYLE", "REGION"];

/// Splits the positional inputs on commas.
///
/// Multiple positional words are joined with spaces first, so
/// `yt-recap @a, @b` and `yt-recap "@a,@b"` mean the same thing. Blank items
/// are dropped.
pub fn parse_inputs(raw: &[String]) -> Vec<String> {
    raw.join(" ")
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `meetandrew` and `@meetandrew` both become `@meetandrew`.
pub fn normalize_handle(handle: &str) -> String {
    let handle = handle.trim();
    if handle.starts_with('@') {
        handle.to_string()
    } else {
        format!("@{handle}")
    }
}

/// Converts a WebVTT document to a single line of transcript text.
///
/// Header, `NOTE`, `STYLE` and `REGION` blocks, cue identifiers and cue
/// timings are dropped; inline tags are stripped. Block keywords are only
/// recognised on the first line of a block, and anything after a cue's timing
/// line is caption text. Rolling auto-captions repeat the previous line at the
/// top of every cue, so a line identical to the one before it is skipped.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut block_start = true;
    let mut skipping_block = false;
    let mut in_cue_text = false;

    for line in vtt.lines().map(str::trim) {
        if line.is_empty() {
            block_start = true;
            skipping_block = false;
            in_cue_text = false;
            continue;
        }

        let first_line = std::mem::replace(&mut block_start, false);
        if skipping_block {
            continue;
        }
        if first_line && VTT_BLOCK_KEYWORDS.iter().any(|kw| line.starts_with(kw)) {
            skipping_block = true;
            continue;
        }
        // cue identifier and timing line
        if !in_cue_text {
            in_cue_text = line.contains("-->");
            continue;
        }

        let cleaned = decode_entities(&VTT_TAG_RE.replace_all(line, ""))
            .split_whitespace()
            .join(" ");

        if cleaned.is_empty() || lines.last() == Some(&cleaned) {
            continue;
        }
        lines.push(cleaned);
    }

    lines.join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
