//! Display sanitisation for user-controlled text.
//!
//! Session displays, titles and transcript lines come straight from JSONL files written
//! by another program. Before they reach the terminal, ANSI escape sequences and other
//! control characters are removed ([`strip_ansi_codes`]) and Claude's local-command
//! markup is collapsed ([`clean_command_markup`]).

use std::sync::LazyLock;

use regex::Regex;

/// Whole blocks whose content is noise in a preview, removed together with their tags.
static COMMAND_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<(local-command-caveat|command-name|command-message|command-args|local-command-stdout)>.*?</(local-command-caveat|command-name|command-message|command-args|local-command-stdout)>",
    )
    .expect("static regex")
});

/// Any leftover tag.
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

/// Strips ANSI escape codes from a string
///
/// Removes CSI sequences (`ESC [ ... letter`) and every control character except
/// tab, newline and carriage return.
///
/// # Examples
///
/// ```
/// use claude_session_manager::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Removes local-command blocks (`<command-name>…</command-name>` and friends), then
/// any remaining tag, and trims the result.
///
/// ```
/// use claude_session_manager::utils::terminal::clean_command_markup;
///
/// let raw = "<command-name>/clear</command-name><b>hi</b> there";
/// assert_eq!(clean_command_markup(raw), "hi there");
/// ```
pub fn clean_command_markup(content: &str) -> String {
    let without_blocks = COMMAND_BLOCKS.replace_all(content, "");
    ANY_TAG.replace_all(&without_blocks, "").trim().to_string()
}

/// Truncate to at most `max_chars` characters, appending `...` when shortened.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// First line of `text`, sanitised and truncated for a one-line listing.
pub fn one_line(text: &str, max_chars: usize) -> String {
    let first = text.lines().next().unwrap_or_default();
    truncate_chars(&strip_ansi_codes(first), max_chars)
}
