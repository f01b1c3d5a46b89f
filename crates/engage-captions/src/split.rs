//! Splitting a chat completion into caption candidates.

use engage_core::constants::CAPTION_COUNT;

/// Split a completion into at most three captions.
///
/// Boundaries are blank lines and lines that open a numbered item like
/// `1.`; the numbering prefix itself is stripped. Empty segments are
/// discarded and the first three survivors are returned, in completion
/// order.
pub fn split_captions(text: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut segments);
            continue;
        }
        if starts_numbered_item(line) {
            flush(&mut current, &mut segments);
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    flush(&mut current, &mut segments);

    segments
        .into_iter()
        .map(|segment| strip_number_prefix(&segment).trim().to_string())
        .filter(|segment| !segment.is_empty())
        .take(CAPTION_COUNT)
        .collect()
}

fn flush(current: &mut String, segments: &mut Vec<String>) {
    if !current.trim().is_empty() {
        segments.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn starts_numbered_item(line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(digit), Some('.')) if digit.is_ascii_digit()
    )
}

fn strip_number_prefix(segment: &str) -> &str {
    let trimmed = segment.trim_start();
    if starts_numbered_item(trimmed) {
        trimmed[2..].trim_start()
    } else {
        segment
    }
}
