//! Text helpers for titles and snippets

pub const ELLIPSIS: &str = "...";

/// Collapse runs of whitespace and fit `text` into `width` characters.
///
/// Text that already fits is returned as is. Otherwise whole words are kept
/// while they fit together with a trailing `...`; when not even the first
/// word fits, the text is cut mid-word instead.
pub fn shorten(text: &str, width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(ELLIPSIS.len());
    let mut kept = String::new();
    let mut kept_len = 0;
    for word in collapsed.split(' ') {
        let word_len = word.chars().count();
        let needed = if kept.is_empty() { word_len } else { kept_len + 1 + word_len };
        if needed > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_len = needed;
    }

    if kept.is_empty() {
        kept = collapsed.chars().take(budget).collect();
    }
    kept.push_str(ELLIPSIS);
    kept
}

/// First `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
