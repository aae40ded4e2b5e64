#[cfg(test)]
#[path = "text_test.rs"]
mod tests;

/// Strips spaces and tabs before every line terminator (`\n`, `\r`, U+2028,
/// U+2029) and at the end of the text, then collapses runs of `\n` into one.
pub fn normalize(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut pending = String::new();

    for c in text.chars() {
        match c {
            ' ' | '\t' => pending.push(c),
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                pending.clear();
                if c == '\n' && res.ends_with('\n') {
                    continue;
                }
                res.push(c);
            }
            _ => {
                res.push_str(&pending);
                pending.clear();
                res.push(c);
            }
        }
    }

    return res;
}

/// Splits `text` so the first part holds at most `max_chars` chars, cutting
/// at the last newline inside that window when there is one. The newline
/// stays at the head of the remainder. Without a newline the cut is exactly
/// `max_chars`.
///
/// `first + rest == text` always holds. A `max_chars` of zero cuts at zero.
pub fn split_at_nearest_newline(text: &str, max_chars: usize) -> (&str, &str) {
    let window_end = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return (text, ""),
    };

    let split_idx = text[..window_end].rfind('\n').unwrap_or(window_end);

    return text.split_at(split_idx);
}
