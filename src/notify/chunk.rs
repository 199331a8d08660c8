//! Word-boundary message chunking.

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Greedy word wrap: each chunk takes as many whole words as fit, so the
/// chunk count matches a word wrap of the same width. Line breaks inside a
/// chunk are kept. Words are never split: a single word longer than
/// `max_chars` becomes its own chunk. Whitespace at chunk boundaries is
/// dropped and whitespace-only input yields no chunks.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        let split = split_index(rest, max_chars);
        let chunk = rest[..split].trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = rest[split..].trim_start();
    }

    chunks
}

/// Byte index where the first chunk of `text` ends; `text` has no leading whitespace
fn split_index(text: &str, max_chars: usize) -> usize {
    let byte_end = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return text.len(),
    };
    // The window already ends on a word boundary
    if text[byte_end..].starts_with(char::is_whitespace) {
        return byte_end;
    }

    text[..byte_end]
        .rfind(char::is_whitespace)
        .filter(|&p| p > 0)
        .unwrap_or_else(|| {
            // The window is one word; run on to the end of it.
            text[byte_end..]
                .find(char::is_whitespace)
                .map_or(text.len(), |offset| byte_end + offset)
        })
}
