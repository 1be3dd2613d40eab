use std::ops::Range;

/// Byte ranges of `text` matched by the query tokens, merged and sorted.
///
/// Each token is matched in a single forward sweep: the token pointer
/// advances only when its next byte equals the current text byte, and a
/// range covering the window that ends at the completion position is
/// reported each time the whole token has been matched. The pointer then
/// resets and the sweep continues, so one token can match several times.
/// Ranges from all tokens are sorted by start and merged when they
/// overlap or touch.
pub fn match_ranges(text: &str, tokens: &[String]) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || tokens.is_empty() {
        return Vec::new();
    }

    let mut ranges: Vec<Range<usize>> = Vec::new();
    for token in tokens {
        let pattern = token.as_bytes();
        if pattern.is_empty() {
            continue;
        }
        let mut j = 0usize;
        for (i, &b) in bytes.iter().enumerate() {
            if b == pattern[j] {
                j += 1;
            }
            if j == pattern.len() {
                let end = i + 1;
                ranges.push(end - pattern.len()..end);
                j = 0;
            }
        }
    }

    ranges.sort_by_key(|range| range.start);
    let mut merged: Vec<Range<usize>> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.end >= range.start => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
