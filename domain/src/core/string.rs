//! String helpers shared by prompt rendering.

/// Shorten `s` to at most `max_chars` characters, marking the cut with `...`.
///
/// Counts characters rather than bytes so Chinese task descriptions are not
/// cut to a third of the length of English ones.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some(_) => {
            let keep = max_chars.saturating_sub(3);
            let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
            format!("{}...", s[..end].trim_end())
        }
    }
}
