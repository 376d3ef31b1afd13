//! Text normalization for matching and previews

/// Lowercase and strip every whitespace character.
///
/// Used for equality checks only: `"( C )"` and `"(c)"` both become `"(c)"`.
pub fn norm(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Collapse runs of whitespace to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed text cut to at most `width` characters
pub fn preview(text: &str, width: usize) -> String {
    let collapsed = collapse_whitespace(text);
    match collapsed.char_indices().nth(width) {
        Some((end, _)) => collapsed[..end].to_string(),
        None => collapsed,
    }
}
