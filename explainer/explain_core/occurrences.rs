/// Counts how often `needle` occurs in `haystack`.
///
/// Non-overlapping matches skip past the whole needle; overlapping matches
/// resume one character after the previous hit. An empty needle matches at
/// every character boundary, giving the character count plus one.
#[must_use]
pub fn occurrences(haystack: &str, needle: &str, allow_overlapping: bool) -> usize {
    if needle.is_empty() {
        return haystack.chars().count() + 1;
    }

    let mut count = 0;
    let mut pos = 0;
    while let Some(offset) = haystack[pos..].find(needle) {
        let hit = pos + offset;
        count += 1;
        pos = if allow_overlapping {
            // Advance by one character, not one byte.
            hit + haystack[hit..].chars().next().map_or(1, char::len_utf8)
        } else {
            hit + needle.len()
        };
    }
    count
}
