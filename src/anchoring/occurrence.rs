//! Occurrence counting for repeated selections
//!
//! When the user selects text that appears more than once in the document,
//! the annotation records which numbered occurrence was selected instead of
//! an absolute offset. The count is taken over non-overlapping occurrences in
//! document order.

/// Compute which numbered occurrence of `selected_text` a selection refers to
///
/// Counts non-overlapping occurrences of `selected_text` in `document_text`
/// that begin strictly before `selection_start` (a byte offset). If
/// `selection_start` falls inside a match rather than exactly at its start,
/// that match is treated as the found one and the scan stops there.
///
/// Contract: never called for block annotations; `selected_text` must be
/// non-empty.
pub fn occurrence_index(document_text: &str, selected_text: &str, selection_start: usize) -> usize {
    debug_assert!(!selected_text.is_empty(), "occurrence_index requires non-empty selected_text");
    if selected_text.is_empty() {
        return 0;
    }

    let needle_len = selected_text.len();
    let mut count = 0;
    let mut from = 0;

    while let Some(rel) = document_text[from..].find(selected_text) {
        let start = from + rel;
        if start >= selection_start {
            break;
        }
        if selection_start < start + needle_len {
            // Selection starts inside this match: containment, not equality.
            // This match is the one; the scan stops here.
            break;
        }
        count += 1;
        from = start + needle_len;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_occurrence_yields_index_one() {
        // "foo bar foo baz foo": occurrences at 0, 8, 16
        assert_eq!(occurrence_index("foo bar foo baz foo", "foo", 8), 1);
    }

    #[test]
    fn test_first_occurrence_yields_index_zero() {
        assert_eq!(occurrence_index("foo bar foo baz foo", "foo", 0), 0);
    }

    #[test]
    fn test_third_occurrence() {
        assert_eq!(occurrence_index("foo bar foo baz foo", "foo", 16), 2);
    }

    #[test]
    fn test_selection_inside_a_match_stops_the_scan() {
        // Offset 9 falls inside the occurrence at 8; that match counts as
        // found, so only the occurrence at 0 precedes it
        assert_eq!(occurrence_index("foo bar foo baz foo", "foo", 9), 1);
    }

    #[test]
    fn test_occurrences_are_non_overlapping() {
        // "aaaa" contains two non-overlapping "aa" at 0 and 2
        assert_eq!(occurrence_index("aaaa", "aa", 2), 1);
        // Offset 1 is inside the match at 0
        assert_eq!(occurrence_index("aaaa", "aa", 1), 0);
    }

    #[test]
    fn test_selection_past_all_occurrences() {
        assert_eq!(occurrence_index("foo bar", "foo", 7), 1);
    }
}
