//! Shared utility functions

/// Truncate a string for display, appending "..." when shortened.
/// Backs off to a valid char boundary so multi-byte text never panics.
pub fn truncate_for_display(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let suffix = "...";
    let mut end = max_len.saturating_sub(suffix.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_for_display("short", 10), "short");
    }

    #[test]
    fn long_strings_are_shortened_with_ellipsis() {
        assert_eq!(truncate_for_display("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let truncated = truncate_for_display("héllo wörld", 7);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 7);
    }
}
