//! Whitespace normalization applied to content before chunking.

/// Trim the input and collapse every whitespace run (spaces, tabs,
/// newlines) into a single ASCII space.
///
/// Total and idempotent: `normalize_text(&normalize_text(s)) == normalize_text(s)`.
///
/// ```rust
/// use repo_agent_core::normalize::normalize_text;
///
/// assert_eq!(normalize_text("Hello   world\n\nTest"), "Hello world Test");
/// ```
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(normalize_text("Hello   world\n\nTest"), "Hello world Test");
        assert_eq!(normalize_text("a\t\tb\r\nc"), "a b c");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(normalize_text("  \n padded \t "), "padded");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain",
            "  leading",
            "multi\n\nline\ttext  here ",
            "unicode\u{00a0}space and  ümlauts",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", s);
        }
    }
}
