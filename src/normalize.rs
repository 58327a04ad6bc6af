//! Address text normalization.
//!
//! Providers disagree on how to treat commas, periods and hyphens, so they are
//! turned into plain separators before a query leaves the engine.

use regex::Regex;
use std::sync::OnceLock;

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,.\-]").expect("valid separator pattern"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Clean a raw address string.
///
/// Commas, periods and hyphens become spaces, whitespace runs collapse to a
/// single space and the result is trimmed. The function is total and
/// idempotent.
pub fn normalize(text: &str) -> String {
    let separated = separator_regex().replace_all(text, " ");
    let collapsed = whitespace_regex().replace_all(&separated, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_replaces() {
        assert_eq!(normalize(" a,  b.c-d "), "a b c d");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n "), "");
        assert_eq!(normalize(",.-"), "");
    }

    #[test]
    fn test_separator_next_to_space() {
        // Replacement must not leave double spaces behind
        assert_eq!(normalize("Main St , Springfield"), "Main St Springfield");
        assert_eq!(normalize("10 - 12 Rue de Rivoli"), "10 12 Rue de Rivoli");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "1600 Amphitheatre Parkway, Mountain View, CA",
            "  Flat 3.,  221-B  Baker St.\tLondon ",
            "東京都千代田区丸の内1-9-1",
            "a , , b",
            "\u{00a0}Straße\u{2003}12 ",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not a fixed point for {sample:?}");
        }
    }

    #[test]
    fn test_keeps_other_punctuation() {
        assert_eq!(normalize("Apt #4/5 (rear)"), "Apt #4/5 (rear)");
    }
}
