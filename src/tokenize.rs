//! Mode-dependent tokenizer.
//!
//! Source and identifier text is split into camel-case word pieces and
//! lowercased: `fooBarBAZQux` becomes `foo bar baz qux`. Serialized syntax
//! trees are split on whitespace only and keep their case.
//!
//! The camel-case rule finds, left to right, every non-overlapping match of
//! `[A-Z]?[a-z]+|[A-Z]+(?=[A-Z]|$)`. The `regex` crate has no lookahead, so
//! the matcher below walks the bytes directly. Only ASCII letters take part
//! in a match; every other byte is a separator.

use crate::models::Mode;

/// Tokenize `text` according to `mode`.
pub fn tokenize(mode: Mode, text: &str) -> Vec<String> {
    if mode.splits_identifiers() {
        split_identifiers(text)
    } else {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Split text into lowercased camel-case word pieces.
pub fn split_identifiers(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match match_at(bytes, pos) {
            Some(end) => {
                // Match bounds are ASCII, so slicing stays on char boundaries.
                tokens.push(text[pos..end].to_ascii_lowercase());
                pos = end;
            }
            None => pos += 1,
        }
    }

    tokens
}

/// Try both alternatives at `start`; returns the exclusive end of the match.
fn match_at(bytes: &[u8], start: usize) -> Option<usize> {
    // [A-Z]?[a-z]+
    let mut i = start;
    if bytes[i].is_ascii_uppercase() {
        i += 1;
    }
    let lower_end = run_end(bytes, i, |b| b.is_ascii_lowercase());
    if lower_end > i {
        return Some(lower_end);
    }

    // [A-Z]+(?=[A-Z]|$)
    if !bytes[start].is_ascii_uppercase() {
        return None;
    }
    let upper_end = run_end(bytes, start, |b| b.is_ascii_uppercase());
    if at_end(bytes, upper_end) {
        Some(upper_end)
    } else if upper_end - start >= 2 {
        // Backtrack one capital so the lookahead sees an uppercase letter.
        Some(upper_end - 1)
    } else {
        None
    }
}

fn run_end(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut i = from;
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// `$` without multiline: end of input or just before a final newline.
fn at_end(bytes: &[u8], pos: usize) -> bool {
    pos == bytes.len() || (pos + 1 == bytes.len() && bytes[pos] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_camel_and_caps_runs() {
        assert_eq!(
            tokenize(Mode::Src, "fooBarBAZQux"),
            vec!["foo", "bar", "baz", "qux"]
        );
        assert_eq!(
            tokenize(Mode::Ident, "fooBarBAZQux"),
            vec!["foo", "bar", "baz", "qux"]
        );
    }

    #[test]
    fn test_ast_whitespace_split_keeps_case() {
        assert_eq!(tokenize(Mode::Ast, "A B  C"), vec!["A", "B", "C"]);
        assert_eq!(
            tokenize(Mode::Ast, "\tMethodDecl\n  Block "),
            vec!["MethodDecl", "Block"]
        );
    }

    #[test]
    fn test_snake_case_and_digits() {
        assert_eq!(
            split_identifiers("max_heap_size2 = getValue(x1);"),
            vec!["max", "heap", "size", "get", "value", "x"]
        );
    }

    #[test]
    fn test_caps_run_before_lowercase_backtracks() {
        // "ABc": the caps run gives up its last letter to "Bc".
        assert_eq!(split_identifiers("ABc"), vec!["a", "bc"]);
        assert_eq!(split_identifiers("HTTPServer"), vec!["http", "server"]);
    }

    #[test]
    fn test_caps_run_at_end() {
        assert_eq!(split_identifiers("MAX"), vec!["max"]);
        assert_eq!(split_identifiers("MAX\n"), vec!["max"]);
    }

    #[test]
    fn test_caps_run_before_crlf_after_reading() {
        let text = crate::corpus::normalize_newlines("maxValue MAX\r\n");
        assert_eq!(split_identifiers(&text), vec!["max", "value", "max"]);
        let text = crate::corpus::normalize_newlines("MAX\r\n");
        assert_eq!(split_identifiers(&text), vec!["max"]);
    }

    #[test]
    fn test_lone_capital_before_separator_is_dropped() {
        assert_eq!(split_identifiers("AB1"), vec!["a"]);
        assert_eq!(split_identifiers("X = 1;"), Vec::<String>::new());
        assert_eq!(split_identifiers("X"), vec!["x"]);
    }

    #[test]
    fn test_non_ascii_is_separator() {
        assert_eq!(split_identifiers("caféBar"), vec!["caf", "bar"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize(Mode::Src, "").is_empty());
        assert!(tokenize(Mode::Ast, "   ").is_empty());
    }

    proptest! {
        #[test]
        fn prop_identifier_tokens_are_lowercase(text in "\\PC{0,64}") {
            for token in split_identifiers(&text) {
                prop_assert!(!token.is_empty());
                prop_assert!(token.bytes().all(|b| b.is_ascii_lowercase()));
            }
        }

        #[test]
        fn prop_resplitting_joined_tokens_is_idempotent(text in "[A-Za-z0-9_ .()]{0,64}") {
            let once = split_identifiers(&text);
            let twice = split_identifiers(&once.join(" "));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_tokenize_is_deterministic(text in "\\PC{0,64}") {
            for mode in Mode::ALL {
                prop_assert_eq!(tokenize(mode, &text), tokenize(mode, &text));
            }
        }
    }
}
