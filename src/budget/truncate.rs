use super::tokenizer::Tokenizer;

/// Appended to any text cut by [`truncate`] so readers can tell it was lossy.
pub const TRUNCATION_MARKER: &str = "\n\n[... truncated]";

/// Keeps the first `max_tokens` tokens of `text` and appends
/// [`TRUNCATION_MARKER`]. Text already within budget is returned unchanged.
///
/// The result re-encodes to at most `max_tokens` plus the marker's tokens.
/// It is exactly that sum unless the kept head ends in whitespace, which the
/// marker's leading newlines merge into, leaving it one or more tokens short.
///
/// The head is kept and the tail dropped: titles and opening paragraphs carry
/// most of what downstream prompts need.
pub fn truncate(tokenizer: &Tokenizer, text: &str, max_tokens: usize) -> String {
    let ids = tokenizer.encode(text);
    if ids.len() <= max_tokens {
        return text.to_string();
    }
    let head = tokenizer.decode(&ids[..max_tokens]);
    tracing::debug!(
        tokens = ids.len(),
        kept = max_tokens,
        "truncated text to token budget"
    );
    format!("{head}{TRUNCATION_MARKER}")
}

/// Text together with its token count, guaranteed to fit `max_tokens`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetedText {
    text: String,
    token_count: usize,
    max_tokens: usize,
}

impl BudgetedText {
    /// Fits `text` into `max_tokens`, marker included.
    ///
    /// Room for the marker is taken out of the kept prefix. When the budget is
    /// smaller than the marker itself the text is cut with no marker at all.
    pub fn fit(tokenizer: &Tokenizer, text: &str, max_tokens: usize) -> Self {
        let ids = tokenizer.encode(text);
        if ids.len() <= max_tokens {
            return Self {
                text: text.to_string(),
                token_count: ids.len(),
                max_tokens,
            };
        }

        let marker_tokens = tokenizer.count(TRUNCATION_MARKER);
        let mut fitted = if max_tokens > marker_tokens {
            truncate(tokenizer, text, max_tokens - marker_tokens)
        } else {
            tokenizer.decode(&ids[..max_tokens])
        };

        // Re-encoding at the cut can merge differently; shave until it fits.
        let mut token_count = tokenizer.count(&fitted);
        while token_count > max_tokens {
            let ids = tokenizer.encode(&fitted);
            fitted = tokenizer.decode(&ids[..ids.len() - 1]);
            token_count = tokenizer.count(&fitted);
        }

        Self {
            text: fitted,
            token_count,
            max_tokens,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn is_truncated(&self) -> bool {
        self.text.ends_with(TRUNCATION_MARKER)
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::cl100k().unwrap()
    }

    fn pangram(times: usize) -> String {
        "the quick brown fox jumps over the lazy dog ".repeat(times)
    }

    #[test]
    fn test_within_budget_unchanged() {
        let tok = tokenizer();
        let text = "short readme text";
        assert_eq!(truncate(&tok, text, 100), text);
        assert_eq!(truncate(&tok, text, tok.count(text)), text);
    }

    #[test]
    fn test_empty_text() {
        let tok = tokenizer();
        assert_eq!(truncate(&tok, "", 0), "");
        assert_eq!(truncate(&tok, "", 10), "");
    }

    #[test]
    fn test_truncated_length_is_budget_plus_marker() {
        let tok = tokenizer();
        let text = pangram(50);
        let marker_tokens = tok.count(TRUNCATION_MARKER);

        let result = truncate(&tok, text.trim_end(), 37);
        assert!(result.ends_with(TRUNCATION_MARKER));
        assert_eq!(tok.count(&result), 37 + marker_tokens);
    }

    #[test]
    fn test_trailing_whitespace_merges_into_marker() {
        let tok = tokenizer();
        let text = "hello   world   this   has   runs   of   spaces";
        let marker_tokens = tok.count(TRUNCATION_MARKER);

        let head = tok.decode(&tok.encode(text)[..2]);
        assert!(head.ends_with(' '));

        let result = truncate(&tok, text, 2);
        assert_eq!(result, format!("{head}{TRUNCATION_MARKER}"));
        assert!(tok.count(&result) < 2 + marker_tokens);
    }

    #[test]
    fn test_keeps_leading_tokens() {
        let tok = tokenizer();
        let text = format!("# Project Title\n\nIntro paragraph. {}", pangram(100));
        let result = truncate(&tok, &text, 20);

        let original = tok.encode(&text);
        let kept = tok.encode(&result);
        assert_eq!(&kept[..5], &original[..5]);
        assert!(result.starts_with("# Project Title"));
    }

    #[test]
    fn test_zero_budget_leaves_only_marker() {
        let tok = tokenizer();
        assert_eq!(truncate(&tok, "some text", 0), TRUNCATION_MARKER);
    }

    #[test]
    fn test_fit_within_budget() {
        let tok = tokenizer();
        let fitted = BudgetedText::fit(&tok, "hello world", 10);
        assert_eq!(fitted.text(), "hello world");
        assert_eq!(fitted.token_count(), 2);
        assert!(!fitted.is_truncated());
    }

    #[test]
    fn test_fit_reserves_marker_room() {
        let tok = tokenizer();
        let fitted = BudgetedText::fit(&tok, &pangram(100), 50);
        assert!(fitted.is_truncated());
        assert!(fitted.token_count() <= 50);
        assert_eq!(fitted.max_tokens(), 50);
        assert_eq!(tok.count(fitted.text()), fitted.token_count());
    }

    #[test]
    fn test_fit_budget_smaller_than_marker() {
        let tok = tokenizer();
        let fitted = BudgetedText::fit(&tok, &pangram(10), 2);
        assert!(fitted.token_count() <= 2);
        assert!(!fitted.is_truncated());
    }

    proptest! {
        #[test]
        fn prop_within_budget_is_identity(s in "[a-zA-Z .,\n]{0,300}", slack in 0usize..20) {
            let tok = tokenizer();
            let n = tok.count(&s) + slack;
            prop_assert_eq!(truncate(&tok, &s, n), s);
        }

        #[test]
        fn prop_over_budget_keeps_prefix(s in "[a-zA-Z .,\n]{50,400}", n in 0usize..30) {
            let tok = tokenizer();
            let ids = tok.encode(&s);
            prop_assume!(ids.len() > n);
            let result = truncate(&tok, &s, n);
            let head = tok.decode(&ids[..n]);
            prop_assert!(result.starts_with(&head));
            prop_assert!(result.ends_with(TRUNCATION_MARKER));
            prop_assert!(s.starts_with(&head));
        }

        #[test]
        fn prop_over_budget_token_bound(s in "\\PC{1,200}", n in 0usize..40) {
            let tok = tokenizer();
            let ids = tok.encode(&s);
            prop_assume!(ids.len() > n);
            let marker_tokens = tok.count(TRUNCATION_MARKER);
            let result = truncate(&tok, &s, n);
            prop_assert!(tok.count(&result) <= n + marker_tokens);

            let head = &result[..result.len() - TRUNCATION_MARKER.len()];
            prop_assert_eq!(head, tok.decode(&ids[..n]));
            prop_assert!(s.starts_with(head));
        }

        #[test]
        fn prop_fit_never_exceeds_budget(s in "\\PC{0,300}", n in 0usize..60) {
            let tok = tokenizer();
            let fitted = BudgetedText::fit(&tok, &s, n);
            prop_assert!(tok.count(fitted.text()) <= n);
        }
    }
}
