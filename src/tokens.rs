use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// Which error constructor a failing token stream produces.
///
/// Usage-text streams blame the help text (language errors); argv streams
/// blame the invocation (user errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Language,
    User,
}

/// A cursor over a list of raw tokens, tagged with the error kind any
/// failure while consuming it must carry.
#[derive(Debug, Clone)]
pub(crate) struct TokenStream {
    tokens: VecDeque<String>,
    kind: ErrorKind,
}

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\[\]()|]|\.\.\.)").expect("static regex must compile"));

// Either an <angle bracketed> run (which may contain spaces, and may carry a
// glued non-space prefix) or a plain whitespace-separated token.
static USAGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*<.*?>|\S+").expect("static regex must compile"));

impl TokenStream {
    pub(crate) fn new(tokens: Vec<String>, kind: ErrorKind) -> Self {
        Self {
            tokens: tokens.into(),
            kind,
        }
    }

    /// Tokenize a formalized usage expression.
    ///
    /// `[ ] ( ) |` and `...` separate from their neighbours regardless of
    /// surrounding whitespace; `<angle bracketed>` names survive as single
    /// tokens even when they contain spaces.
    pub(crate) fn from_usage(source: &str) -> Self {
        let padded = PUNCTUATION.replace_all(source, " $1 ");
        let tokens = USAGE_TOKEN
            .find_iter(&padded)
            .map(|token| token.as_str().to_string())
            .collect();
        Self::new(tokens, ErrorKind::Language)
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The token under the cursor, if any.
    pub(crate) fn current(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    /// Consume and return the token under the cursor.
    pub(crate) fn advance(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    /// The not-yet-consumed tokens.
    pub(crate) fn remaining(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Build an error of this stream's kind.
    pub(crate) fn error(&self, message: impl Into<String>) -> Error {
        match self.kind {
            ErrorKind::Language => Error::Language(message.into()),
            // The usage section is attached by the orchestrator.
            ErrorKind::User => Error::User {
                message: message.into(),
                usage: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("prog -v", vec!["prog", "-v"])]
    #[case("( prog [-v] )", vec!["(", "prog", "[", "-v", "]"])]
    #[case("[-a|-b]", vec!["[", "-a", "|", "-b", "]"])]
    #[case("(cmd <x>)...", vec!["(", "cmd", "<x>", ")", "..."])]
    #[case("<x y>", vec!["<x y>"])]
    #[case("go <direction here> [--speed=<km/h>]",
           vec!["go", "<direction here>", "[", "--speed=<km/h>", "]"])]
    #[case("", vec![])]
    fn from_usage_tokenizes(#[case] source: &str, #[case] expected: Vec<&str>) {
        // Execute
        let stream = TokenStream::from_usage(source);

        // Verify
        let tokens: Vec<&str> = stream.remaining().collect();
        assert_eq!(tokens, expected);
        assert_eq!(stream.kind(), ErrorKind::Language);
    }

    #[test]
    fn cursor_advances_in_order() {
        let mut stream = TokenStream::new(
            vec!["a".to_string(), "b".to_string()],
            ErrorKind::User,
        );

        assert_eq!(stream.current(), Some("a"));
        assert_eq!(stream.advance(), Some("a".to_string()));
        assert_eq!(stream.current(), Some("b"));
        assert_eq!(stream.advance(), Some("b".to_string()));
        assert_eq!(stream.current(), None);
        assert_eq!(stream.advance(), None);
    }

    #[test]
    fn error_kind_selects_constructor() {
        let language = TokenStream::new(Vec::default(), ErrorKind::Language);
        assert_matches!(language.error("boom"), Error::Language(_));

        let user = TokenStream::new(Vec::default(), ErrorKind::User);
        assert_matches!(user.error("boom"), Error::User { .. });
    }
}
