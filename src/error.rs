use thiserror::Error;

/// The ways a parse can fail.
///
/// The three kinds carry different blame: [`Error::User`] means the argv does
/// not fit a well-formed grammar, [`Error::Language`] means the help text
/// itself is defective, and [`Error::Internal`] means the library reached a
/// state it never should.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed argv against a well-formed grammar.
    ///
    /// `Display` renders the message followed by the usage section, so the
    /// error is directly printable to the user who mistyped the invocation.
    #[error("{}", user_output(.message, .usage))]
    User {
        /// What was wrong with the invocation; empty for a plain mismatch.
        message: String,
        /// The `usage:` section of the help text.
        usage: String,
    },

    /// Defective help text: missing or duplicate `usage:` header, unmatched
    /// bracket, trailing tokens. This is a bug in the program, not in the
    /// invocation; wrappers promote it to a panic.
    #[error("{0}")]
    Language(String),

    /// An internal inconsistency.
    #[error("{0}")]
    Internal(String),
}

fn user_output(message: &str, usage: &str) -> String {
    format!("{message}\n{usage}").trim().to_string()
}

impl Error {
    /// Attach the usage section to a user error raised before the
    /// orchestrator knew it. Other kinds pass through untouched.
    pub(crate) fn with_usage(self, usage: &str) -> Self {
        match self {
            Error::User { message, .. } => Error::User {
                message,
                usage: usage.to_string(),
            },
            other => other,
        }
    }
}
