use std::collections::BTreeMap;

#[cfg(feature = "debug")]
use tracing::debug;

use crate::argv;
use crate::constant::{HELP_LONG, HELP_SHORT, VERSION_LONG};
use crate::error::Error;
use crate::grammar::{options, section, usage};
use crate::matcher;
use crate::model::{ArgMap, Value};
use crate::pattern::{difference, unique, Leaf};
use crate::tokens::{ErrorKind, TokenStream};

/// What a successful [`Usage::parse`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutput {
    /// The argv matched one of the usage patterns.
    Args(ArgMap),
    /// A help or version flag fired; print this text and stop. No
    /// dictionary is produced.
    Printable(String),
}

/// A help text plus the behavioural switches of the parser built from it.
///
/// The document is parsed anew on every [`Usage::parse`] call; the builder
/// holds no derived state, so one `Usage` may serve many argv vectors.
#[derive(Debug, Clone)]
pub struct Usage {
    doc: String,
    help: bool,
    version: Option<String>,
    options_first: bool,
}

impl Usage {
    /// Wrap a help text. Interception of `-h`/`--help` starts enabled;
    /// version interception starts disabled.
    pub fn new(doc: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            help: true,
            version: None,
            options_first: false,
        }
    }

    /// Enable or disable `-h`/`--help` interception.
    pub fn help(mut self, help: bool) -> Self {
        self.help = help;
        self
    }

    /// Enable `--version` interception with the given version string.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Stop option parsing at the first positional argument, so everything
    /// after it passes through verbatim.
    pub fn options_first(mut self, options_first: bool) -> Self {
        self.options_first = options_first;
        self
    }

    /// Parse an argv vector (without the program name) against the help
    /// text.
    ///
    /// Returns the matched dictionary, the help/version text to print, or
    /// an error: [`Error::User`] when the invocation does not fit the
    /// grammar (its `Display` is ready to print), [`Error::Language`] when
    /// the help text itself is broken.
    pub fn parse<I, S>(&self, argv: I) -> Result<ParseOutput, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        self.parse_tokens(argv)
    }

    /// Like [`Usage::parse`], but prints and exits for every outcome a user
    /// should see: help/version text exits `0`, a user error prints the
    /// message with the usage section and exits `1`. Language and internal
    /// errors are returned for the program to handle.
    pub fn parse_or_exit<I, S>(&self, argv: I) -> Result<ArgMap, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.parse(argv) {
            Ok(ParseOutput::Args(args)) => Ok(args),
            Ok(ParseOutput::Printable(text)) => {
                println!("{text}");
                std::process::exit(0);
            }
            Err(error @ Error::User { .. }) => {
                println!("{error}");
                std::process::exit(1);
            }
            Err(error) => Err(error),
        }
    }

    /// Parse the process argv. Prints and exits like
    /// [`Usage::parse_or_exit`], and panics on a defective help text so the
    /// mistake is caught in development.
    pub fn parse_env(&self) -> ArgMap {
        let argv: Vec<String> = std::env::args().skip(1).collect();
        match self.parse_or_exit(argv) {
            Ok(args) => args,
            Err(Error::Language(message)) => panic!("(language) {message}"),
            Err(error) => panic!("(internal) {error}"),
        }
    }

    fn parse_tokens(&self, argv: Vec<String>) -> Result<ParseOutput, Error> {
        let usage_sections = section::usage_sections(&self.doc);
        if usage_sections.is_empty() {
            return Err(Error::Language(
                "\"usage:\" (case-insensitive) not found.".to_string(),
            ));
        }
        if usage_sections.len() > 1 {
            return Err(Error::Language(
                "More than one \"usage:\" (case-insensitive).".to_string(),
            ));
        }
        let usage_section = &usage_sections[0];

        let mut options = options::parse_defaults(&self.doc);
        let mut pattern = usage::parse_pattern(&usage::formal_usage(usage_section), &mut options)
            .map_err(|error| error.with_usage(usage_section))?;
        #[cfg(feature = "debug")]
        {
            debug!(
                declared = options.len(),
                "built the pattern tree from the usage section"
            );
        }

        let mut argv_stream = TokenStream::new(argv, ErrorKind::User);
        let argv_leaves = argv::parse_argv(&mut argv_stream, &mut options, self.options_first)
            .map_err(|error| error.with_usage(usage_section))?;
        #[cfg(feature = "debug")]
        {
            debug!(leaves = argv_leaves.len(), "parsed argv");
        }

        // `[options]` stands for everything declared in `options:` that the
        // usage line does not name itself. The declarations are re-read from
        // the document: the index may have grown synthesized entries by now.
        let explicit = unique(pattern.usage_options());
        let declared = unique(options::parse_defaults(&self.doc));
        pattern.expand_options_shortcuts(&difference(&declared, &explicit));

        if let Some(text) = self.extras(&argv_leaves) {
            return Ok(ParseOutput::Printable(text));
        }

        pattern.fix();

        if let Some((left, collected)) = matcher::match_pattern(&pattern, &argv_leaves, &[]) {
            if left.is_empty() {
                let mut entries = BTreeMap::new();
                for leaf in pattern.leaves() {
                    entries.insert(leaf.name().to_string(), leaf.value.clone());
                }
                for leaf in &collected {
                    entries.insert(leaf.name().to_string(), leaf.value.clone());
                }
                #[cfg(feature = "debug")]
                {
                    debug!(names = entries.len(), "matched");
                }
                return Ok(ParseOutput::Args(ArgMap::new(entries)));
            }
        }

        Err(Error::User {
            message: String::new(),
            usage: usage_section.clone(),
        })
    }

    /// The help/version interception: decided on the flat argv leaves,
    /// before matching, so it fires even when the rest of the invocation is
    /// incomplete.
    fn extras(&self, argv_leaves: &[Leaf]) -> Option<String> {
        if self.help {
            let asked = argv_leaves.iter().any(|leaf| {
                (leaf.name() == HELP_SHORT || leaf.name() == HELP_LONG)
                    && leaf.value == Value::Flag(true)
            });
            if asked {
                return Some(self.doc.trim_matches('\n').to_string());
            }
        }

        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            let asked = argv_leaves
                .iter()
                .any(|leaf| leaf.name() == VERSION_LONG && leaf.value == Value::Flag(true));
            if asked {
                return Some(version.to_string());
            }
        }

        None
    }
}
