//! `clidoc` parses command lines the way you document them: the help text
//! IS the grammar.
//!
//! Write a conventional help message — a `usage:` section enumerating the
//! invocation forms, an `options:` section describing the flags — and hand
//! it to [`Usage`]. The library lifts those sections out of the text,
//! compiles the usage lines into a pattern tree (sequences, alternations,
//! optional groups, repetitions), resolves the argv against the declared
//! options, and matches the two, producing one value per documented name.
//!
//! ```
//! use clidoc::{ParseOutput, Usage, Value};
//!
//! const DOC: &str = "
//! Naval Fate.
//!
//! Usage:
//!   naval_fate ship new <name>...
//!   naval_fate ship shoot <x> <y>
//!   naval_fate mine (set|remove) <x> <y> [--moored|--drifting]
//!   naval_fate -h | --help
//!   naval_fate --version
//!
//! Options:
//!   -h --help     Show this screen.
//!   --version     Show version.
//!   --moored      Moored (anchored) mine.
//!   --drifting    Drifting mine.
//! ";
//!
//! let usage = Usage::new(DOC).version("Naval Fate 2.0");
//!
//! match usage.parse(["ship", "new", "Guardian", "Defiant"]).unwrap() {
//!     ParseOutput::Args(args) => {
//!         assert!(args.flag("ship"));
//!         assert!(args.flag("new"));
//!         assert_eq!(args.list("<name>"), ["Guardian", "Defiant"]);
//!         assert_eq!(args.get("--moored"), Some(&Value::Flag(false)));
//!     }
//!     ParseOutput::Printable(_) => unreachable!(),
//! }
//!
//! // `--version` was configured, so it intercepts before matching.
//! match usage.parse(["--version"]).unwrap() {
//!     ParseOutput::Printable(text) => assert_eq!(text, "Naval Fate 2.0"),
//!     ParseOutput::Args(_) => unreachable!(),
//! }
//! ```
//!
//! # Conventions recognized in the help text
//!
//! * The `usage:` header is found case-insensitively at the start of a
//!   line; the section runs through the following indented lines. Exactly
//!   one such section must exist.
//! * Within a usage line: `[...]` is optional, `(...)` required, `|`
//!   alternates, a trailing `...` repeats, and the literal `[options]`
//!   stands for every flag of the `options:` sections not already named.
//! * Positional arguments are `<angle bracketed>` or `UPPERCASE`; any other
//!   word is a literal command.
//! * Option descriptions start with `-`; their flag signature ends at the
//!   first run of two spaces. `-s, --long=VALUE` forms unify the short and
//!   long spellings into one option, and a case-insensitive
//!   `[default: ...]` inside the description supplies its default.
//! * On the command line, long options match by unique prefix, short
//!   options cluster (`-abc`), and values attach with `=`, with a space, or
//!   glued to a short flag.
//!
//! # Errors
//!
//! Failures split by blame ([`Error`]): a [user error](Error::User) means
//! the argv does not fit the documented grammar and displays as the error
//! message followed by the usage section; a
//! [language error](Error::Language) means the help text itself is broken
//! and should be fixed by the developer, not shown to the user.
#![deny(missing_docs)]

mod argv;
mod constant;
mod error;
mod grammar;
mod matcher;
mod model;
mod parser;
mod pattern;
mod tokens;

pub use error::Error;
pub use model::{ArgMap, Value};
pub use parser::{ParseOutput, Usage};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            assert!(
                $base.contains($sub),
                "'{b}' does not contain '{s}'",
                b = $base,
                s = $sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
