use std::sync::LazyLock;

use regex::Regex;

use crate::grammar::section;
use crate::model::Value;
use crate::pattern::Leaf;

static DEFAULT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[default: (.*)\]").expect("static regex must compile"));

/// Collect every option declared in the document's `options:` sections.
///
/// Each description starts at a line whose first non-blank character is `-`
/// and runs through the following indented lines, so wrapped help text stays
/// attached to its option.
pub(crate) fn parse_defaults(doc: &str) -> Vec<Leaf> {
    let mut defaults = Vec::default();

    for block in section::options_sections(doc) {
        let body = match block.split_once(':') {
            Some((_, body)) => body,
            None => continue,
        };

        let mut description: Option<String> = None;
        for line in body.lines() {
            let stripped = line.trim_start_matches([' ', '\t']);
            if stripped.starts_with('-') {
                if let Some(finished) = description.take() {
                    defaults.push(parse_option(&finished));
                }
                description = Some(stripped.to_string());
            } else if let Some(current) = description.as_mut() {
                current.push('\n');
                current.push_str(line);
            }
        }
        if let Some(finished) = description.take() {
            defaults.push(parse_option(&finished));
        }
    }

    defaults
}

/// Parse one option description into an option leaf.
///
/// The signature ends at the first run of two or more spaces; within it,
/// `,` and `=` read as whitespace. Any non-flag token in the signature means
/// the option takes a value, whose default comes from a case-insensitive
/// `[default: ...]` probe over the help text.
pub(crate) fn parse_option(description: &str) -> Leaf {
    let description = description.trim();
    let (signature, help) = match description.split_once("  ") {
        Some((signature, help)) => (signature, help),
        None => (description, ""),
    };
    let signature = signature.replace([',', '='], " ");

    let mut short = None;
    let mut long = None;
    let mut argcount = 0;
    for token in signature.split_whitespace() {
        if token.starts_with("--") {
            long = Some(token.to_string());
        } else if token.starts_with('-') {
            short = Some(token.to_string());
        } else {
            argcount = 1;
        }
    }

    let value = if argcount > 0 {
        match DEFAULT_VALUE.captures(help) {
            Some(captured) => Value::Text(captured[1].to_string()),
            None => Value::Absent,
        }
    } else {
        Value::Flag(false)
    };

    Leaf::option(short, long, argcount, value)
}
