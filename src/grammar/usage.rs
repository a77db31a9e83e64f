use crate::constant::{OPTIONS_SHORTCUT, OPTION_BREAK};
use crate::error::Error;
use crate::model::Value;
use crate::pattern::{Leaf, LeafKind, Pattern};
use crate::tokens::{ErrorKind, TokenStream};

/// Turn a `usage:` section into a single formal expression.
///
/// The first token after the header is the program name; every later
/// occurrence of that exact word separates invocation forms, so the whole
/// section reads as one top-level alternation.
pub(crate) fn formal_usage(section: &str) -> String {
    let body = match section.split_once(':') {
        Some((_, body)) => body,
        None => section,
    };
    let mut words = body.split_whitespace();
    let program = words.next().unwrap_or_default();

    let mut formal = String::from("( ");
    for word in words {
        if word == program {
            formal.push_str(") | ( ");
        } else {
            formal.push_str(word);
            formal.push(' ');
        }
    }
    formal.push(')');
    formal
}

/// Parse a formalized usage expression into a pattern tree, growing
/// `options` with any flag the usage line mentions but the `options:`
/// sections never declared.
pub(crate) fn parse_pattern(source: &str, options: &mut Vec<Leaf>) -> Result<Pattern, Error> {
    let mut tokens = TokenStream::from_usage(source);
    let expression = parse_expr(&mut tokens, options)?;

    if tokens.current().is_some() {
        let trailing: Vec<&str> = tokens.remaining().collect();
        return Err(tokens.error(format!("unexpected ending: {}", trailing.join(" "))));
    }

    Ok(Pattern::Required(expression))
}

// expr := seq ( '|' seq )*
fn parse_expr(tokens: &mut TokenStream, options: &mut Vec<Leaf>) -> Result<Vec<Pattern>, Error> {
    let mut sequence = parse_seq(tokens, options)?;
    if tokens.current() != Some("|") {
        return Ok(sequence);
    }

    let mut alternatives = if sequence.len() > 1 {
        vec![Pattern::Required(sequence)]
    } else {
        sequence
    };
    while tokens.current() == Some("|") {
        tokens.advance();
        sequence = parse_seq(tokens, options)?;
        if sequence.len() > 1 {
            alternatives.push(Pattern::Required(sequence));
        } else {
            alternatives.append(&mut sequence);
        }
    }

    if alternatives.len() > 1 {
        Ok(vec![Pattern::Either(alternatives)])
    } else {
        Ok(alternatives)
    }
}

// seq := ( atom [ '...' ] )*
fn parse_seq(tokens: &mut TokenStream, options: &mut Vec<Leaf>) -> Result<Vec<Pattern>, Error> {
    let mut sequence = Vec::default();

    while !matches!(tokens.current(), None | Some("]") | Some(")") | Some("|")) {
        let mut atom = parse_atom(tokens, options)?;
        if tokens.current() == Some("...") {
            let child = if atom.len() == 1 {
                atom.remove(0)
            } else {
                Pattern::Required(atom)
            };
            atom = vec![Pattern::OneOrMore(Box::new(child))];
            tokens.advance();
        }
        sequence.append(&mut atom);
    }

    Ok(sequence)
}

// atom := '(' expr ')' | '[' expr ']' | 'options' | long | shorts
//       | argument | command
fn parse_atom(tokens: &mut TokenStream, options: &mut Vec<Leaf>) -> Result<Vec<Pattern>, Error> {
    let current = match tokens.current() {
        Some(current) => current.to_string(),
        None => return Err(tokens.error("unexpected end of usage expression")),
    };

    match current.as_str() {
        "(" | "[" => {
            tokens.advance();
            let expression = parse_expr(tokens, options)?;
            let (closing, node) = if current == "(" {
                (")", Pattern::Required(expression))
            } else {
                ("]", Pattern::Optional(expression))
            };
            match tokens.advance() {
                Some(token) if token == closing => Ok(vec![node]),
                got => Err(tokens.error(format!(
                    "unmatched '{current}', expected: '{closing}' got: '{}'",
                    got.unwrap_or_default()
                ))),
            }
        }
        OPTIONS_SHORTCUT => {
            tokens.advance();
            Ok(vec![Pattern::OptionsShortcut(Vec::default())])
        }
        token if token.starts_with("--") && token != OPTION_BREAK => parse_long(tokens, options),
        token if token.starts_with('-') && token != "-" && token != OPTION_BREAK => {
            parse_shorts(tokens, options)
        }
        token if is_argument_name(token) => {
            let name = tokens.advance().unwrap_or_default();
            Ok(vec![Pattern::Leaf(Leaf::argument(name, Value::Absent))])
        }
        _ => {
            let name = tokens.advance().unwrap_or_default();
            Ok(vec![Pattern::Leaf(Leaf::command(name, Value::Flag(false)))])
        }
    }
}

// <angle bracketed> or entirely uppercase.
fn is_argument_name(token: &str) -> bool {
    (token.starts_with('<') && token.ends_with('>'))
        || (!token.is_empty() && token.chars().all(char::is_uppercase))
}

/// Resolve a `--long` or `--long=value` token against the option index.
///
/// Exact name matches apply on any stream; unique-prefix abbreviation only
/// applies to argv streams. An unknown flag is synthesized into the index,
/// taking a value exactly when `=` was written.
pub(crate) fn parse_long(
    tokens: &mut TokenStream,
    options: &mut Vec<Leaf>,
) -> Result<Vec<Pattern>, Error> {
    let raw = match tokens.advance() {
        Some(raw) => raw,
        None => return Err(Error::Internal("long option expected".to_string())),
    };
    if !raw.starts_with("--") {
        return Err(Error::Internal(format!(
            "long option '{raw}' doesn't start with --"
        )));
    }

    let (long, mut value) = match raw.split_once('=') {
        Some((long, value)) => (long.to_string(), Some(value.to_string())),
        None => (raw, None),
    };

    let mut similar: Vec<usize> = matching_longs(options, &long, false);
    if tokens.kind() == ErrorKind::User && similar.is_empty() {
        // No exact hit for this invocation; fall back to prefix abbreviation.
        similar = matching_longs(options, &long, true);
    }

    if similar.len() > 1 {
        let candidates: Vec<&str> = similar
            .iter()
            .filter_map(|index| match &options[*index].kind {
                LeafKind::Option { long, .. } => long.as_deref(),
                _ => None,
            })
            .collect();
        return Err(tokens.error(format!(
            "{long} is not a unique prefix: {}?",
            candidates.join(", ")
        )));
    }

    if similar.is_empty() {
        let argcount = u8::from(value.is_some());
        let declared = Leaf::option(None, Some(long.clone()), argcount, Value::Flag(false));
        options.push(declared.clone());

        let leaf = if tokens.kind() == ErrorKind::User {
            let resolved = match value {
                Some(text) if argcount > 0 => Value::Text(text),
                _ => Value::Flag(true),
            };
            Leaf::option(None, Some(long), argcount, resolved)
        } else {
            declared
        };
        return Ok(vec![Pattern::Leaf(leaf)]);
    }

    let mut leaf = options[similar[0]].clone();
    if leaf.argcount() == 0 {
        if value.is_some() {
            return Err(tokens.error(format!("{} must not have an argument", leaf.name())));
        }
    } else if value.is_none() {
        match tokens.current() {
            None | Some(OPTION_BREAK) => {
                return Err(tokens.error(format!("{} requires argument", leaf.name())));
            }
            Some(_) => value = tokens.advance(),
        }
    }

    if tokens.kind() == ErrorKind::User {
        leaf.value = match value {
            Some(text) => Value::Text(text),
            None => Value::Flag(true),
        };
    }

    Ok(vec![Pattern::Leaf(leaf)])
}

fn matching_longs(options: &[Leaf], long: &str, by_prefix: bool) -> Vec<usize> {
    options
        .iter()
        .enumerate()
        .filter(|(_, leaf)| match &leaf.kind {
            LeafKind::Option {
                long: declared, ..
            } => declared.as_deref().is_some_and(|declared| {
                if by_prefix {
                    declared.starts_with(long)
                } else {
                    declared == long
                }
            }),
            _ => false,
        })
        .map(|(index, _)| index)
        .collect()
}

/// Resolve a `-abc` short cluster against the option index, character by
/// character. The remainder of the cluster (or the next token) feeds a
/// value-taking short.
pub(crate) fn parse_shorts(
    tokens: &mut TokenStream,
    options: &mut Vec<Leaf>,
) -> Result<Vec<Pattern>, Error> {
    let raw = match tokens.advance() {
        Some(raw) => raw,
        None => return Err(Error::Internal("short option expected".to_string())),
    };
    if !raw.starts_with('-') || raw.starts_with("--") {
        return Err(Error::Internal(format!(
            "short option '{raw}' doesn't start with -"
        )));
    }

    let mut cluster = raw.trim_start_matches('-').to_string();
    let mut parsed = Vec::default();

    while !cluster.is_empty() {
        let mut characters = cluster.chars();
        let short = format!(
            "-{}",
            characters
                .next()
                .expect("internal error - the cluster loop requires a character")
        );
        cluster = characters.as_str().to_string();

        let similar: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, leaf)| match &leaf.kind {
                LeafKind::Option {
                    short: declared, ..
                } => declared.as_deref() == Some(short.as_str()),
                _ => false,
            })
            .map(|(index, _)| index)
            .collect();

        if similar.len() > 1 {
            return Err(tokens.error(format!(
                "{short} is specified ambiguously {} times",
                similar.len()
            )));
        }

        if similar.is_empty() {
            let declared = Leaf::option(Some(short.clone()), None, 0, Value::Flag(false));
            options.push(declared.clone());

            let leaf = if tokens.kind() == ErrorKind::User {
                Leaf::option(Some(short), None, 0, Value::Flag(true))
            } else {
                declared
            };
            parsed.push(Pattern::Leaf(leaf));
            continue;
        }

        let mut leaf = options[similar[0]].clone();
        let mut value = None;
        if leaf.argcount() > 0 {
            if cluster.is_empty() {
                match tokens.current() {
                    None | Some(OPTION_BREAK) => {
                        return Err(tokens.error(format!("{short} requires argument")));
                    }
                    Some(_) => value = tokens.advance(),
                }
            } else {
                value = Some(cluster.clone());
                cluster.clear();
            }
        }

        if tokens.kind() == ErrorKind::User {
            leaf.value = match value {
                Some(text) => Value::Text(text),
                None => Value::Flag(true),
            };
        }
        parsed.push(Pattern::Leaf(leaf));
    }

    Ok(parsed)
}
