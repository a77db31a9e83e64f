use crate::constant::OPTION_BREAK;
use crate::error::Error;
use crate::grammar::usage::{parse_long, parse_shorts};
use crate::model::Value;
use crate::pattern::{Leaf, Pattern};
use crate::tokens::TokenStream;

/// Parse an argv vector into the flat list of tentative leaves the matcher
/// consumes.
///
/// Options resolve against (and grow) the option index and carry concrete
/// values; every other token becomes an anonymous argument. After the
/// `--` separator, and after the first positional when `options_first` is
/// set, everything is an argument.
pub(crate) fn parse_argv(
    tokens: &mut TokenStream,
    options: &mut Vec<Leaf>,
    options_first: bool,
) -> Result<Vec<Leaf>, Error> {
    let mut parsed = Vec::default();

    loop {
        let current = match tokens.current() {
            Some(current) => current.to_string(),
            None => return Ok(parsed),
        };

        if current == OPTION_BREAK {
            // The separator itself stays, so usage lines may declare it.
            drain_as_arguments(tokens, &mut parsed);
            return Ok(parsed);
        } else if current.starts_with("--") {
            parsed.extend(leaves(parse_long(tokens, options)?));
        } else if current.starts_with('-') && current != "-" {
            parsed.extend(leaves(parse_shorts(tokens, options)?));
        } else if options_first {
            drain_as_arguments(tokens, &mut parsed);
            return Ok(parsed);
        } else {
            let token = tokens
                .advance()
                .expect("internal error - current() promised a token");
            parsed.push(Leaf::argument("", Value::Text(token)));
        }
    }
}

fn drain_as_arguments(tokens: &mut TokenStream, parsed: &mut Vec<Leaf>) {
    while let Some(token) = tokens.advance() {
        parsed.push(Leaf::argument("", Value::Text(token)));
    }
}

fn leaves(patterns: Vec<Pattern>) -> impl Iterator<Item = Leaf> {
    patterns.into_iter().map(|pattern| match pattern {
        Pattern::Leaf(leaf) => leaf,
        branch => unreachable!("internal error - argv resolution produced a branch: {branch:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::options::parse_option;
    use crate::tokens::ErrorKind;
    use rstest::rstest;

    fn user_stream(argv: &[&str]) -> TokenStream {
        TokenStream::new(argv.iter().map(|s| s.to_string()).collect(), ErrorKind::User)
    }

    fn run(argv: &[&str], mut options: Vec<Leaf>, options_first: bool) -> Vec<Leaf> {
        let mut stream = user_stream(argv);
        parse_argv(&mut stream, &mut options, options_first).unwrap()
    }

    #[test]
    fn positionals_become_anonymous_arguments() {
        let parsed = run(&["a", "b"], Vec::default(), false);

        assert_eq!(
            parsed,
            vec![
                Leaf::argument("", Value::Text("a".to_string())),
                Leaf::argument("", Value::Text("b".to_string())),
            ]
        );
    }

    #[test]
    fn declared_switch_resolves_to_true() {
        let parsed = run(&["--all"], vec![parse_option("--all  Everything.")], false);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), "--all");
        assert_eq!(parsed[0].value, Value::Flag(true));
    }

    #[rstest]
    #[case(&["--speed", "10"])]
    #[case(&["--speed=10"])]
    #[case(&["-s10"])]
    #[case(&["-s", "10"])]
    fn valued_option_takes_its_argument(#[case] argv: &[&str]) {
        let options = vec![parse_option("-s, --speed=<kn>  Speed.")];

        let parsed = run(argv, options, false);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), "--speed");
        assert_eq!(parsed[0].value, Value::Text("10".to_string()));
    }

    #[test]
    fn short_cluster_fans_out() {
        let options = vec![parse_option("-a  All."), parse_option("-b  Both.")];

        let parsed = run(&["-ab"], options, false);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name(), "-a");
        assert_eq!(parsed[1].name(), "-b");
        assert_eq!(parsed[0].value, Value::Flag(true));
    }

    #[test]
    fn separator_turns_the_rest_into_arguments() {
        let options = vec![parse_option("--all  Everything.")];

        let parsed = run(&["--", "--all", "x"], options, false);

        // The separator itself is kept as a positional.
        let values: Vec<&Value> = parsed.iter().map(|leaf| &leaf.value).collect();
        assert_eq!(
            values,
            vec![
                &Value::Text("--".to_string()),
                &Value::Text("--all".to_string()),
                &Value::Text("x".to_string()),
            ]
        );
        assert!(parsed.iter().all(Leaf::is_argument));
    }

    #[test]
    fn options_first_freezes_option_parsing_at_the_first_positional() {
        let options = vec![parse_option("--all  Everything.")];

        let parsed = run(&["--all", "x", "--all"], options, true);

        assert_eq!(parsed[0].name(), "--all");
        assert_eq!(parsed[1].value, Value::Text("x".to_string()));
        assert_eq!(parsed[2].value, Value::Text("--all".to_string()));
        assert!(parsed[2].is_argument());
    }

    #[test]
    fn lone_dash_is_a_positional() {
        let parsed = run(&["-"], Vec::default(), false);

        assert_eq!(parsed, vec![Leaf::argument("", Value::Text("-".to_string()))]);
    }

    #[test]
    fn unknown_long_synthesizes_by_equals_sign() {
        let mut options = Vec::default();
        let mut stream = user_stream(&["--moored"]);
        let parsed = parse_argv(&mut stream, &mut options, false).unwrap();

        // Without `=`, the synthesized option is a switch reading true.
        assert_eq!(parsed[0].value, Value::Flag(true));
        assert_eq!(options[0].argcount(), 0);

        let mut options = Vec::default();
        let mut stream = user_stream(&["--speed=10"]);
        let parsed = parse_argv(&mut stream, &mut options, false).unwrap();

        // With `=`, it takes a value.
        assert_eq!(parsed[0].value, Value::Text("10".to_string()));
        assert_eq!(options[0].argcount(), 1);
    }

    #[test]
    fn ambiguous_prefix_is_a_user_error() {
        let mut options = vec![
            parse_option("--foot  One."),
            parse_option("--food  Two."),
        ];
        let mut stream = user_stream(&["--foo"]);

        let result = parse_argv(&mut stream, &mut options, false);

        assert_matches!(
            result,
            Err(Error::User { message, .. })
                if message == "--foo is not a unique prefix: --foot, --food?"
        );
    }

    #[test]
    fn unique_prefix_resolves_to_the_declared_option() {
        let options = vec![parse_option("--foobar  One.")];

        let parsed = run(&["--foo"], options, false);

        assert_eq!(parsed[0].name(), "--foobar");
        assert_eq!(parsed[0].value, Value::Flag(true));
    }

    #[test]
    fn exact_match_beats_a_longer_candidate() {
        let options = vec![
            parse_option("--foo=X  One."),
            parse_option("--foobar=Y  Two."),
        ];

        let parsed = run(&["--foo", "v"], options, false);

        assert_eq!(parsed[0].name(), "--foo");
        assert_eq!(parsed[0].value, Value::Text("v".to_string()));
    }

    #[rstest]
    #[case(&["--speed"], "--speed requires argument")]
    #[case(&["--speed", "--"], "--speed requires argument")]
    fn valued_option_without_argument_is_a_user_error(
        #[case] argv: &[&str],
        #[case] expected: &str,
    ) {
        let mut options = vec![parse_option("--speed=<kn>  Speed.")];
        let mut stream = user_stream(argv);

        let result = parse_argv(&mut stream, &mut options, false);

        assert_matches!(result, Err(Error::User { message, .. }) if message == expected);
    }

    #[test]
    fn switch_with_value_is_a_user_error() {
        let mut options = vec![parse_option("--all  Everything.")];
        let mut stream = user_stream(&["--all=x"]);

        let result = parse_argv(&mut stream, &mut options, false);

        assert_matches!(
            result,
            Err(Error::User { message, .. }) if message == "--all must not have an argument"
        );
    }
}
