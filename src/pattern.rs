use crate::model::Value;

/// A single grammar element that consumes one argv token: a positional
/// argument, a literal command word, or an option.
///
/// Leaves compare by their full canonical form (kind, names, and current
/// value). Equal leaves anywhere in a pattern tree denote the same declared
/// name, so a value promotion applies to all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Leaf {
    pub(crate) kind: LeafKind,
    pub(crate) value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum LeafKind {
    /// `<angle bracketed>` or `UPPERCASE` positional.
    Argument { name: String },
    /// A literal word in the usage line.
    Command { name: String },
    /// `-s` and/or `--long`, taking zero or one value.
    Option {
        short: Option<String>,
        long: Option<String>,
        argcount: u8,
    },
}

impl Leaf {
    pub(crate) fn argument(name: impl Into<String>, value: Value) -> Self {
        Self {
            kind: LeafKind::Argument { name: name.into() },
            value,
        }
    }

    pub(crate) fn command(name: impl Into<String>, value: Value) -> Self {
        Self {
            kind: LeafKind::Command { name: name.into() },
            value,
        }
    }

    pub(crate) fn option(
        short: Option<String>,
        long: Option<String>,
        argcount: u8,
        value: Value,
    ) -> Self {
        // A valued option without a declared default starts absent, not false.
        let value = match value {
            Value::Flag(false) if argcount > 0 => Value::Absent,
            other => other,
        };
        Self {
            kind: LeafKind::Option {
                short,
                long,
                argcount,
            },
            value,
        }
    }

    /// The display name: an option shows its long form when it has one.
    pub(crate) fn name(&self) -> &str {
        match &self.kind {
            LeafKind::Argument { name } | LeafKind::Command { name } => name,
            LeafKind::Option { short, long, .. } => long
                .as_deref()
                .or(short.as_deref())
                .unwrap_or_default(),
        }
    }

    pub(crate) fn is_argument(&self) -> bool {
        matches!(self.kind, LeafKind::Argument { .. })
    }

    pub(crate) fn is_option(&self) -> bool {
        matches!(self.kind, LeafKind::Option { .. })
    }

    pub(crate) fn argcount(&self) -> u8 {
        match &self.kind {
            LeafKind::Option { argcount, .. } => *argcount,
            _ => 0,
        }
    }

    /// Switch a repeated leaf to its accumulating initial value: lists for
    /// value-carrying leaves (a text default splits on whitespace), a zero
    /// count for presence leaves.
    fn promote_repeated(&mut self) {
        let valued = match &self.kind {
            LeafKind::Argument { .. } => true,
            LeafKind::Option { argcount, .. } => *argcount > 0,
            LeafKind::Command { .. } => false,
        };

        if valued {
            self.value = match std::mem::replace(&mut self.value, Value::Absent) {
                Value::Text(text) => {
                    Value::List(text.split_whitespace().map(str::to_string).collect())
                }
                Value::List(items) => Value::List(items),
                _ => Value::List(Vec::default()),
            };
        } else {
            self.value = Value::Count(0);
        }
    }
}

/// A node of the usage grammar: a [`Leaf`] or a composition of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pattern {
    Leaf(Leaf),
    /// Children must all match, in order.
    Required(Vec<Pattern>),
    /// Each child may match; failures contribute nothing.
    Optional(Vec<Pattern>),
    /// The `[options]` placeholder; filled with the non-explicit declared
    /// options, then matched like [`Pattern::Optional`].
    OptionsShortcut(Vec<Pattern>),
    /// The child must match at least once.
    OneOrMore(Box<Pattern>),
    /// Exactly one child matches.
    Either(Vec<Pattern>),
}

impl Pattern {
    /// Every leaf of the tree, in pre-order.
    pub(crate) fn leaves(&self) -> Vec<&Leaf> {
        match self {
            Pattern::Leaf(leaf) => vec![leaf],
            Pattern::OneOrMore(child) => child.leaves(),
            Pattern::Required(children)
            | Pattern::Optional(children)
            | Pattern::OptionsShortcut(children)
            | Pattern::Either(children) => children.iter().flat_map(Pattern::leaves).collect(),
        }
    }

    fn leaves_mut(&mut self) -> Vec<&mut Leaf> {
        match self {
            Pattern::Leaf(leaf) => vec![leaf],
            Pattern::OneOrMore(child) => child.leaves_mut(),
            Pattern::Required(children)
            | Pattern::Optional(children)
            | Pattern::OptionsShortcut(children)
            | Pattern::Either(children) => children
                .iter_mut()
                .flat_map(Pattern::leaves_mut)
                .collect(),
        }
    }

    /// The option leaves the usage line references explicitly.
    pub(crate) fn usage_options(&self) -> Vec<Leaf> {
        self.leaves()
            .into_iter()
            .filter(|leaf| leaf.is_option())
            .cloned()
            .collect()
    }

    /// Replace the children of every `[options]` placeholder with `fill`.
    pub(crate) fn expand_options_shortcuts(&mut self, fill: &[Leaf]) {
        match self {
            Pattern::Leaf(_) => {}
            Pattern::OptionsShortcut(children) => {
                *children = fill.iter().cloned().map(Pattern::Leaf).collect();
            }
            Pattern::OneOrMore(child) => child.expand_options_shortcuts(fill),
            Pattern::Required(children)
            | Pattern::Optional(children)
            | Pattern::Either(children) => {
                for child in children {
                    child.expand_options_shortcuts(fill);
                }
            }
        }
    }

    /// Find every leaf that can be consumed more than once on a single
    /// invocation form and switch its initial value to the accumulating
    /// shape, so the matcher counts and collects instead of overwriting.
    pub(crate) fn fix(&mut self) {
        let mut repeated: Vec<Leaf> = Vec::default();
        for group in self.transform_groups() {
            for leaf in group.iter().copied() {
                if group.iter().filter(|other| **other == leaf).count() > 1
                    && !repeated.contains(leaf)
                {
                    repeated.push(leaf.clone());
                }
            }
        }

        for leaf in self.leaves_mut() {
            if repeated.contains(leaf) {
                leaf.promote_repeated();
            }
        }
    }

    /// Expand the tree into its disjunction of conjunctions, purely to
    /// discover repetitions: alternation distributes over its siblings and a
    /// repetition contributes its child twice. The tree itself is untouched.
    /// The expansion is multiplicative in the nesting of alternations, which
    /// is negligible for human-authored usage lines.
    fn transform_groups(&self) -> Vec<Vec<&Leaf>> {
        let mut conjunctions: Vec<Vec<&Leaf>> = Vec::default();
        let mut groups: Vec<Vec<&Pattern>> = vec![vec![self]];

        while let Some(mut group) = groups.pop() {
            let branch = group
                .iter()
                .position(|member| !matches!(member, Pattern::Leaf(_)));

            match branch {
                None => {
                    conjunctions.push(
                        group
                            .into_iter()
                            .map(|member| match member {
                                Pattern::Leaf(leaf) => leaf,
                                _ => unreachable!("internal error - branchless group holds a branch"),
                            })
                            .collect(),
                    );
                }
                Some(position) => {
                    let member = group.remove(position);
                    match member {
                        Pattern::Either(alternatives) => {
                            for alternative in alternatives {
                                let mut next = vec![alternative];
                                next.extend(group.iter().copied());
                                groups.push(next);
                            }
                        }
                        Pattern::OneOrMore(child) => {
                            let mut next: Vec<&Pattern> = vec![child.as_ref(), child.as_ref()];
                            next.extend(group.iter().copied());
                            groups.push(next);
                        }
                        Pattern::Required(children)
                        | Pattern::Optional(children)
                        | Pattern::OptionsShortcut(children) => {
                            let mut next: Vec<&Pattern> = children.iter().collect();
                            next.extend(group.iter().copied());
                            groups.push(next);
                        }
                        Pattern::Leaf(_) => {
                            unreachable!("internal error - position() selected a leaf")
                        }
                    }
                }
            }
        }

        conjunctions
    }
}

/// Drop duplicate leaves, keeping first occurrences in order.
pub(crate) fn unique(leaves: Vec<Leaf>) -> Vec<Leaf> {
    let mut result: Vec<Leaf> = Vec::default();
    for leaf in leaves {
        if !result.contains(&leaf) {
            result.push(leaf);
        }
    }
    result
}

/// Multiset difference: `base` minus one occurrence per element of
/// `subtract`, preserving order.
pub(crate) fn difference(base: &[Leaf], subtract: &[Leaf]) -> Vec<Leaf> {
    let mut pool: Vec<&Leaf> = subtract.iter().collect();
    let mut result = Vec::default();

    for leaf in base {
        match pool.iter().position(|other| *other == leaf) {
            Some(position) => {
                pool.remove(position);
            }
            None => result.push(leaf.clone()),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn flag_option(short: &str) -> Leaf {
        Leaf::option(Some(short.to_string()), None, 0, Value::Flag(false))
    }

    #[test]
    fn option_display_name_prefers_long() {
        let both = Leaf::option(
            Some("-v".to_string()),
            Some("--verbose".to_string()),
            0,
            Value::Flag(false),
        );
        assert_eq!(both.name(), "--verbose");

        let short_only = flag_option("-v");
        assert_eq!(short_only.name(), "-v");
    }

    #[test]
    fn valued_option_without_default_starts_absent() {
        let option = Leaf::option(None, Some("--speed".to_string()), 1, Value::Flag(false));
        assert_eq!(option.value, Value::Absent);

        let with_default = Leaf::option(
            None,
            Some("--speed".to_string()),
            1,
            Value::Text("10".to_string()),
        );
        assert_eq!(with_default.value, Value::Text("10".to_string()));
    }

    #[test]
    fn fix_promotes_one_or_more_argument_to_list() {
        // Usage: prog <f>...
        let mut pattern = Pattern::Required(vec![Pattern::OneOrMore(Box::new(Pattern::Leaf(
            Leaf::argument("<f>", Value::Absent),
        )))]);

        pattern.fix();

        assert_eq!(
            pattern.leaves()[0].value,
            Value::List(Vec::default())
        );
    }

    #[test]
    fn fix_promotes_repeated_option_to_count() {
        // Usage: prog -v -v
        let mut pattern = Pattern::Required(vec![
            Pattern::Leaf(flag_option("-v")),
            Pattern::Leaf(flag_option("-v")),
        ]);

        pattern.fix();

        for leaf in pattern.leaves() {
            assert_eq!(leaf.value, Value::Count(0));
        }
    }

    #[test]
    fn fix_splits_text_default_of_repeated_valued_option() {
        // Usage: prog [--dir=<d>]...  with  [default: ./in ./out]
        let option = Leaf::option(
            None,
            Some("--dir".to_string()),
            1,
            Value::Text("./in ./out".to_string()),
        );
        let mut pattern = Pattern::Required(vec![Pattern::OneOrMore(Box::new(
            Pattern::Optional(vec![Pattern::Leaf(option)]),
        ))]);

        pattern.fix();

        assert_eq!(
            pattern.leaves()[0].value,
            Value::List(vec!["./in".to_string(), "./out".to_string()])
        );
    }

    #[test]
    fn fix_ignores_leaves_on_distinct_alternatives() {
        // Usage: prog (-a | -a -b)
        let mut pattern = Pattern::Required(vec![Pattern::Either(vec![
            Pattern::Leaf(flag_option("-a")),
            Pattern::Required(vec![
                Pattern::Leaf(flag_option("-a")),
                Pattern::Leaf(flag_option("-b")),
            ]),
        ])]);

        pattern.fix();

        // The two -a occurrences live on different alternatives; neither
        // conjunction repeats a leaf, so nothing promotes.
        for leaf in pattern.leaves() {
            assert_eq!(leaf.value, Value::Flag(false));
        }
    }

    #[test]
    fn fix_promotes_leaf_repeated_across_a_conjunction() {
        // Usage: prog -a [-a]
        let mut pattern = Pattern::Required(vec![
            Pattern::Leaf(flag_option("-a")),
            Pattern::Optional(vec![Pattern::Leaf(flag_option("-a"))]),
        ]);

        pattern.fix();

        for leaf in pattern.leaves() {
            assert_eq!(leaf.value, Value::Count(0));
        }
    }

    #[test]
    fn expand_options_shortcuts_fills_every_placeholder() {
        let mut pattern = Pattern::Required(vec![
            Pattern::Optional(vec![Pattern::OptionsShortcut(Vec::default())]),
            Pattern::Leaf(Leaf::argument("<x>", Value::Absent)),
        ]);
        let fill = vec![flag_option("-q"), flag_option("-v")];

        pattern.expand_options_shortcuts(&fill);

        let names: Vec<&str> = pattern.leaves().into_iter().map(Leaf::name).collect();
        assert_eq!(names, vec!["-q", "-v", "<x>"]);
    }

    #[rstest]
    #[case(vec![], vec![])]
    #[case(vec!["-a", "-a", "-b"], vec!["-a", "-b"])]
    #[case(vec!["-b", "-a", "-b"], vec!["-b", "-a"])]
    fn unique_keeps_first_occurrences(
        #[case] shorts: Vec<&str>,
        #[case] expected: Vec<&str>,
    ) {
        let leaves = shorts.into_iter().map(flag_option).collect();

        let names: Vec<String> = unique(leaves)
            .iter()
            .map(|leaf| leaf.name().to_string())
            .collect();

        assert_eq!(names, expected);
    }

    #[test]
    fn difference_removes_single_occurrences() {
        let base = vec![flag_option("-a"), flag_option("-b"), flag_option("-a")];
        let subtract = vec![flag_option("-a")];

        let result = difference(&base, &subtract);

        let names: Vec<&str> = result.iter().map(Leaf::name).collect();
        assert_eq!(names, vec!["-b", "-a"]);
    }
}
