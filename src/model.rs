use std::collections::BTreeMap;

/// The value a matched argument, command, or option resolves to.
///
/// Which variant a name carries is decided by the usage grammar: a command or
/// a zero-argument option is a [`Value::Flag`] unless it repeats, in which
/// case it counts occurrences as a [`Value::Count`]; a positional argument or
/// a valued option is a [`Value::Text`] unless it repeats, in which case it
/// accumulates a [`Value::List`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// The name never matched and has no default.
    Absent,
    /// Presence of a command or a zero-argument option.
    Flag(bool),
    /// Occurrence count of a repeatable command or zero-argument option.
    Count(usize),
    /// A single string value.
    Text(String),
    /// Accumulated values of a repeatable argument or option.
    List(Vec<String>),
}

impl Value {
    /// Whether the name never matched and has no default.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Truthiness: present-and-non-empty.
    pub fn as_flag(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::Flag(flag) => *flag,
            Value::Count(count) => *count > 0,
            Value::Text(_) => true,
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Occurrence count; a plain `true` flag reads as `1`.
    pub fn as_count(&self) -> usize {
        match self {
            Value::Count(count) => *count,
            Value::Flag(true) => 1,
            _ => 0,
        }
    }

    /// The string value, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The accumulated values; empty for every non-[`Value::List`] variant.
    pub fn as_list(&self) -> &[String] {
        match self {
            Value::List(items) => items,
            _ => &[],
        }
    }
}

/// The dictionary produced by a successful parse: one entry per name declared
/// anywhere in the usage patterns or the option descriptions.
///
/// Keys are display names exactly as they appear in the help text: `<speed>`,
/// `FILE`, `ship`, `--verbose`, `-q`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap(BTreeMap<String, Value>);

impl ArgMap {
    pub(crate) fn new(entries: BTreeMap<String, Value>) -> Self {
        Self(entries)
    }

    /// Look up a declared name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Truthiness of a name; `false` when undeclared.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map(Value::as_flag).unwrap_or(false)
    }

    /// Occurrence count of a name; `0` when undeclared.
    pub fn count(&self, name: &str) -> usize {
        self.get(name).map(Value::as_count).unwrap_or(0)
    }

    /// String value of a name, when it holds one.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Accumulated values of a name; empty when undeclared.
    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).map(Value::as_list).unwrap_or(&[])
    }

    /// The number of declared names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no names were declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}
