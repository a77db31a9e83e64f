use std::sync::LazyLock;

use regex::Regex;

static USAGE_SECTIONS: LazyLock<Regex> = LazyLock::new(|| section_pattern("usage:"));
static OPTIONS_SECTIONS: LazyLock<Regex> = LazyLock::new(|| section_pattern("options:"));

// A section spans the (case-insensitive) header line plus every following
// line that begins with whitespace. A blank line or a flush-left line ends
// it.
fn section_pattern(keyword: &str) -> Regex {
    Regex::new(&format!(
        r"(?im)^[^\n]*{}[^\n]*\n?(?:[ \t].*(?:\n|$))*",
        regex::escape(keyword)
    ))
    .expect("static regex must compile")
}

/// Every `usage:` block of the document, trimmed.
pub(crate) fn usage_sections(doc: &str) -> Vec<String> {
    sections(&USAGE_SECTIONS, doc)
}

/// Every `options:` block of the document, trimmed.
pub(crate) fn options_sections(doc: &str) -> Vec<String> {
    sections(&OPTIONS_SECTIONS, doc)
}

fn sections(pattern: &Regex, doc: &str) -> Vec<String> {
    pattern
        .find_iter(doc)
        .map(|section| section.as_str().trim().to_string())
        .collect()
}
