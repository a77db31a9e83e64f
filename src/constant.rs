pub(crate) const HELP_SHORT: &str = "-h";
pub(crate) const HELP_LONG: &str = "--help";
pub(crate) const VERSION_LONG: &str = "--version";

/// The `options` keyword inside a usage line, standing for every option
/// declared in an `options:` section that the usage line does not name.
pub(crate) const OPTIONS_SHORTCUT: &str = "options";

/// Everything after this argv token is a positional, never an option.
pub(crate) const OPTION_BREAK: &str = "--";
