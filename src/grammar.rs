//! The help-text grammar: section lifting, option descriptions, and the
//! usage-pattern language shared between help text and argv resolution.

pub(crate) mod options;
pub(crate) mod section;
pub(crate) mod usage;
