//! Replace text in a file using an ordered mapping file.
//!
//! A mapping file holds one `from => to` rule per line. `from` is either a
//! literal string or a `/body/flags` regular expression:
//!
//! ```text
//! # full line comment
//! red => var(--red)
//! /blue/gi => var(--blue)
//! /--theme-(\w+)/g => --color-$1   # trailing comment
//! ```
//!
//! [`mapping::parse_mapping_text`] turns that text into a [`mapping::RuleSet`],
//! [`replacer::apply_replacements`] applies it to some input.

pub mod error;
pub mod mapping;
pub mod pattern;
pub mod render;
pub mod replacer;
pub mod search;

pub use error::{MappingError, PatternError, RegexRejected, ValidationError};
pub use mapping::{
    is_pattern_token, parse_mapping_text, parse_pattern, MappingRule, MappingSyntax, Matcher,
    RuleSet,
};
pub use pattern::{Flags, Pattern};
pub use replacer::{apply_replacements, compute_output};
