use std::fmt;
use thiserror::Error;

/// Fatal problems found while reading a mapping file.
///
/// Any of these rejects the whole file; no partial rule set is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A rule line without an arrow, or with nothing on its left side.
    #[error("Invalid mapping at line {line}: {text}")]
    InvalidLine { line: usize, text: String },
}

/// Why a `/body/flags` token could not be compiled.
#[derive(Error, Debug, Clone)]
pub enum PatternError {
    #[error("Invalid flags '{0}': duplicate flag '{1}'")]
    DuplicateFlag(String, char),

    #[error("{0}")]
    Syntax(#[from] regex::Error),
}

/// A pattern token that looked like a regex but failed to compile.
///
/// Not an error: the parser keeps the token as a literal and reports this
/// value through its warning sink.
#[derive(Debug, Clone)]
pub struct RegexRejected {
    pub pattern: String,
    pub reason: PatternError,
}

impl fmt::Display for RegexRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Regex rejected, treating as string literal.\n  Pattern: {}\n  Reason: {}",
            self.pattern, self.reason
        )
    }
}

/// Reasons a path given on the command line cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File does not exist.")]
    Missing,

    #[error("You must select a file, not a folder.")]
    Directory,

    #[error("Invalid file extension. Please use \"{0}\"")]
    Extension(String),
}
