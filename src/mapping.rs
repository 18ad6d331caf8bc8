use crate::error::{MappingError, RegexRejected};
use crate::pattern::{self, Pattern};
use std::fmt;

/// Left-hand side of a mapping rule
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Matched as exact substring text
    Literal(String),

    /// Matched as a regular expression
    Pattern(Pattern),
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Literal(text) => write!(f, "{}", text),
            Matcher::Pattern(pattern) => write!(f, "{}", pattern),
        }
    }
}

/// One `from => to` line of a mapping file
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    /// What to look for; never an empty literal
    pub from: Matcher,

    /// Replacement text, may contain `$1`-style tokens for pattern rules
    pub to: String,
}

impl MappingRule {
    pub fn literal(from: &str, to: &str) -> Self {
        Self {
            from: Matcher::Literal(from.to_string()),
            to: to.to_string(),
        }
    }

    pub fn pattern(from: Pattern, to: &str) -> Self {
        Self {
            from: Matcher::Pattern(from),
            to: to.to_string(),
        }
    }
}

/// Ordered rules of one mapping file. Each rule sees the output of the
/// previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn iter(&self) -> std::slice::Iter<'_, MappingRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }
}

impl From<Vec<MappingRule>> for RuleSet {
    fn from(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a MappingRule;
    type IntoIter = std::slice::Iter<'a, MappingRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Delimiters and escapes of the mapping file format.
///
/// The defaults describe the `.txt` format:
///
/// ```text
/// # full line comment
/// red => var(--red)  # trailing comment
/// /blue/gi => var(--blue)
/// ; => \s=>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSyntax {
    /// Separates the pattern token from the replacement token
    pub arrow: String,

    /// Starts a trailing comment on a rule line
    pub inline_comment: String,

    /// First non-blank character of a full line comment
    pub line_comment: char,

    /// Turn `\s` into a space in replacements (and `\\s` into `\s`)
    pub unescape_spaces: bool,
}

impl Default for MappingSyntax {
    fn default() -> Self {
        Self {
            arrow: " =>".to_string(),
            inline_comment: " # ".to_string(),
            line_comment: '#',
            unescape_spaces: true,
        }
    }
}

/// Check whether a token is written as `/body/flags`
///
/// # Arguments
/// * `token` - Left-hand token of a mapping line
///
/// # Returns
/// * `bool` - True if the token should be compiled as a regex
pub fn is_pattern_token(token: &str) -> bool {
    pattern::split_token(token).is_some()
}

/// Classify a left-hand token, logging a warning when a regex is rejected
///
/// # Arguments
/// * `token` - Left-hand token of a mapping line
///
/// # Returns
/// * `Matcher` - A compiled pattern, or the token itself as a literal
pub fn parse_pattern(token: &str) -> Matcher {
    parse_pattern_with(token, log_rejected)
}

/// Classify a left-hand token, handing rejected regexes to `on_warning`.
///
/// A token that looks like `/body/flags` but fails to compile is kept as a
/// literal, delimiters and flags included.
pub fn parse_pattern_with(token: &str, mut on_warning: impl FnMut(RegexRejected)) -> Matcher {
    let Some((body, flags)) = pattern::split_token(token) else {
        return Matcher::Literal(token.to_string());
    };

    match Pattern::compile(body, flags) {
        Ok(pattern) => Matcher::Pattern(pattern),
        Err(reason) => {
            on_warning(RegexRejected {
                pattern: token.to_string(),
                reason,
            });
            Matcher::Literal(token.to_string())
        }
    }
}

/// Parse mapping file text into an ordered rule set
///
/// # Arguments
/// * `text` - Full contents of a mapping file
///
/// # Returns
/// * `Result<RuleSet, MappingError>` - The rules, or the first invalid line
pub fn parse_mapping_text(text: &str) -> Result<RuleSet, MappingError> {
    parse_mapping_text_with(text, &MappingSyntax::default(), log_rejected)
}

/// Parse mapping file text with explicit syntax and warning sink.
///
/// Blank lines and comments are skipped. Every other line must contain the
/// arrow with a non-empty token on its left, otherwise the whole text is
/// rejected with the 1-based line number and the line as written.
pub fn parse_mapping_text_with(
    text: &str,
    syntax: &MappingSyntax,
    mut on_warning: impl FnMut(RegexRejected),
) -> Result<RuleSet, MappingError> {
    let mut rules = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(syntax.line_comment) {
            continue;
        }

        let invalid = || MappingError::InvalidLine {
            line: index + 1,
            text: line.to_string(),
        };

        let mapping_part = match line.find(syntax.inline_comment.as_str()) {
            Some(pos) => &line[..pos],
            None => line,
        };

        let (raw_from, raw_to) = mapping_part
            .split_once(syntax.arrow.as_str())
            .ok_or_else(invalid)?;

        let token = raw_from.trim();
        if token.is_empty() {
            return Err(invalid());
        }

        let from = parse_pattern_with(token, &mut on_warning);
        let raw_to = raw_to.trim();
        let to = if syntax.unescape_spaces {
            unescape_spaces(raw_to)
        } else {
            raw_to.to_string()
        };

        log::debug!("line {}: {} => {}", index + 1, from, to);
        rules.push(MappingRule { from, to });
    }

    Ok(RuleSet::from(rules))
}

/// `\s` becomes a space, `\\s` becomes a literal `\s`
fn unescape_spaces(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('\\') {
        output.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with("\\\\s") {
            output.push_str("\\s");
            rest = &rest[3..];
        } else if rest.starts_with("\\s") {
            output.push(' ');
            rest = &rest[2..];
        } else {
            output.push('\\');
            rest = &rest[1..];
        }
    }

    output.push_str(rest);
    output
}

fn log_rejected(rejected: RegexRejected) {
    log::warn!("{}", rejected);
}
