use crate::error::PatternError;
use regex::{Captures, Match, Regex, RegexBuilder};
use std::fmt;

/// Flag letters accepted after the closing slash, in display order
const FLAG_CHARS: &str = "gimsuy";

/// Flags written after the closing slash of a `/body/flags` token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `g`: replace every match instead of the first one
    pub global: bool,

    /// `i`
    pub ignore_case: bool,

    /// `m`: `^` and `$` match at line boundaries
    pub multi_line: bool,

    /// `s`: `.` also matches `\n`
    pub dot_all: bool,

    /// `u`
    pub unicode: bool,

    /// `y`: matches must start where the previous one ended
    pub sticky: bool,
}

impl Flags {
    /// Parse a flag string such as `gi`
    ///
    /// # Arguments
    /// * `raw` - Characters after the closing slash
    ///
    /// # Returns
    /// * `Result<Flags, PatternError>` - Error on a repeated flag
    pub fn parse(raw: &str) -> Result<Flags, PatternError> {
        let mut flags = Flags::default();

        for c in raw.chars() {
            let slot = match c {
                'g' => &mut flags.global,
                'i' => &mut flags.ignore_case,
                'm' => &mut flags.multi_line,
                's' => &mut flags.dot_all,
                'u' => &mut flags.unicode,
                'y' => &mut flags.sticky,
                // Callers only pass strings accepted by `split_token`
                _ => continue,
            };
            if *slot {
                return Err(PatternError::DuplicateFlag(raw.to_string(), c));
            }
            *slot = true;
        }

        Ok(flags)
    }

    fn is_set(&self, c: char) -> bool {
        match c {
            'g' => self.global,
            'i' => self.ignore_case,
            'm' => self.multi_line,
            's' => self.dot_all,
            'u' => self.unicode,
            'y' => self.sticky,
            _ => false,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in FLAG_CHARS.chars().filter(|c| self.is_set(*c)) {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Split a `/body/flags` token into body and flags.
///
/// The closing slash is the last slash of the token, the body must be
/// non-empty and every flag character must be one of `gimsuy`. Anything else
/// (`/path/to/file`, `/missingend`, `plain`) yields `None`.
pub fn split_token(token: &str) -> Option<(&str, &str)> {
    let rest = token.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (body, flags) = (&rest[..close], &rest[close + 1..]);

    if body.is_empty() || body.contains('\n') {
        return None;
    }
    if !flags.chars().all(|c| FLAG_CHARS.contains(c)) {
        return None;
    }

    Some((body, flags))
}

/// A compiled regular expression together with the flags it was written with
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
    flags: Flags,
    named_groups: bool,
}

impl Pattern {
    /// Compile a pattern body with a flag string
    ///
    /// # Arguments
    /// * `source` - Pattern body, without delimiters
    /// * `flags` - Flag characters, e.g. `gi`
    ///
    /// # Returns
    /// * `Result<Pattern, PatternError>` - The compiled pattern
    pub fn compile(source: &str, flags: &str) -> Result<Pattern, PatternError> {
        let flags = Flags::parse(flags)?;

        // `u` is accepted but has no effect: matching is always Unicode aware
        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .build()?;

        let named_groups = regex.capture_names().flatten().next().is_some();

        Ok(Pattern {
            regex,
            source: source.to_string(),
            flags,
            named_groups,
        })
    }

    /// The pattern body as written in the mapping file
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Substitute matches of this pattern in `haystack` with `template`.
    ///
    /// Only the first match is replaced unless the `g` flag is set. Template
    /// tokens (`$&`, `$1`, ...) are expanded per match.
    pub fn replace(&self, haystack: &str, template: &str) -> String {
        let mut output = String::with_capacity(haystack.len());
        let mut last_end = 0;

        for caps in self.regex.captures_iter(haystack) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if self.flags.sticky && whole.start() != last_end {
                break;
            }

            output.push_str(&haystack[last_end..whole.start()]);
            let matched = Matched {
                caps: &caps,
                whole,
                haystack,
                named_groups: self.named_groups,
            };
            matched.expand(template, &mut output);
            last_end = whole.end();

            if !self.flags.global {
                break;
            }
        }

        output.push_str(&haystack[last_end..]);
        output
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// One match of a pattern, with what template expansion needs to know
struct Matched<'a, 'h> {
    caps: &'a Captures<'h>,
    whole: Match<'h>,
    haystack: &'h str,
    named_groups: bool,
}

impl Matched<'_, '_> {
    /// Expand a replacement template for this match.
    ///
    /// Supported tokens: `$$`, `$&`, `` $` ``, `$'`, `$1`..`$99` and `$<name>`.
    /// A token that refers to a group the pattern does not have is copied
    /// through unchanged.
    fn expand(&self, template: &str, output: &mut String) {
        let mut rest = template;

        while let Some(pos) = rest.find('$') {
            output.push_str(&rest[..pos]);
            rest = &rest[pos..];
            let consumed = self.expand_token(rest, output);
            rest = &rest[consumed..];
        }

        output.push_str(rest);
    }

    /// Expand the token at the start of `token` (which begins with `$`) and
    /// return how many bytes it used.
    fn expand_token(&self, token: &str, output: &mut String) -> usize {
        let bytes = token.as_bytes();
        let group_count = self.caps.len() - 1;

        match bytes.get(1) {
            Some(b'$') => {
                output.push('$');
                2
            }
            Some(b'&') => {
                output.push_str(self.whole.as_str());
                2
            }
            Some(b'`') => {
                output.push_str(&self.haystack[..self.whole.start()]);
                2
            }
            Some(b'\'') => {
                output.push_str(&self.haystack[self.whole.end()..]);
                2
            }
            Some(digit) if digit.is_ascii_digit() => {
                let first = usize::from(digit - b'0');

                // Prefer a two digit group when the pattern has that many
                if let Some(second) = bytes.get(2).filter(|b| b.is_ascii_digit()) {
                    let index = first * 10 + usize::from(second - b'0');
                    if (1..=group_count).contains(&index) {
                        self.push_group(index, output);
                        return 3;
                    }
                }

                if (1..=group_count).contains(&first) {
                    self.push_group(first, output);
                    2
                } else {
                    output.push('$');
                    1
                }
            }
            Some(b'<') if self.named_groups => match token.find('>') {
                Some(close) => {
                    if let Some(group) = self.caps.name(&token[2..close]) {
                        output.push_str(group.as_str());
                    }
                    close + 1
                }
                None => {
                    output.push('$');
                    1
                }
            },
            _ => {
                output.push('$');
                1
            }
        }
    }

    /// Unmatched groups expand to nothing
    fn push_group(&self, index: usize, output: &mut String) {
        if let Some(group) = self.caps.get(index) {
            output.push_str(group.as_str());
        }
    }
}
