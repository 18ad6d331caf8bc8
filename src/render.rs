//! Terminal output for the replace-text CLI.
//!
//! Everything here returns strings; printing is left to `main`.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::Path;

/// Symbols used to frame the report, with ASCII fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    pub bar: &'static str,
    pub bar_end: &'static str,
    pub bar_h: &'static str,
    pub connect_left: &'static str,
    pub step_done: &'static str,
    pub step_error: &'static str,
    pub success: &'static str,
}

impl Symbols {
    pub const UNICODE: Symbols = Symbols {
        bar: "│",
        bar_end: "└",
        bar_h: "─",
        connect_left: "├",
        step_done: "◇",
        step_error: "▲",
        success: "◆",
    };

    pub const ASCII: Symbols = Symbols {
        bar: "|",
        bar_end: "—",
        bar_h: "-",
        connect_left: "+",
        step_done: "o",
        step_error: "x",
        success: "*",
    };
}

/// Read-only rendering settings, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub symbols: Symbols,
    pub color: bool,
}

impl Theme {
    /// Pick symbols for the current terminal
    ///
    /// # Arguments
    /// * `color` - Whether ANSI colors should be emitted
    ///
    /// # Returns
    /// * `Theme` - Unicode symbols unless the terminal is known not to support them
    pub fn detect(color: bool) -> Theme {
        let symbols = if unicode_supported() {
            Symbols::UNICODE
        } else {
            Symbols::ASCII
        };

        Theme { symbols, color }
    }

    pub fn plain() -> Theme {
        Theme {
            symbols: Symbols::ASCII,
            color: false,
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed())
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }
}

fn unicode_supported() -> bool {
    if cfg!(windows) {
        return env::var_os("WT_SESSION").is_some() || env::var_os("TERM_PROGRAM").is_some();
    }

    env::var("TERM").map_or(true, |term| term != "linux")
}

/// `Running:`/`Simulating:` banner followed by the equivalent command line
pub fn command_banner(
    theme: &Theme,
    dry_run: bool,
    in_file: &Path,
    map_file: &Path,
    out_file: Option<&Path>,
) -> String {
    let mut args = Vec::new();
    if dry_run {
        args.push("--dry-run".to_string());
    }
    args.push(format!("--in={}", in_file.display()));
    args.push(format!("--map={}", map_file.display()));
    if let Some(out) = out_file {
        args.push(format!("--out={}", out.display()));
    }

    let label = if dry_run { "Simulating:" } else { "Running:" };
    format!("\n{}\nreplace-text {}\n", theme.dim(label), args.join(" "))
}

/// The "Replacing text from ... / Writing to ..." header of the report
pub fn progress_header(theme: &Theme, in_file: &Path, target: &str) -> String {
    let s = &theme.symbols;
    format!(
        "{}  Replacing text from {}\n{}\n{}{} Writing to {}\n{}",
        theme.green(s.step_done),
        theme.cyan(&in_file.display().to_string()),
        s.bar,
        s.connect_left,
        s.bar_h,
        theme.yellow(target),
        s.bar,
    )
}

/// Framed preview of the first `lines` lines of the output
pub fn sample_output(theme: &Theme, output: &str, lines: usize) -> String {
    let s = &theme.symbols;
    let mut rendered = format!(
        "{}{} {}\n",
        s.connect_left,
        s.bar_h,
        theme.dim("Sample output:")
    );

    for line in output.split('\n').take(lines) {
        rendered.push_str(s.bar);
        rendered.push_str(line);
        rendered.push('\n');
    }

    rendered.push_str(&format!(
        "{}{}{}{}",
        s.bar_end,
        s.bar_h,
        s.bar_h,
        theme.green(s.success)
    ));
    rendered
}

/// Closing line after the output has been written
pub fn finished(theme: &Theme, target: &Path) -> String {
    let s = &theme.symbols;
    format!(
        "{}{} Finished writing changes to {}\n",
        s.bar_end,
        theme.green(s.success),
        theme.green(&target.display().to_string())
    )
}

/// Error line in the same frame as the report
pub fn failure(theme: &Theme, message: &str) -> String {
    format!(
        "\n{} {}\n",
        theme.red(theme.symbols.step_error),
        message
    )
}

/// Unified diff between the input and the replaced text
///
/// # Arguments
/// * `original` - Text before replacement
/// * `modified` - Text after replacement
///
/// # Returns
/// * `String` - Diff with `+`, `-` and ` ` prefixed lines, hunks separated by `...`
pub fn unified_diff(theme: &Theme, original: &str, modified: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str(&theme.dim("...\n"));
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let mut line = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                }
                .to_string();
                line.push_str(change.value());
                if change.missing_newline() {
                    line.push('\n');
                }

                let line = match change.tag() {
                    ChangeTag::Delete => theme.red(&line),
                    ChangeTag::Insert => theme.green(&line),
                    ChangeTag::Equal => line,
                };
                output.push_str(&line);
            }
        }
    }

    output
}
