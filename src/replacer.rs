use crate::error::MappingError;
use crate::mapping::{self, Matcher, MappingRule, RuleSet};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Input text and the text produced from it by one replacement run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub input: String,
    pub output: String,
}

impl Conversion {
    pub fn changed(&self) -> bool {
        self.input != self.output
    }
}

/// Apply all rules to the content, in order
///
/// # Arguments
/// * `content` - The content to replace in
/// * `rules` - Rules to apply; each one sees the previous one's output
///
/// # Returns
/// * `String` - The replaced content
pub fn apply_replacements(content: &str, rules: &RuleSet) -> String {
    rules
        .iter()
        .fold(content.to_string(), |acc, rule| apply_rule(&acc, rule))
}

/// Apply a single rule
///
/// Pattern rules expand `$` tokens in the replacement, literal rules insert
/// it verbatim at every non-overlapping occurrence.
pub fn apply_rule(content: &str, rule: &MappingRule) -> String {
    match &rule.from {
        Matcher::Pattern(pattern) => pattern.replace(content, &rule.to),
        Matcher::Literal(literal) if literal.is_empty() => content.to_string(),
        Matcher::Literal(literal) => content.replace(literal.as_str(), &rule.to),
    }
}

/// Parse mapping text and apply it to the input text
///
/// # Arguments
/// * `input` - Text to transform
/// * `mapping` - Mapping file contents
///
/// # Returns
/// * `Result<String, MappingError>` - The transformed text
pub fn compute_output(input: &str, mapping: &str) -> Result<String, MappingError> {
    let rules = mapping::parse_mapping_text(mapping)?;
    Ok(apply_replacements(input, &rules))
}

/// Read and parse a mapping file
///
/// # Arguments
/// * `map_file` - Path of the mapping file
///
/// # Returns
/// * `Result<RuleSet>` - Parsed rules
pub fn read_mapping_file(map_file: &Path) -> Result<RuleSet> {
    let text = fs::read_to_string(map_file)
        .with_context(|| format!("Failed to read mapping file: {}", map_file.display()))?;

    let rules = mapping::parse_mapping_text(&text)
        .with_context(|| format!("Failed to parse mapping file: {}", map_file.display()))?;

    log::debug!("{} rules loaded from {}", rules.len(), map_file.display());
    Ok(rules)
}

/// Read the input and mapping files and compute the replaced text
///
/// # Arguments
/// * `in_file` - File to transform
/// * `map_file` - Mapping file to apply
///
/// # Returns
/// * `Result<Conversion>` - Original and replaced text
pub fn convert_file(in_file: &Path, map_file: &Path) -> Result<Conversion> {
    let input = fs::read_to_string(in_file)
        .with_context(|| format!("Failed to read file: {}", in_file.display()))?;

    let rules = read_mapping_file(map_file)?;
    let output = apply_replacements(&input, &rules);

    Ok(Conversion { input, output })
}

/// Write replaced text, creating missing parent directories
///
/// # Arguments
/// * `target` - File to write
/// * `content` - Text to write
///
/// # Returns
/// * `Result<()>` - Result of the operation
pub fn write_output(target: &Path, content: &str) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(target, content)
        .with_context(|| format!("Failed to write file: {}", target.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use tempfile::tempdir;

    fn regex_rule(source: &str, flags: &str, to: &str) -> MappingRule {
        MappingRule::pattern(Pattern::compile(source, flags).unwrap(), to)
    }

    #[test]
    fn test_literal_replacement() {
        let rules = RuleSet::from(vec![MappingRule::literal("blue", "var(--blue)")]);
        assert_eq!(
            apply_replacements("color: blue; border: blue;", &rules),
            "color: var(--blue); border: var(--blue);"
        );
    }

    #[test]
    fn test_literal_replacement_is_verbatim() {
        let rules = RuleSet::from(vec![MappingRule::literal("blue", "$& $1 $$")]);
        assert_eq!(apply_replacements("blue", &rules), "$& $1 $$");
    }

    #[test]
    fn test_regex_replacement() {
        let rules = RuleSet::from(vec![regex_rule("--theme-(\\w+)", "g", "--color-$1")]);
        assert_eq!(
            apply_replacements("--theme-primary: red;", &rules),
            "--color-primary: red;"
        );
    }

    #[test]
    fn test_rules_apply_in_order() {
        let rules = RuleSet::from(vec![
            regex_rule("--theme-(\\w+)", "g", "--color-$1"),
            MappingRule::literal("blue", "var(--blue)"),
        ]);
        assert_eq!(
            apply_replacements("--theme-primary: blue;", &rules),
            "--color-primary: var(--blue);"
        );

        let chained = RuleSet::from(vec![
            MappingRule::literal("a", "b"),
            MappingRule::literal("b", "c"),
        ]);
        assert_eq!(apply_replacements("ab", &chained), "cc");
    }

    #[test]
    fn test_no_match_is_unchanged() {
        let input = "--nothing-here: green;";
        let rules = RuleSet::from(vec![regex_rule("not-found", "", "something")]);
        assert_eq!(apply_replacements(input, &rules), input);
    }

    #[test]
    fn test_rejected_regex_is_matched_literally() {
        let rules = RuleSet::from(vec![MappingRule::literal("/--bad-regex(", "oops")]);
        assert_eq!(apply_replacements("bad-regex", &rules), "bad-regex");
        assert_eq!(apply_replacements("a /--bad-regex( b", &rules), "a oops b");
    }

    #[test]
    fn test_capture_groups() {
        let input = "--color-red-50: oklch(97.1% 0.013 17.38);\n--color-red-100: oklch(93.6% 0.032 17.717);\n--color-yellow-800: oklch(47.6% 0.114 61.907);";
        let rules = RuleSet::from(vec![regex_rule(
            r"(--[\w-]+): (oklch\([\d\.%\s]+\));",
            "g",
            "$2 => var($1)",
        )]);

        assert_eq!(
            apply_replacements(input, &rules),
            "oklch(97.1% 0.013 17.38) => var(--color-red-50)\noklch(93.6% 0.032 17.717) => var(--color-red-100)\noklch(47.6% 0.114 61.907) => var(--color-yellow-800)"
        );
    }

    #[test]
    fn test_compute_output() {
        let input = "color: blue;\nbackground-color: green;\nborder: 1px solid red;";
        let mapping = "red => var(--red)\n/blue/gi => var(--blue)\ngreen => var(--green)";

        let output = compute_output(input, mapping).unwrap();
        assert_eq!(
            output,
            "color: var(--blue);\nbackground-color: var(--green);\nborder: 1px solid var(--red);"
        );

        // Same inputs always give the same bytes
        assert_eq!(compute_output(input, mapping).unwrap(), output);
    }

    #[test]
    fn test_compute_output_rejects_invalid_mapping() {
        let err = compute_output("text", "a => b\nbroken").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_convert_and_write_files() {
        let dir = tempdir().unwrap();
        let in_file = dir.path().join("simple.css");
        let map_file = dir.path().join("map.txt");
        fs::write(&in_file, "color: Blue;\nborder: 1px solid red;").unwrap();
        fs::write(&map_file, "red => var(--red)\n/blue/gi => var(--blue)\n").unwrap();

        let conversion = convert_file(&in_file, &map_file).unwrap();
        assert!(conversion.changed());
        assert_eq!(
            conversion.output,
            "color: var(--blue);\nborder: 1px solid var(--red);"
        );

        let target = dir.path().join("out/nested/simple.css");
        write_output(&target, &conversion.output).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), conversion.output);
    }

    #[test]
    fn test_read_mapping_file_errors_have_context() {
        let dir = tempdir().unwrap();
        let map_file = dir.path().join("map.txt");
        fs::write(&map_file, "no arrow here").unwrap();

        let err = read_mapping_file(&map_file).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to parse mapping file"));
        assert!(message.contains("Invalid mapping at line 1: no arrow here"));
    }
}
