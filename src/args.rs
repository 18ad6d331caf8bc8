use anyhow::{anyhow, Result};
use clap::Parser;
use replace_text::search;
use replace_text::ValidationError;
use std::path::{Path, PathBuf};

/// Extension a mapping file must have
pub const MAPPING_EXTENSION: &str = ".txt";

/// Number of alternatives offered when a file is missing
const MAX_SUGGESTIONS: usize = 5;

/// Where the replaced text goes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    #[default]
    Stdout,          // Print the result
    Overwrite,       // Write back to the input file
    File(PathBuf),   // Write to a new file
    Search(String),  // List files matching a partial path
}

/// Command line arguments parser
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Replace text from a file using a rules map.")]
#[command(name = "replace-text")]
pub struct Args {
    /// Input file to modify / copy
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    pub input: Option<String>,

    /// Mapping file with .txt extension and arrow rules: input => output
    #[arg(short = 'm', long = "map", value_name = "FILE")]
    pub map: Option<String>,

    /// Output file (omit value to force overwrite)
    #[arg(short = 'o', long = "out", value_name = "FILE", num_args = 0..=1)]
    pub out: Option<Option<String>>,

    /// Simulate output without affecting files
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Show a diff instead of a sample in dry-run mode
    #[arg(long = "diff", requires = "dry_run")]
    pub diff: bool,

    /// Number of lines shown in the dry-run sample
    #[arg(long = "lines", value_name = "N", default_value_t = 10)]
    pub lines: usize,

    /// List files and directories matching a partial path, then exit
    #[arg(long = "search", value_name = "TERM", conflicts_with_all = ["input", "map", "out"])]
    pub search: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long = "verbose")]
    pub verbose: bool,

    #[arg(skip)]
    pub mode: Mode,

    /// Resolved input file
    #[arg(skip)]
    pub in_file: PathBuf,

    /// Resolved mapping file
    #[arg(skip)]
    pub map_file: PathBuf,
}

impl Args {
    /// File the output is written to, if any
    pub fn target(&self) -> Option<&Path> {
        match &self.mode {
            Mode::Overwrite => Some(self.in_file.as_path()),
            Mode::File(path) => Some(path.as_path()),
            Mode::Stdout | Mode::Search(_) => None,
        }
    }
}

/// Parse command line arguments and validate them
///
/// # Returns
/// * `Result<Args>` - Parsed and validated arguments
pub fn parse() -> Result<Args> {
    let mut args = Args::parse();
    validate_args(&mut args)?;
    Ok(args)
}

/// Validate command line arguments and resolve the execution mode
///
/// # Arguments
/// * `args` - Command line arguments to validate
///
/// # Returns
/// * `Result<()>` - Ok if valid, Error otherwise
pub fn validate_args(args: &mut Args) -> Result<()> {
    if let Some(term) = &args.search {
        args.mode = Mode::Search(term.clone());
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("Input file is required. Use -i/--in FILE"))?;
    let map = args
        .map
        .as_deref()
        .ok_or_else(|| anyhow!("Mapping file is required. Use -m/--map FILE"))?;

    args.in_file = search::full_path(input.trim());
    args.map_file = search::full_path(map.trim());

    check_file("Input file", &args.in_file, None)?;
    check_file("Mapping file", &args.map_file, Some(MAPPING_EXTENSION))?;

    args.mode = match &args.out {
        None => Mode::Stdout,
        Some(None) => Mode::Overwrite,
        Some(Some(out)) => {
            let out_file = search::full_path(out.trim());
            if !has_name_and_extension(&out_file) {
                return Err(anyhow!(
                    "Output file must have a name and extension. Eg. path/to/file.ext"
                ));
            }
            if out_file.is_dir() {
                return Err(anyhow!(
                    "Output file {}: {}",
                    out_file.display(),
                    ValidationError::Directory
                ));
            }
            Mode::File(out_file)
        }
    };

    Ok(())
}

fn check_file(label: &str, path: &Path, extension: Option<&str>) -> Result<()> {
    match search::validate_file(path, extension) {
        Ok(()) => Ok(()),
        Err(ValidationError::Missing) => {
            let mut message = format!("{} {}: {}", label, path.display(), ValidationError::Missing);
            let found = search::suggestions(path, MAX_SUGGESTIONS);
            if !found.is_empty() {
                message.push_str(&format!(" Did you mean: {}?", found.join(", ")));
            }
            Err(anyhow!(message))
        }
        Err(err) => Err(anyhow!("{} {}: {}", label, path.display(), err)),
    }
}

/// `name.ext`, not `name`, `.ext` or `name.`
fn has_name_and_extension(path: &Path) -> bool {
    let has_stem = path
        .file_stem()
        .map_or(false, |stem| !stem.to_string_lossy().starts_with('.') && !stem.is_empty());
    let has_extension = path.extension().map_or(false, |ext| !ext.is_empty());

    has_stem && has_extension
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("style.css"), "color: red;").unwrap();
        fs::write(dir.path().join("map.txt"), "red => blue").unwrap();
        fs::write(dir.path().join("map.json"), "{}").unwrap();
        dir
    }

    fn parse_from(dir: &TempDir, extra: &[&str]) -> Result<Args> {
        let input = dir.path().join("style.css");
        let map = dir.path().join("map.txt");
        let mut argv = vec![
            "replace-text".to_string(),
            "--in".to_string(),
            input.display().to_string(),
            "--map".to_string(),
            map.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));

        let mut args = Args::try_parse_from(argv)?;
        validate_args(&mut args)?;
        Ok(args)
    }

    #[test]
    fn test_stdout_mode_without_out() {
        let dir = fixture();
        let args = parse_from(&dir, &[]).unwrap();
        assert_eq!(args.mode, Mode::Stdout);
        assert_eq!(args.target(), None);
        assert!(!args.dry_run);
        assert_eq!(args.lines, 10);
    }

    #[test]
    fn test_out_without_value_overwrites() {
        let dir = fixture();
        let args = parse_from(&dir, &["--out"]).unwrap();
        assert_eq!(args.mode, Mode::Overwrite);
        assert_eq!(args.target(), Some(dir.path().join("style.css").as_path()));
    }

    #[test]
    fn test_out_with_value() {
        let dir = fixture();
        let out = dir.path().join("dist/style.css");
        let args = parse_from(&dir, &["-o", &out.display().to_string(), "-d"]).unwrap();
        assert_eq!(args.mode, Mode::File(out));
        assert!(args.dry_run);
    }

    #[test]
    fn test_out_needs_extension() {
        let dir = fixture();
        let out = dir.path().join("noext");
        let err = parse_from(&dir, &["--out", &out.display().to_string()]).unwrap_err();
        assert!(err.to_string().contains("must have a name and extension"));
    }

    #[test]
    fn test_missing_input_is_reported() {
        let err = validate_args(&mut Args::default()).unwrap_err();
        assert!(err.to_string().contains("Input file is required"));
    }

    #[test]
    fn test_missing_file_suggests_alternatives() {
        let dir = fixture();
        let mut args = Args {
            input: Some(dir.path().join("style.csss").display().to_string()),
            map: Some(dir.path().join("map.txt").display().to_string()),
            ..Args::default()
        };

        let message = validate_args(&mut args).unwrap_err().to_string();
        assert!(message.contains("File does not exist."));
        assert!(message.contains("Did you mean"));
        assert!(message.contains("style.css"));
    }

    #[test]
    fn test_mapping_extension_is_checked() {
        let dir = fixture();
        let mut args = Args {
            input: Some(dir.path().join("style.css").display().to_string()),
            map: Some(dir.path().join("map.json").display().to_string()),
            ..Args::default()
        };

        let message = validate_args(&mut args).unwrap_err().to_string();
        assert!(message.contains("Invalid file extension. Please use \".txt\""));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = fixture();
        let mut args = Args {
            input: Some(dir.path().display().to_string()),
            map: Some(dir.path().join("map.txt").display().to_string()),
            ..Args::default()
        };

        let message = validate_args(&mut args).unwrap_err().to_string();
        assert!(message.contains("You must select a file, not a folder."));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        assert!(Args::try_parse_from(["replace-text", "--in", "a", "--map", "b", "--put"]).is_err());
    }

    #[test]
    fn test_diff_requires_dry_run() {
        assert!(Args::try_parse_from(["replace-text", "--in", "a", "--map", "b.txt", "--diff"]).is_err());
    }

    #[test]
    fn test_search_mode() {
        let mut args = Args::try_parse_from(["replace-text", "--search", "src/"]).unwrap();
        validate_args(&mut args).unwrap();
        assert_eq!(args.mode, Mode::Search("src/".to_string()));
    }

    #[test]
    fn test_has_name_and_extension() {
        assert!(has_name_and_extension(Path::new("path/to/file.ext")));
        assert!(!has_name_and_extension(Path::new("path/to/file")));
        assert!(!has_name_and_extension(Path::new(".env")));
    }
}
