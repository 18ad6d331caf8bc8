use crate::error::ValidationError;
use ignore::WalkBuilder;
use std::cmp::Ordering;
use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Expand a leading `~` and resolve relative paths against the current directory
///
/// # Arguments
/// * `term` - Path as typed by the user
///
/// # Returns
/// * `PathBuf` - Absolute path
pub fn full_path(term: &str) -> PathBuf {
    let is_separator = |c: char| c == '/' || c == MAIN_SEPARATOR;

    let expanded = match (term.strip_prefix('~'), dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with(is_separator) => {
            home.join(rest.trim_start_matches(is_separator))
        }
        _ => PathBuf::from(term),
    };

    if expanded.is_absolute() {
        return expanded;
    }

    match env::current_dir() {
        Ok(cwd) => cwd.join(expanded),
        Err(_) => expanded,
    }
}

/// Find the nearest existing directory for a partially typed path
///
/// # Arguments
/// * `term` - Partial path, relative to `root`
/// * `root` - Directory the search may not leave
///
/// # Returns
/// * `PathBuf` - Deepest existing directory on the way to `term`
pub fn search_root(term: &str, root: &Path) -> PathBuf {
    let mut current = root.join(term);

    while !current.is_dir() && current != root {
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return root.to_path_buf(),
        }
    }

    current
}

/// List the entries of one directory that contain `term`.
///
/// Directories come first and carry a trailing separator; within each group
/// entries are sorted by name. Paths are relative to `root` and matching is
/// case-insensitive. An unreadable directory gives an empty list.
pub fn list_directory_entries(term: &str, current_dir: &Path, root: &Path) -> Vec<String> {
    let walker = WalkBuilder::new(current_dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build();

    let mut entries = Vec::new();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping entry: {}", err);
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
        entries.push((is_dir, entry.into_path()));
    }

    entries.sort_by(|(a_dir, a), (b_dir, b)| match (a_dir, b_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(a, b),
    });

    let needle = term.to_lowercase();

    entries
        .into_iter()
        .map(|(is_dir, path)| {
            let relative = path.strip_prefix(root).unwrap_or(path.as_path());
            let end = if is_dir { MAIN_SEPARATOR.to_string() } else { String::new() };
            format!("{}{}", relative.display(), end)
        })
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .collect()
}

fn compare_names(a: &Path, b: &Path) -> Ordering {
    let a = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let b = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// Entries under the current directory that match a partially typed path
///
/// # Arguments
/// * `term` - Partial path
///
/// # Returns
/// * `Vec<String>` - Matching entries relative to the current directory
pub fn search_results(term: &str) -> Vec<String> {
    let root = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => return Vec::new(),
    };

    search_results_in(term, &root)
}

/// Same as [`search_results`] with an explicit root
pub fn search_results_in(term: &str, root: &Path) -> Vec<String> {
    let term = term.trim();
    let dir = search_root(term, root);
    list_directory_entries(term, &dir, root)
}

/// Entries that look like what the user meant when `path` does not exist.
///
/// Matches siblings on the file stem, so `style.csss` suggests `style.css`.
pub fn suggestions(path: &Path, limit: usize) -> Vec<String> {
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
        return Vec::new();
    };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) if parent.is_dir() => parent.to_path_buf(),
        _ => return Vec::new(),
    };

    list_directory_entries(&stem, &dir, &dir)
        .into_iter()
        .take(limit)
        .map(|name| dir.join(name).display().to_string())
        .collect()
}

/// Check that a path names an existing file with the expected extension
///
/// # Arguments
/// * `path` - Path to check
/// * `extension` - Required extension including the dot, compared case-insensitively
///
/// # Returns
/// * `Result<(), ValidationError>` - Ok if the file can be used
pub fn validate_file(path: &Path, extension: Option<&str>) -> Result<(), ValidationError> {
    if !path.exists() {
        return Err(ValidationError::Missing);
    }

    if path.is_dir() {
        return Err(ValidationError::Directory);
    }

    if let Some(expected) = extension {
        let actual = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        if actual != expected.to_lowercase() {
            return Err(ValidationError::Extension(expected.to_string()));
        }
    }

    Ok(())
}
