//! Candidate file enumeration from root-relative glob patterns.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::{Error, Result};

/// Expand `patterns` under `root`, in pattern order, dropping duplicates and
/// anything whose root-relative path matches one of `exclude`.
pub fn discover_files(root: &Path, patterns: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let exclude = compile_excludes(exclude)?;
    let escaped_root = Pattern::escape(&root.to_string_lossy());

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
        let entries = glob::glob(&full)
            .map_err(|e| Error::validation_invalid_pattern(pattern.as_str(), e.to_string()))?;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    log_status!("discover", "Skipped {}: {}", err.path().display(), err.error());
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let relative = relative_path(root, &path);
            if exclude.iter().any(|p| p.matches(&relative)) {
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn compile_excludes(exclude: &[String]) -> Result<Vec<Pattern>> {
    exclude
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| Error::validation_invalid_pattern(p.as_str(), e.to_string())))
        .collect()
}

/// Path relative to `root` with forward slashes, for reporting and exclude matching.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
