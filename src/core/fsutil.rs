//! File-system glue for the pipeline
//!
//! Reading and writing of source text (with BOM stripping), the copy step
//! that materializes a selected file set under the output root, and
//! relative-path computation for import statements.

use crate::core::config::FilterConfig;
use crate::core::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read a source file as UTF-8, dropping a leading byte-order mark.
pub fn read_source(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.replace('\u{FEFF}', ""))
}

/// Write transformed source text back to disk.
pub fn write_source(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

/// Copy the selected files from `source_dir` into `dest_dir`, preserving
/// their relative paths. The destination is recreated from scratch.
pub fn copy_files(
    selected: &BTreeSet<PathBuf>,
    source_dir: &Path,
    dest_dir: &Path,
) -> Result<()> {
    if dest_dir.exists() {
        std::fs::remove_dir_all(dest_dir)?;
    }
    for file in selected {
        let relative = file.strip_prefix(source_dir).unwrap_or(file);
        let destination = dest_dir.join(relative);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(file, &destination)?;
    }
    Ok(())
}

/// Extension + path heuristics that keep style sheets, generated caches
/// and test-only sources out of every pass.
pub fn is_relevant_js_file(path: &Path, filter: &FilterConfig) -> bool {
    let file_name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_lowercase(),
        None => return false,
    };
    if !file_name.ends_with(".js") {
        return false;
    }
    if filter
        .test_suffixes
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
    {
        return false;
    }
    !path.components().any(|c| {
        let segment = c.as_os_str().to_string_lossy();
        filter.exclude_segments.iter().any(|e| e == segment.as_ref())
    })
}

/// All relevant source files under `root`, in deterministic path order.
pub fn relevant_js_files(root: &Path, filter: &FilterConfig) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| is_relevant_js_file(p, filter))
        .collect()
}

/// Relative path from `from` (a file) to `to` (a file), rendered with
/// forward slashes and a leading `./` where needed — the form an ES6
/// import statement expects.
pub fn relative_import_path(from: &Path, to: &Path) -> String {
    let from_dir = from.parent().unwrap_or_else(|| Path::new(""));

    let from_components: Vec<_> = from_dir.components().collect();
    let to_components: Vec<_> = to.components().collect();

    let common = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_components.len() {
        parts.push("..".to_string());
    }
    for component in &to_components[common..] {
        parts.push(component.as_os_str().to_string_lossy().to_string());
    }

    let joined = parts.join("/");
    if joined.starts_with('.') {
        joined
    } else {
        format!("./{joined}")
    }
}
