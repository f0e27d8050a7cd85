//! Cycle breaker
//!
//! Mutually-requiring namespace groups cannot be expressed as acyclic ES6
//! imports, so the known groups are concatenated into a single file before
//! conversion. Require statements between group members become intra-file
//! references and are stripped — they must not turn into self-imports
//! later. The group list is fixed configuration; general cycle detection
//! is out of scope.

use crate::core::config::CycleGroup;
use crate::core::error::Result;
use crate::core::fsutil;
use regex::Regex;
use std::path::Path;
use tracing::{info, warn};

pub struct MergePass {
    provide_pattern: Regex,
    root: String,
}

impl MergePass {
    pub fn new(root_namespace: &str) -> Self {
        let root = regex::escape(root_namespace);
        let provide_pattern = Regex::new(&format!(
            r#"(?m)^{root}\s*\.\s*(?:provide|module)\s*\(\s*['"]([\w.]+)['"]\s*\)\s*;?"#
        ))
        .unwrap();
        Self {
            provide_pattern,
            root: root_namespace.to_string(),
        }
    }

    /// Merge every configured group found under `root_dir`.
    pub fn process(&self, root_dir: &Path, groups: &[CycleGroup]) -> Result<()> {
        for group in groups {
            self.merge_group(root_dir, group)?;
        }
        Ok(())
    }

    /// Concatenate the group's files (declared order), strip intra-group
    /// requires, delete the constituents and write the target file.
    fn merge_group(&self, root_dir: &Path, group: &CycleGroup) -> Result<()> {
        let mut contents: Vec<String> = Vec::new();
        let mut merged_files = Vec::new();
        for relative in &group.files {
            let path = root_dir.join(relative);
            if !path.is_file() {
                warn!(file = %path.display(), "cycle group constituent missing, skipping");
                continue;
            }
            contents.push(fsutil::read_source(&path)?);
            merged_files.push(path);
        }
        if merged_files.is_empty() {
            warn!(group = %group.target, "cycle group has no existing files, nothing to merge");
            return Ok(());
        }

        let mut content = contents.join("\n\n");

        let provided: Vec<String> = self
            .provide_pattern
            .captures_iter(&content)
            .map(|captures| captures[1].to_string())
            .collect();
        for namespace in provided {
            let require = Regex::new(&format!(
                r#"(?m)^(?:(?:const|let|var)\s+[\w$]+\s*=\s*)?{}\s*\.\s*(?:require|requireType|forwardDeclare)\s*\(\s*['"]{}['"]\s*\)\s*;?[^\S\n]*\n?"#,
                regex::escape(&self.root),
                regex::escape(&namespace)
            ))
            .unwrap();
            content = require.replace_all(&content, "").to_string();
        }

        for file in &merged_files {
            std::fs::remove_file(file)?;
        }
        let target = root_dir.join(&group.target);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        fsutil::write_source(&target, &content)?;
        info!(
            file = %target.display(),
            merged = merged_files.len(),
            "merged cycle group"
        );
        Ok(())
    }
}
