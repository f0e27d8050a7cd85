//! Dependency graph
//!
//! Namespace→file ownership plus per-file provide/require declarations.
//! Built once per reader pass, owned by the run (never process-global),
//! read-only after validation. Re-running the reader rebuilds it from
//! scratch instead of mutating it incrementally.

use crate::core::error::{Error, Result};
use crate::read::{ProvideDecl, RequireDecl};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DependencyGraph {
    file_by_namespace: HashMap<String, PathBuf>,
    provides_by_file: BTreeMap<PathBuf, Vec<ProvideDecl>>,
    requires_by_file: BTreeMap<PathBuf, Vec<RequireDecl>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one file's declarations. Fails immediately when a namespace
    /// already has a different provider.
    pub fn insert_file(
        &mut self,
        file: &Path,
        provides: Vec<ProvideDecl>,
        requires: Vec<RequireDecl>,
    ) -> Result<()> {
        for provide in &provides {
            if let Some(first) = self.file_by_namespace.get(&provide.namespace) {
                return Err(Error::DuplicateProvide {
                    namespace: provide.namespace.clone(),
                    first: first.clone(),
                    second: file.to_path_buf(),
                });
            }
            self.file_by_namespace
                .insert(provide.namespace.clone(), file.to_path_buf());
        }
        self.provides_by_file
            .entry(file.to_path_buf())
            .or_default()
            .extend(provides);
        self.requires_by_file
            .entry(file.to_path_buf())
            .or_default()
            .extend(requires);
        Ok(())
    }

    /// Append a synthesized require to an already-registered file.
    pub fn push_require(&mut self, file: &Path, require: RequireDecl) {
        self.requires_by_file
            .entry(file.to_path_buf())
            .or_default()
            .push(require);
    }

    pub fn provider(&self, namespace: &str) -> Option<&Path> {
        self.file_by_namespace.get(namespace).map(PathBuf::as_path)
    }

    pub fn provides(&self, file: &Path) -> &[ProvideDecl] {
        self.provides_by_file
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn requires(&self, file: &Path) -> &[RequireDecl] {
        self.requires_by_file
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Files that provide at least one namespace, in path order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.provides_by_file.keys().map(PathBuf::as_path)
    }

    pub fn namespace_count(&self) -> usize {
        self.file_by_namespace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_by_namespace.is_empty()
    }

    /// Batch validation after the reader pass: every non-lenient require
    /// must have a provider. Failures are aggregated into one error so a
    /// run reports all missing namespaces together. Lenient requires with
    /// no provider are advisory and silently removed here.
    pub fn validate(&mut self) -> Result<()> {
        let file_by_namespace = &self.file_by_namespace;
        let mut unresolved: Vec<String> = Vec::new();
        for (file, requires) in &mut self.requires_by_file {
            requires.retain(|require| {
                if file_by_namespace.contains_key(&require.namespace) {
                    return true;
                }
                if require.is_lenient() {
                    debug!(
                        file = %file.display(),
                        namespace = %require.namespace,
                        "dropping unresolvable lenient require"
                    );
                    return false;
                }
                unresolved.push(require.namespace.clone());
                false
            });
        }
        if unresolved.is_empty() {
            return Ok(());
        }
        unresolved.sort();
        unresolved.dedup();
        Err(Error::UnresolvedDependencies {
            namespaces: unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::{ProvideKind, RequireDecl};

    fn provide(namespace: &str) -> ProvideDecl {
        ProvideDecl {
            namespace: namespace.to_string(),
            kind: ProvideKind::Provide,
            exports: vec![],
            matched_text: Some(format!("goog.provide('{namespace}');")),
        }
    }

    #[test]
    fn test_duplicate_provide_is_fatal() {
        let mut graph = DependencyGraph::new();
        graph
            .insert_file(Path::new("a.js"), vec![provide("a.b")], vec![])
            .unwrap();
        let err = graph
            .insert_file(Path::new("b.js"), vec![provide("a.b")], vec![])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateProvide { .. }));
    }

    #[test]
    fn test_validate_aggregates_unresolved() {
        let mut graph = DependencyGraph::new();
        graph
            .insert_file(
                Path::new("a.js"),
                vec![provide("a")],
                vec![
                    RequireDecl::explicit("missing.one", None, vec![], false, "x"),
                    RequireDecl::explicit("missing.two", None, vec![], false, "y"),
                ],
            )
            .unwrap();
        match graph.validate() {
            Err(Error::UnresolvedDependencies { namespaces }) => {
                assert_eq!(namespaces, vec!["missing.one", "missing.two"]);
            }
            other => panic!("expected aggregate error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_drops_lenient_quietly() {
        let mut graph = DependencyGraph::new();
        graph
            .insert_file(
                Path::new("a.js"),
                vec![provide("a")],
                vec![RequireDecl::implicit_lenient("not.provided")],
            )
            .unwrap();
        graph.validate().unwrap();
        assert!(graph.requires(Path::new("a.js")).is_empty());
    }
}
