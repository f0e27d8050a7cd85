//! Dependency selector
//!
//! Computes the minimal file set satisfying a root set of required
//! namespaces: breadth-first expansion over require edges, optionally
//! pulling in `<ns>Test` companion namespaces. A referenced namespace with
//! no provider is a hard error — silently omitting it would produce an
//! incomplete tree that only fails much later, in the rewriter.

use crate::core::error::{Error, Result};
use crate::read::DependencyGraph;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::PathBuf;
use tracing::debug;

/// Suffix of the companion namespace a test file provides for `<ns>`.
const TEST_NAMESPACE_SUFFIX: &str = "Test";

/// Transitive closure of files reachable from `root_namespaces` via
/// require edges. Lenient (type-inferred) requires are advisory and do not
/// pull files in.
pub fn select(
    graph: &DependencyGraph,
    root_namespaces: &[String],
    include_tests: bool,
) -> Result<BTreeSet<PathBuf>> {
    let mut selected: BTreeSet<PathBuf> = BTreeSet::new();
    let mut processed: HashSet<String> = HashSet::new();
    let mut unsatisfied: VecDeque<String> = root_namespaces.iter().cloned().collect();

    while let Some(namespace) = unsatisfied.pop_front() {
        if !processed.insert(namespace.clone()) {
            continue;
        }
        let file = graph
            .provider(&namespace)
            .ok_or_else(|| Error::NamespaceNotProvided {
                namespace: namespace.clone(),
            })?
            .to_path_buf();
        for require in graph.requires(&file) {
            if !require.is_lenient() && !processed.contains(&require.namespace) {
                unsatisfied.push_back(require.namespace.clone());
            }
        }
        selected.insert(file);

        if include_tests {
            let companion = format!("{namespace}{TEST_NAMESPACE_SUFFIX}");
            if let Some(test_file) = graph.provider(&companion) {
                let test_file = test_file.to_path_buf();
                for require in graph.requires(&test_file) {
                    if !require.is_lenient() && !processed.contains(&require.namespace) {
                        unsatisfied.push_back(require.namespace.clone());
                    }
                }
                processed.insert(companion);
                selected.insert(test_file);
            }
        }
    }

    debug!(files = selected.len(), "selection complete");
    Ok(selected)
}
