//! The reader pass
//!
//! Walks the input roots, filters to relevant source files and extracts
//! each file's provide/module headers, export list and dependency
//! declarations into the dependency graph. Runs twice per conversion: once
//! on the pristine tree and once after class conversion changed the
//! declaration shapes.

use crate::core::config::{Config, FilterConfig};
use crate::core::error::{Error, Result};
use crate::core::fsutil;
use crate::read::graph::DependencyGraph;
use crate::read::{
    ExportEntry, ModuleExport, ProvideDecl, ProvideKind, RequireDecl,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `exports.name = …` — an inline module export.
static INLINE_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*exports\.(\w+)\s*=").unwrap());

/// `exports = {…};` or `exports = name;` — a module export list. The body
/// may contain line and block comments, which are stripped before the
/// entries are split on commas.
static LIST_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*exports\s*=\s*\{?((?:[$\w,\s+:*]|//[^\n]*|/\*[^*]*\*+(?:[^/*][^*]*\*+)*/)+)\}?;?")
        .unwrap()
});

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").unwrap());
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/").unwrap());

/// Documentation comments, scanned for type annotations.
static DOC_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*\*(?s:.*?)\*/").unwrap());

/// A `{...}` type expression inside a documentation comment.
static TYPE_EXPR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// A dotted identifier with at least two segments.
static DOTTED_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)+").unwrap());

/// Declarations extracted from one file, plus the implicit-require hooks
/// that can only be resolved once the whole tree has been read.
struct FileDecls {
    provides: Vec<ProvideDecl>,
    requires: Vec<RequireDecl>,
    wants_root: bool,
    wants_dispose: bool,
}

pub struct ReaderPass {
    root: String,
    filter: FilterConfig,
    extra_provides: Vec<(String, String, bool)>,
    provide_pattern: Regex,
    require_pattern: Regex,
    test_only_marker: String,
    dispose_marker: String,
}

impl ReaderPass {
    pub fn new(config: &Config) -> Self {
        let root = regex::escape(&config.namespace.root);
        let provide_pattern = Regex::new(&format!(
            r#"(?m)^{root}\s*\.\s*(provide|module)\s*\(\s*['"]([\w.]+)['"]\s*\)\s*;?"#
        ))
        .unwrap();
        let require_pattern = Regex::new(&format!(
            r#"(?m)^(?:(?:const|let|var)\s+(\{{[^}}]*\}}|[\w$]+)\s*=\s*)?{root}\s*\.\s*(require|requireType|forwardDeclare)\s*\(\s*['"]([\w.]+)['"]\s*\)\s*;?"#
        ))
        .unwrap();
        Self {
            root: config.namespace.root.clone(),
            filter: config.filter.clone(),
            extra_provides: config
                .extra_provides
                .iter()
                .map(|e| (e.file.clone(), e.namespace.clone(), e.module))
                .collect(),
            provide_pattern,
            require_pattern,
            test_only_marker: format!("{}.setTestOnly();", config.namespace.root),
            dispose_marker: format!("{}.dispose(", config.namespace.root),
        }
    }

    /// Walk the input roots and populate the graph.
    pub fn process(&self, input_dirs: &[PathBuf], graph: &mut DependencyGraph) -> Result<()> {
        let mut want_root: Vec<PathBuf> = Vec::new();
        let mut want_dispose: Vec<PathBuf> = Vec::new();

        for input_dir in input_dirs {
            if !input_dir.is_dir() {
                return Err(Error::InputDirNotFound {
                    path: input_dir.clone(),
                });
            }
            for path in fsutil::relevant_js_files(input_dir, &self.filter) {
                let Some(decls) = self.process_file(&path)? else {
                    continue;
                };
                if decls.wants_root {
                    want_root.push(path.clone());
                }
                if decls.wants_dispose {
                    want_dispose.push(path.clone());
                }
                graph.insert_file(&path, decls.provides, decls.requires)?;
            }
        }

        for (file, namespace, module) in &self.extra_provides {
            let path = input_dirs[0].join(file);
            let kind = if *module {
                ProvideKind::Module
            } else {
                ProvideKind::Provide
            };
            graph.insert_file(
                &path,
                vec![ProvideDecl {
                    namespace: namespace.clone(),
                    kind,
                    exports: vec![],
                    matched_text: None,
                }],
                vec![],
            )?;
        }

        // The bare root namespace and the root's dispose helper are used
        // without being required; synthesize those requires now that we
        // know whether the tree provides them at all.
        let dispose_namespace = format!("{}.dispose", self.root);
        if graph.provider(&self.root).is_some() {
            for file in want_root {
                graph.push_require(
                    &file,
                    RequireDecl::implicit_strict(&self.root, Some(self.root.clone())),
                );
            }
        } else {
            debug!(root = %self.root, "root namespace has no provider, skipping implicit requires");
        }
        if graph.provider(&dispose_namespace).is_some() {
            for file in want_dispose {
                graph.push_require(
                    &file,
                    RequireDecl::implicit_strict(&dispose_namespace, None),
                );
            }
        }

        Ok(())
    }

    fn process_file(&self, path: &Path) -> Result<Option<FileDecls>> {
        let content = fsutil::read_source(path)?;

        if content.contains(&self.test_only_marker) {
            warn!(file = %path.display(), "file seems to be test-only, skipping");
            return Ok(None);
        }

        let provides = self.parse_provides(&content)?;
        if provides.is_empty() {
            info!(file = %path.display(), "file does not provide anything, skipping");
            return Ok(None);
        }

        let mut requires = self.parse_requires(&content)?;
        let lenient = self.lenient_requires(&content, &provides, &requires);
        requires.extend(lenient);

        let provides_root = provides.iter().any(|p| p.namespace == self.root);
        let provides_dispose = provides
            .iter()
            .any(|p| p.namespace == format!("{}.dispose", self.root));

        Ok(Some(FileDecls {
            wants_root: !provides_root,
            wants_dispose: content.contains(&self.dispose_marker) && !provides_dispose,
            provides,
            requires,
        }))
    }

    fn parse_provides(&self, content: &str) -> Result<Vec<ProvideDecl>> {
        let mut provides = Vec::new();
        for captures in self.provide_pattern.captures_iter(content) {
            let matched = captures.get(0).unwrap().as_str();
            let namespace = captures.get(2).unwrap().as_str();
            let kind = if &captures[1] == "module" {
                ProvideKind::Module
            } else {
                ProvideKind::Provide
            };
            let exports = if kind == ProvideKind::Module {
                let exports = extract_module_exports(content);
                if exports.is_empty() {
                    return Err(Error::MissingModuleExports {
                        namespace: namespace.to_string(),
                    });
                }
                exports
            } else {
                vec![]
            };
            provides.push(ProvideDecl {
                namespace: namespace.to_string(),
                kind,
                exports,
                matched_text: Some(matched.to_string()),
            });
        }
        Ok(provides)
    }

    fn parse_requires(&self, content: &str) -> Result<Vec<RequireDecl>> {
        let mut requires = Vec::new();
        for captures in self.require_pattern.captures_iter(content) {
            let matched = captures.get(0).unwrap().as_str();
            let namespace = captures.get(3).unwrap().as_str();
            let forward = &captures[2] != "require";

            let mut alias = None;
            let mut members = Vec::new();
            if let Some(binding) = captures.get(1) {
                let binding = binding.as_str();
                if let Some(inner) = binding
                    .strip_prefix('{')
                    .and_then(|b| b.strip_suffix('}'))
                {
                    if inner.contains(',') {
                        return Err(Error::UnsupportedDestructuredImport {
                            text: matched.to_string(),
                        });
                    }
                    members.push(parse_destructured_member(inner));
                } else {
                    alias = Some(binding.to_string());
                }
            }

            requires.push(RequireDecl::explicit(
                namespace, alias, members, forward, matched,
            ));
        }
        Ok(requires)
    }

    /// Best-effort scan of documentation type annotations for dotted
    /// identifiers that look like namespace references. Anything not
    /// already declared becomes an advisory lenient require.
    fn lenient_requires(
        &self,
        content: &str,
        provides: &[ProvideDecl],
        requires: &[RequireDecl],
    ) -> Vec<RequireDecl> {
        let declared: BTreeSet<&str> = requires
            .iter()
            .map(|r| r.namespace.as_str())
            .chain(provides.iter().map(|p| p.namespace.as_str()))
            .collect();

        let mut seen = BTreeSet::new();
        for doc in DOC_COMMENT.find_iter(content) {
            for type_expr in TYPE_EXPR.captures_iter(doc.as_str()) {
                for token in DOTTED_ID.find_iter(&type_expr[1]) {
                    let token = token.as_str();
                    // Only root-anchored references can be namespaces the
                    // graph could ever resolve.
                    if !token.starts_with(&format!("{}.", self.root)) {
                        continue;
                    }
                    if declared.contains(token) || token == self.root {
                        continue;
                    }
                    seen.insert(token.to_string());
                }
            }
        }
        seen.into_iter()
            .map(|namespace| RequireDecl::implicit_lenient(&namespace))
            .collect()
    }
}

/// `{foo}` imports foo; `{foo: localName}` binds it under another name.
fn parse_destructured_member(inner: &str) -> ExportEntry {
    match inner.split_once(':') {
        Some((external, internal)) => ExportEntry::aliased(external, internal),
        None => ExportEntry::new(inner),
    }
}

/// Extract the export surface of a module-style file: inline dotted
/// exports and/or one export list (object literal or single default name).
pub fn extract_module_exports(content: &str) -> Vec<ModuleExport> {
    let mut exports = Vec::new();
    for captures in INLINE_EXPORT.captures_iter(content) {
        let name = captures[1].trim();
        exports.push(ModuleExport {
            entity: ExportEntry::new(name),
            inline: true,
            matched_text: captures[0].to_string(),
        });
    }
    for captures in LIST_EXPORT.captures_iter(content) {
        let raw = BLOCK_COMMENT.replace_all(&captures[1], "");
        let raw = LINE_COMMENT.replace_all(&raw, "");
        let full_match = captures[0].to_string();
        for entry in raw.split(',') {
            if entry.trim().is_empty() {
                continue;
            }
            exports.push(ModuleExport {
                entity: normalize_export_entry(entry),
                inline: false,
                matched_text: full_match.clone(),
            });
        }
    }
    exports
}

/// `name` exports name; `external: internal` exports an aliased pair.
fn normalize_export_entry(entry: &str) -> ExportEntry {
    match entry.split_once(':') {
        Some((external, internal)) => ExportEntry::aliased(external, internal),
        None => ExportEntry::new(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::RequireKind;

    fn pass() -> ReaderPass {
        ReaderPass::new(&Config::default())
    }

    #[test]
    fn test_extract_exports_object_literal() {
        let exports = extract_module_exports("exports = {\ntest:test\n};");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].entity.external, "test");
        assert_eq!(exports[0].entity.internal, "test");
        assert!(!exports[0].inline);

        let exports = extract_module_exports("exports = {\ntest:test, \nsome:some\n};");
        let names: Vec<_> = exports.iter().map(|e| e.entity.external.as_str()).collect();
        assert_eq!(names, vec!["test", "some"]);
    }

    #[test]
    fn test_extract_exports_strips_comments() {
        let content = "exports = {\n  foo, // public API\n  /* legacy */ bar\n};";
        let exports = extract_module_exports(content);
        let names: Vec<_> = exports.iter().map(|e| e.entity.internal.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar"]);
    }

    #[test]
    fn test_extract_exports_inline() {
        let exports = extract_module_exports("exports.doThing = function() {};\n");
        assert_eq!(exports.len(), 1);
        assert!(exports[0].inline);
        assert_eq!(exports[0].entity.internal, "doThing");
        assert_eq!(exports[0].matched_text, "exports.doThing =");
    }

    #[test]
    fn test_extract_exports_single_default() {
        let exports = extract_module_exports("exports = Foo;\n");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].entity.internal, "Foo");
    }

    #[test]
    fn test_parse_provides_and_modules() {
        let pass = pass();
        let provides = pass
            .parse_provides("goog.provide('a.b.C');\ngoog.provide('a.b.D');\n")
            .unwrap();
        assert_eq!(provides.len(), 2);
        assert_eq!(provides[0].namespace, "a.b.C");
        assert_eq!(provides[0].kind, ProvideKind::Provide);
        assert_eq!(
            provides[0].matched_text.as_deref(),
            Some("goog.provide('a.b.C');")
        );
    }

    #[test]
    fn test_module_without_exports_is_fatal() {
        let pass = pass();
        let err = pass.parse_provides("goog.module('a.b.C');\n").unwrap_err();
        assert!(matches!(err, Error::MissingModuleExports { .. }));
    }

    #[test]
    fn test_parse_requires_shapes() {
        let pass = pass();
        let content = "goog.require('a.b.C');\n\
                       const util = goog.require('a.util');\n\
                       const {helper} = goog.require('a.helpers');\n\
                       goog.forwardDeclare('a.b.Later');\n";
        let requires = pass.parse_requires(content).unwrap();
        assert_eq!(requires.len(), 4);
        assert_eq!(requires[0].namespace, "a.b.C");
        assert_eq!(requires[0].alias(), None);
        assert_eq!(requires[1].alias(), Some("util"));
        assert_eq!(requires[2].members()[0].internal, "helper");
        assert!(matches!(
            requires[3].kind,
            RequireKind::Explicit { forward: true, .. }
        ));
    }

    #[test]
    fn test_multi_member_destructuring_is_fatal() {
        let pass = pass();
        let err = pass
            .parse_requires("const {a, b} = goog.require('a.b');\n")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDestructuredImport { .. }));
    }

    #[test]
    fn test_lenient_requires_from_doc_types() {
        let pass = pass();
        let content = "goog.provide('a.b');\n\
                       /** @param {goog.dom.DomHelper} helper\n * @return {goog.math.Size} */\n\
                       a.b.f = function(helper) {};\n";
        let provides = pass.parse_provides(content).unwrap();
        let requires = pass.parse_requires(content).unwrap();
        let lenient = pass.lenient_requires(content, &provides, &requires);
        let namespaces: Vec<_> = lenient.iter().map(|r| r.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["goog.dom.DomHelper", "goog.math.Size"]);
        assert!(lenient.iter().all(|r| r.is_lenient()));
    }

    #[test]
    fn test_lenient_skips_declared_namespaces() {
        let pass = pass();
        let content = "goog.provide('a.b');\n\
                       goog.require('goog.dom.DomHelper');\n\
                       /** @type {goog.dom.DomHelper} */\n\
                       a.b.h;\n";
        let provides = pass.parse_provides(content).unwrap();
        let requires = pass.parse_requires(content).unwrap();
        let lenient = pass.lenient_requires(content, &provides, &requires);
        assert!(lenient.is_empty());
    }

    #[test]
    fn test_relevant_file_filter() {
        let filter = FilterConfig::default();
        assert!(fsutil::is_relevant_js_file(Path::new("lib/dom/dom.js"), &filter));
        assert!(!fsutil::is_relevant_js_file(Path::new("lib/dom/dom_test.js"), &filter));
        assert!(!fsutil::is_relevant_js_file(Path::new("lib/testing/mock.js"), &filter));
        assert!(!fsutil::is_relevant_js_file(Path::new("lib/dom/dom.css"), &filter));
    }

    #[test]
    fn test_implicit_root_require_when_root_is_provided() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("goog.js"),
            "goog.provide('goog');\ngoog.global = this;\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.js"),
            "goog.provide('a');\na.x = goog.global;\n",
        )
        .unwrap();

        let pass = pass();
        let mut graph = DependencyGraph::new();
        pass.process(&[dir.path().to_path_buf()], &mut graph)
            .unwrap();

        let a = graph.provider("a").unwrap().to_path_buf();
        let requires = graph.requires(&a);
        assert_eq!(requires.len(), 1);
        assert_eq!(requires[0].namespace, "goog");
        assert_eq!(requires[0].alias(), Some("goog"));
        // The root's own file does not require itself
        let root = graph.provider("goog").unwrap().to_path_buf();
        assert!(graph.requires(&root).is_empty());
    }

    #[test]
    fn test_process_populates_graph() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.js"),
            "goog.provide('a');\ngoog.require('b');\na.run = function() {};\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("b.js"), "goog.provide('b');\nb.x = 1;\n").unwrap();
        std::fs::write(dir.path().join("skipped.js"), "goog.setTestOnly();\n").unwrap();

        let pass = pass();
        let mut graph = DependencyGraph::new();
        pass.process(&[dir.path().to_path_buf()], &mut graph)
            .unwrap();

        assert_eq!(graph.namespace_count(), 2);
        let provider = graph.provider("a").unwrap().to_path_buf();
        assert!(provider.ends_with("a.js"));
        let requires = graph.requires(&provider);
        assert_eq!(requires.len(), 1);
        assert_eq!(requires[0].namespace, "b");
    }
}
