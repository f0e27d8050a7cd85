//! Namespace rewriter (the converting pass)
//!
//! Per file: strips provide/module headers, turns the export surface into
//! standard named exports, converts require/forward-declare declarations
//! into import statements with collision-free local aliases, and rewrites
//! every fully-qualified reference to the local name. Runs last, on the
//! re-read graph, after cycle merging and class conversion have settled
//! the declaration shapes.

pub mod alias;

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::fsutil;
use crate::read::{DependencyGraph, ExportEntry, ProvideDecl, RequireDecl};
use crate::text;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Identifiers that must never be chosen as local aliases and member names
/// that need an underscore escape when turned into local bindings.
pub(crate) const RESERVED_KEYWORDS: &[&str] = &[
    "Array",
    "Date",
    "Error",
    "File",
    "LogRecord",
    "Logger",
    "Map",
    "Notification",
    "Object",
    "ServiceWorker",
    "Set",
    "array",
    "console",
    "document",
    "localStorage",
    "number",
    "parseInt",
    "string",
    "window",
];

/// Root-namespace members that stay valid after conversion (they live on
/// the imported root module object); references to them are never
/// prefix-stripped.
const ROOT_UTILITY_MEMBERS: &[&str] = &[
    "global",
    "require",
    "isString",
    "isBoolean",
    "isNumber",
    "define",
    "DEBUG",
    "LOCALE",
    "TRUSTED_SITE",
    "STRICT_MODE_COMPATIBLE",
    "DISALLOW_TEST_ONLY_CODE",
    "module.get",
    "setTestOnly",
    "forwardDeclare",
    "getObjectByName",
    "basePath",
    "addSingletonGetter",
    "typeOf",
    "isArray",
    "isArrayLike",
    "isDateLike",
    "isFunction",
    "isObject",
    "getUid",
    "hasUid",
    "removeUid",
    "mixin",
    "now",
    "globalEval",
    "getCssName",
    "setCssNameMapping",
    "getMsg",
    "getMsgWithFallback",
    "exportSymbol",
    "exportProperty",
    "isDef",
    "isNull",
    "isDefAndNotNull",
    "globalize",
    "nullFunction",
    "abstractMethod",
    "removeHashCode",
    "getHashCode",
    "cloneObject",
    "bind",
    "partial",
    "inherits",
    "base",
    "scope",
    "defineClass",
    "declareModuleId",
    "tagUnsealableClass",
];

/// `@suppress {extraRequire}` changes meaning in target syntax.
static SUPPRESS_EXTRA_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@suppress\s*\{extraRequire\}").unwrap());

/// The compile-time `COMPILED` flag folds to `true` in converted output.
static COMPILED_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\W)COMPILED(\W)").unwrap());

pub struct RewritePass {
    root: String,
    dispose_namespace: String,
    remaining_pattern: Regex,
    define_let_pattern: Regex,
    define_bare_pattern: Regex,
    legacy_namespace_pattern: Regex,
    root_allow_prefixes: Vec<String>,
    root_file_token: String,
}

impl RewritePass {
    pub fn new(config: &Config) -> Self {
        let root = config.namespace.root.clone();
        let escaped = regex::escape(&root);
        Self {
            dispose_namespace: format!("{root}.dispose"),
            remaining_pattern: Regex::new(&format!(r"{escaped}\.[\w$.]*[\w$]")).unwrap(),
            define_let_pattern: Regex::new(&format!(
                r"let\s+([\w$]+)\s*=\s*{escaped}\s*\.\s*define\s*\("
            ))
            .unwrap(),
            define_bare_pattern: Regex::new(&format!(
                r"(?m)^{escaped}\s*\.\s*define\s*\(\s*'([^)]+\.([^).]+))',"
            ))
            .unwrap(),
            legacy_namespace_pattern: Regex::new(&format!(
                r"{escaped}\.module\.declareLegacyNamespace\(\);?\n?"
            ))
            .unwrap(),
            root_allow_prefixes: ROOT_UTILITY_MEMBERS
                .iter()
                .map(|member| format!("{root}.{member}"))
                .collect(),
            root_file_token: format!("{root}.js"),
            root,
        }
    }

    /// Rewrite every providing file in the graph in place.
    pub fn process(&self, graph: &DependencyGraph) -> Result<()> {
        let files: Vec<PathBuf> = graph.files().map(Path::to_path_buf).collect();
        for file in files {
            self.process_file(&file, graph)?;
        }
        Ok(())
    }

    fn process_file(&self, file: &Path, graph: &DependencyGraph) -> Result<()> {
        let mut content = fsutil::read_source(file)?;
        let provides = graph.provides(file);
        let is_module = provides.iter().any(|p| p.is_module());

        let short_exports: Vec<String>;
        if is_module {
            let module = &provides[0];
            if module.matched_text.is_none() {
                // Already in target syntax
                return Ok(());
            }
            short_exports = module
                .exports
                .iter()
                .map(|e| e.entity.internal.clone())
                .collect();
            content = self.convert_module_file(module, content);
        } else {
            match self.convert_provide_file(provides, file, content) {
                Some((converted, exports)) => {
                    content = converted;
                    short_exports = exports;
                }
                None => return Ok(()),
            }
        }

        let requires = self.extend_requires(file, graph, &content);
        content = self.replace_requires(file, content, requires, graph, &short_exports)?;
        content = SUPPRESS_EXTRA_REQUIRE.replace_all(&content, "").to_string();

        // Namespaces of non-exported elements that survived every rewrite:
        // strip the qualification as a last resort (they mostly occur in
        // type comments).
        for namespace in self.remaining_root_namespaces(&content) {
            let short = namespace.rsplit('.').next().unwrap().to_string();
            content = text::replace_fully_qualified(
                &content,
                &text::qualified_name_regex(&namespace),
                &short,
            );
        }

        content = COMPILED_FLAG
            .replace_all(&content, "${1}true${2}")
            .to_string();
        fsutil::write_source(file, &content)
    }

    /// Module-style file: drop the header, reshape inline exports, replace
    /// the export list with a trailing `export {…};`.
    fn convert_module_file(&self, module: &ProvideDecl, content: String) -> String {
        let matched = module.matched_text.as_deref().unwrap_or_default();
        let mut content = remove_with_trailing_whitespace(&content, matched);
        content = self
            .legacy_namespace_pattern
            .replace_all(&content, "")
            .to_string();

        let inline: Vec<_> = module.exports.iter().filter(|e| e.inline).collect();
        let global: Vec<_> = module.exports.iter().filter(|e| !e.inline).collect();

        for export in &inline {
            let name = &export.entity.external;
            content = content.replace(&export.matched_text, &format!("export {name} ="));
            content = content.replace(
                &format!("export {name} = {name}"),
                &format!("export {{{name}}}"),
            );
        }

        let mut exported: Vec<ExportEntry> =
            global.iter().map(|e| e.entity.clone()).collect();
        content = self.fix_define_keywords(content, &mut exported);

        if global.is_empty() {
            return content;
        }

        content = content.replace(&global[0].matched_text, "");
        let clause = exported
            .iter()
            .map(ExportEntry::to_export_fragment)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{content}\n\nexport {{{clause}}};")
    }

    /// Provide-style file: localize every provided namespace (longest
    /// first) and append the synthesized export clause. `None` when no
    /// exports could be inferred — the file is then left unconverted.
    fn convert_provide_file(
        &self,
        provides: &[ProvideDecl],
        file: &Path,
        content: String,
    ) -> Option<(String, Vec<String>)> {
        let mut exports: BTreeSet<ExportEntry> = BTreeSet::new();

        let mut defined: Vec<ExportEntry> = Vec::new();
        let mut content = self.fix_define_keywords(content, &mut defined);
        exports.extend(defined);

        let mut sorted: Vec<&ProvideDecl> = provides.iter().collect();
        sorted.sort_by(|a, b| b.namespace.len().cmp(&a.namespace.len()));
        for provide in sorted {
            let Some(matched) = &provide.matched_text else {
                continue;
            };
            content = self.rewrite_namespace(content, &mut exports, &provide.namespace, true);
            content = remove_with_trailing_whitespace(&content, matched);
        }

        if exports.is_empty() {
            warn!(file = %file.display(), "don't know what to export, skipping");
            return None;
        }
        let short_exports = exports.iter().map(|e| e.internal.clone()).collect();
        let clause = exports
            .iter()
            .map(ExportEntry::to_export_fragment)
            .collect::<Vec<_>>()
            .join(", ");
        Some((format!("{content}\n\nexport {{{clause}}};"), short_exports))
    }

    /// `let X = <root>.define(…)` must use `const`, and a bare
    /// `<root>.define('a.b.NAME', …)` gains a `const NAME = ` binding with
    /// all qualified references rewritten; both names join the exports.
    fn fix_define_keywords(&self, content: String, exports: &mut Vec<ExportEntry>) -> String {
        let mut content = content;
        let snapshot = content.clone();
        for captures in self.define_let_pattern.captures_iter(&snapshot) {
            let name = &captures[1];
            content = content.replace(
                &captures[0],
                &format!("const {name} = {}.define(", self.root),
            );
            exports.push(ExportEntry::new(name));
        }
        let snapshot = content.clone();
        for captures in self.define_bare_pattern.captures_iter(&snapshot) {
            let full_namespace = &captures[1];
            let short = &captures[2];
            content = content.replace(&captures[0], &format!("const {short} = {}", &captures[0]));
            content = text::replace_fully_qualified(
                &content,
                &text::qualified_name_regex(full_namespace),
                short,
            );
            exports.push(ExportEntry::new(short));
        }
        content
    }

    /// Localize one provided namespace: class/enum/typedef shapes become a
    /// single `let Short` binding; otherwise every member assignment gets
    /// its own `let` with public members joining the export set.
    fn rewrite_namespace(
        &self,
        content: String,
        exports: &mut BTreeSet<ExportEntry>,
        namespace: &str,
        is_provided: bool,
    ) -> String {
        let ns_pattern = text::namespace_pattern(namespace);
        let class_shape =
            Regex::new(&format!(r"(?m)^\s*{ns_pattern}\s*=\s*")).unwrap();
        let typedef_shape = Regex::new(&format!(r"(?m)^\s*{ns_pattern};")).unwrap();

        if class_shape.is_match(&content) || typedef_shape.is_match(&content) {
            let parts: Vec<&str> = namespace.split('.').collect();
            let last = parts[parts.len() - 1];
            let mut short = last.to_string();
            if RESERVED_KEYWORDS.contains(&last) && parts.len() > 1 {
                short = format!("{}_{last}", parts[parts.len() - 2]);
            }
            if is_public_by_convention(last) && is_provided {
                exports.insert(ExportEntry::aliased(last, &short));
            }
            let declaration = Regex::new(&format!(r"(?m)^{ns_pattern}( =|;)")).unwrap();
            let content = declaration
                .replace_all(
                    &content,
                    format!("let {}${{1}}", text::replacement_literal(&short)),
                )
                .to_string();
            return text::replace_fully_qualified(
                &content,
                &text::qualified_name_regex(namespace),
                &short,
            );
        }

        let mut content = content;

        let member_assignment =
            Regex::new(&format!(r"(?m)^{ns_pattern}\s*\.\s*([\w$]+)(\s*=[^=])")).unwrap();
        let snapshot = content.clone();
        for captures in member_assignment.captures_iter(&snapshot) {
            let member = &captures[1];
            let mut internal = member.to_string();
            if RESERVED_KEYWORDS.contains(&member) {
                internal = format!("_{member}");
            }
            if is_public_by_convention(member) && is_provided {
                exports.insert(ExportEntry::aliased(member, &internal));
            }
            let matched_line =
                Regex::new(&format!(r"(?m)^{}", regex::escape(&captures[0]))).unwrap();
            content = matched_line
                .replace_all(
                    &content,
                    text::replacement_literal(&format!("let {internal}{}", &captures[2])),
                )
                .to_string();
            content = text::replace_fully_qualified(
                &content,
                &text::qualified_name_regex(&format!("{namespace}.{member}")),
                &internal,
            );
        }

        let member_typedef =
            Regex::new(&format!(r"(?m)^{ns_pattern}\s*\.\s*([\w$]+);")).unwrap();
        let snapshot = content.clone();
        for captures in member_typedef.captures_iter(&snapshot) {
            let name = captures[1].to_string();
            if is_public_by_convention(&name) && is_provided {
                exports.insert(ExportEntry::new(&name));
            }
            content = content.replace(&captures[0], &format!("let {name};"));
            content = text::replace_fully_qualified(
                &content,
                &text::qualified_name_regex(&format!("{namespace}.{name}")),
                &name,
            );
        }

        content
    }

    /// A required namespace's provider may provide longer sub-namespaces
    /// that this file references without requiring them; synthesize those
    /// requires so they get aliases and imports too.
    fn extend_requires(
        &self,
        file: &Path,
        graph: &DependencyGraph,
        content: &str,
    ) -> Vec<RequireDecl> {
        let mut requires = graph.requires(file).to_vec();
        let mut required: BTreeSet<String> =
            requires.iter().map(|r| r.namespace.clone()).collect();

        for namespace in required.clone() {
            let Some(provider) = graph.provider(&namespace) else {
                continue;
            };
            for similar in graph.provides(provider) {
                if similar.namespace != namespace
                    && similar.namespace.starts_with(namespace.as_str())
                    && !required.contains(&similar.namespace)
                    && content.contains(&similar.namespace)
                {
                    required.insert(similar.namespace.clone());
                    requires.push(RequireDecl::implicit_strict(&similar.namespace, None));
                }
            }
        }
        requires
    }

    /// Convert each dependency declaration into an import statement, in
    /// descending namespace-length order so a shorter namespace's alias
    /// search is not corrupted by a longer one still in the text.
    fn replace_requires(
        &self,
        file: &Path,
        content: String,
        mut requires: Vec<RequireDecl>,
        graph: &DependencyGraph,
        short_exports: &[String],
    ) -> Result<String> {
        let mut content = content;
        let mut used: HashSet<String> = short_exports.iter().cloned().collect();
        requires.sort_by(|a, b| b.namespace.len().cmp(&a.namespace.len()));

        for require in requires {
            let provider = graph
                .provider(&require.namespace)
                .ok_or_else(|| Error::NamespaceNotProvided {
                    namespace: require.namespace.clone(),
                })?
                .to_path_buf();
            let relative = fsutil::relative_import_path(file, &provider);

            if let [member] = require.members() {
                let import = if member.internal == member.external {
                    format!("import {{{}}} from '{relative}';", member.internal)
                } else {
                    format!(
                        "import {{{} as {}}} from '{relative}';",
                        member.external, member.internal
                    )
                };
                content =
                    replace_or_insert(content, require.matched_text.as_deref(), &import);
                used.insert(member.internal.clone());
                continue;
            }

            let local = match require.alias() {
                Some(fixed) => fixed.to_string(),
                None => {
                    let allocated = {
                        let mut forbidden: HashSet<&str> =
                            RESERVED_KEYWORDS.iter().copied().collect();
                        forbidden.extend(used.iter().map(String::as_str));
                        alias::find_safe_reference(&content, &require.namespace, &forbidden)?
                    };
                    content = text::replace_fully_qualified(
                        &content,
                        &text::qualified_name_regex(&require.namespace),
                        &allocated,
                    );
                    allocated
                }
            };
            used.insert(local.clone());

            let element = require.namespace.rsplit('.').next().unwrap();
            let import = if self.should_import_as_module(&require.namespace, element) {
                format!("import * as {local} from '{relative}';")
            } else if element == local {
                format!("import {{{local}}} from '{relative}';")
            } else {
                format!("import {{{element} as {local}}} from '{relative}';")
            };
            content = replace_or_insert(content, require.matched_text.as_deref(), &import);
        }
        Ok(content)
    }

    /// Class-like symbols become named imports; everything else is
    /// imported as a whole module object.
    fn should_import_as_module(&self, namespace: &str, element: &str) -> bool {
        if namespace == self.dispose_namespace {
            return false;
        }
        !alias::is_class_name(element)
    }

    /// Fully-qualified root references that survived every rewrite, minus
    /// the still-valid root utilities. Longest first so a shorter prefix
    /// never corrupts a longer namespace.
    fn remaining_root_namespaces(&self, content: &str) -> Vec<String> {
        let mut found: BTreeSet<String> = BTreeSet::new();
        for matched in self.remaining_pattern.find_iter(content) {
            let namespace = matched.as_str();
            if namespace == self.root_file_token
                || namespace == self.root
                || namespace.contains("prototype")
            {
                continue;
            }
            if self
                .root_allow_prefixes
                .iter()
                .any(|prefix| namespace.starts_with(prefix.as_str()))
            {
                continue;
            }
            found.insert(namespace.to_string());
        }
        let mut namespaces: Vec<String> = found.into_iter().collect();
        namespaces.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        if !namespaces.is_empty() {
            debug!(count = namespaces.len(), "stripping remaining root-namespace references");
        }
        namespaces
    }
}

fn is_public_by_convention(name: &str) -> bool {
    !name.ends_with('_')
}

/// Remove the exact span plus any whitespace that followed it.
fn remove_with_trailing_whitespace(content: &str, matched: &str) -> String {
    if matched.is_empty() {
        return content.to_string();
    }
    Regex::new(&format!(r"{}\s*", regex::escape(matched)))
        .unwrap()
        .replace_all(content, "")
        .to_string()
}

/// The import replaces the old declaration span in place; synthesized
/// requires go to the top. A statement that is already present is never
/// emitted twice.
fn replace_or_insert(content: String, matched: Option<&str>, import: &str) -> String {
    match matched {
        Some(matched) => {
            if content.contains(import) {
                content.replacen(matched, "", 1)
            } else {
                content.replacen(matched, import, 1)
            }
        }
        None => {
            if content.contains(import) {
                content
            } else {
                format!("{import}\n{content}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::ReaderPass;

    /// Write `files` into a temp tree, run reader + validation + rewrite,
    /// and return the converted contents by file name.
    fn convert(files: &[(&str, &str)]) -> Vec<(String, String)> {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let config = Config::default();
        let mut graph = DependencyGraph::new();
        ReaderPass::new(&config)
            .process(&[dir.path().to_path_buf()], &mut graph)
            .unwrap();
        graph.validate().unwrap();
        RewritePass::new(&config).process(&graph).unwrap();
        files
            .iter()
            .map(|(name, _)| {
                (
                    name.to_string(),
                    std::fs::read_to_string(dir.path().join(name)).unwrap(),
                )
            })
            .collect()
    }

    fn converted(files: &[(&str, &str)], name: &str) -> String {
        convert(files)
            .into_iter()
            .find(|(n, _)| n == name)
            .unwrap()
            .1
    }

    #[test]
    fn test_provide_class_shape_round_trip() {
        let output = converted(
            &[(
                "c.js",
                "goog.provide('a.b.C');\n\na.b.C = class {\n  constructor(x) {\n    this.x = x;\n  }\n};\n",
            )],
            "c.js",
        );
        assert!(output.contains("let C = class {"));
        assert!(output.trim_end().ends_with("export {C};"));
        assert!(!output.contains("a.b.C ="));
        assert!(!output.contains("goog.provide"));
    }

    #[test]
    fn test_provide_members_become_lets_and_exports() {
        let output = converted(
            &[(
                "util.js",
                "goog.provide('a.util');\n\n\
                 a.util.visible = function() {\n  return 1;\n};\n\n\
                 a.util.hidden_ = function() {\n  return 2;\n};\n\n\
                 x = a.util.visible() + a.util.hidden_();\n",
            )],
            "util.js",
        );
        assert!(output.contains("let visible = function()"));
        assert!(output.contains("let hidden_ = function()"));
        assert!(output.contains("x = visible() + hidden_();"));
        assert!(output.contains("export {visible};"));
        assert!(!output.contains("hidden_,"));
    }

    #[test]
    fn test_reserved_member_name_gets_underscore_escape() {
        let output = converted(
            &[(
                "str.js",
                "goog.provide('a.str');\n\na.str.string = function() {};\n",
            )],
            "str.js",
        );
        assert!(output.contains("let _string = function"));
        assert!(output.contains("export {_string as string};"));
    }

    #[test]
    fn test_require_becomes_named_import_for_class() {
        let files = [
            (
                "widget.js",
                "goog.provide('ui.Widget');\n\
                 goog.require('ui.Base');\n\n\
                 ui.Widget = class extends ui.Base {\n};\n",
            ),
            ("base.js", "goog.provide('ui.Base');\n\nui.Base = class {\n};\n"),
        ];
        let output = converted(&files, "widget.js");
        assert!(output.contains("import {Base} from './base.js';"));
        assert!(output.contains("let Widget = class extends Base {"));
        assert!(!output.contains("goog.require"));
    }

    #[test]
    fn test_require_becomes_module_import_for_lowercase() {
        let files = [
            (
                "app.js",
                "goog.provide('app.main');\n\
                 goog.require('a.util');\n\n\
                 app.main.run = function() {\n  return a.util.visible();\n};\n",
            ),
            (
                "util.js",
                "goog.provide('a.util');\n\na.util.visible = function() {\n  return 1;\n};\n",
            ),
        ];
        let output = converted(&files, "app.js");
        assert!(output.contains("import * as util from './util.js';"));
        assert!(output.contains("return util.visible();"));
    }

    #[test]
    fn test_fixed_alias_and_destructured_member_imports() {
        let files = [
            (
                "app.js",
                "goog.provide('app');\n\
                 const math = goog.require('a.math');\n\
                 const {clamp} = goog.require('a.range');\n\n\
                 app.run = function() {\n  return math.sum(clamp(1));\n};\n",
            ),
            (
                "math.js",
                "goog.provide('a.math');\n\na.math.sum = function() {\n  return 0;\n};\n",
            ),
            (
                "range.js",
                "goog.provide('a.range');\n\na.range.clamp = function(x) {\n  return x;\n};\n",
            ),
        ];
        let output = converted(&files, "app.js");
        assert!(output.contains("import * as math from './math.js';"));
        assert!(output.contains("import {clamp} from './range.js';"));
        assert!(!output.contains("goog.require"));
    }

    #[test]
    fn test_module_file_inline_and_list_exports() {
        let output = converted(
            &[(
                "mod.js",
                "goog.module('a.b.mod');\n\
                 goog.module.declareLegacyNamespace();\n\n\
                 exports.helper = function() {\n  return 1;\n};\n\n\
                 const main = function() {};\n\n\
                 exports = {main};\n",
            )],
            "mod.js",
        );
        assert!(output.contains("export helper = function()"));
        assert!(!output.contains("goog.module"));
        assert!(!output.contains("declareLegacyNamespace"));
        assert!(output.trim_end().ends_with("export {main};"));
    }

    #[test]
    fn test_degenerate_inline_export_collapses() {
        let output = converted(
            &[(
                "m.js",
                "goog.module('a.m');\n\n\
                 const helper = function() {};\n\n\
                 exports.helper = helper;\n",
            )],
            "m.js",
        );
        assert!(output.contains("export {helper};"));
        assert!(!output.contains("export helper = helper"));
    }

    #[test]
    fn test_suppress_directive_and_compiled_flag() {
        let output = converted(
            &[(
                "flag.js",
                "goog.provide('a.flag');\n\n\
                 /** @suppress {extraRequire} */\n\
                 a.flag.on = !COMPILED;\n",
            )],
            "flag.js",
        );
        assert!(!output.contains("@suppress {extraRequire}"));
        assert!(output.contains("let on = !true;"));
    }

    #[test]
    fn test_remaining_root_namespace_is_stripped() {
        let output = converted(
            &[(
                "doc.js",
                "goog.provide('a.doc');\n\n\
                 /** @type {goog.events.BrowserEvent} */\n\
                 a.doc.event = null;\n",
            )],
            "doc.js",
        );
        // The unresolvable lenient reference keeps no root qualification
        assert!(output.contains("{BrowserEvent}"));
        assert!(!output.contains("goog.events.BrowserEvent"));
    }

    #[test]
    fn test_ambiguous_export_list_leaves_file_alone() {
        let input = "goog.provide('a.mystery');\n\n// nothing assigned here\n";
        let output = converted(&[("mystery.js", input)], "mystery.js");
        assert_eq!(output, input);
    }

    #[test]
    fn test_define_gets_const_binding_and_export() {
        let output = converted(
            &[(
                "product.js",
                "goog.provide('ua.product');\n\n\
                 goog.define('ua.product.ASSUME_SAFARI', false);\n\n\
                 ua.product.detect = function() {\n  return ua.product.ASSUME_SAFARI;\n};\n",
            )],
            "product.js",
        );
        assert!(output.contains("const ASSUME_SAFARI = goog.define('ua.product.ASSUME_SAFARI', false);"));
        assert!(output.contains("return ASSUME_SAFARI;"));
        assert!(output.contains("ASSUME_SAFARI, detect"));
    }

    #[test]
    fn test_sub_namespace_requires_are_extended() {
        let files = [
            (
                "app.js",
                "goog.provide('app');\n\
                 goog.require('a.enums');\n\n\
                 app.go = function() {\n  return a.enums.list(a.enums.Special);\n};\n",
            ),
            (
                "enums.js",
                "goog.provide('a.enums');\n\
                 goog.provide('a.enums.Special');\n\n\
                 a.enums.list = function(x) {\n  return [x];\n};\n\n\
                 a.enums.Special = class {\n};\n",
            ),
        ];
        let output = converted(&files, "app.js");
        assert!(output.contains("import {Special} from './enums.js';"));
        assert!(output.contains("import * as enums from './enums.js';"));
        assert!(output.contains("return enums.list(Special);"));
    }

    #[test]
    fn test_provide_typedef_member() {
        let output = converted(
            &[(
                "types.js",
                "goog.provide('a.types');\n\n/** @typedef {string} */\na.types.Name;\n",
            )],
            "types.js",
        );
        assert!(output.contains("let Name;"));
        assert!(output.contains("export {Name"));
    }
}
