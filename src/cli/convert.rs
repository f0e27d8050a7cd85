//! The convert command: the full pipeline, stage by stage
//!
//! Stage order matters: the cycle breaker and class converter change the
//! declaration shapes on disk, so the reader runs a second time on the
//! output tree before the namespace rewriter sees it.

use crate::classes::ClassPass;
use crate::cli::ConvertArgs;
use crate::core::config::Config;
use crate::core::fsutil;
use crate::merge::MergePass;
use crate::read::{DependencyGraph, ReaderPass};
use crate::rewrite::RewritePass;
use crate::select;
use anyhow::{bail, Context};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the convert command
pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref())
        .context("failed to load configuration")?;
    let reader = ReaderPass::new(&config);

    let mut graph = DependencyGraph::new();
    reader.process(&args.input, &mut graph)?;
    if graph.is_empty() {
        bail!("no provided namespaces found in input");
    }
    info!(namespaces = graph.namespace_count(), "reader pass complete");

    let selected: BTreeSet<PathBuf> = match &args.roots {
        Some(roots_file) => {
            let roots = read_root_namespaces(roots_file)?;
            let selected = select::select(&graph, &roots, args.include_tests)?;
            info!(
                roots = roots.len(),
                files = selected.len(),
                "selection complete"
            );
            selected
        }
        None => graph.files().map(Path::to_path_buf).collect(),
    };

    fsutil::copy_files(&selected, &args.input[0], &args.output)
        .context("failed to copy selected files")?;

    MergePass::new(&config.namespace.root).process(&args.output, &config.cycle_groups)?;
    ClassPass::new(&config.namespace.root).process(&args.output, &config.filter)?;

    // The class converter changed provide/member shapes; re-index before
    // rewriting.
    let mut converted_graph = DependencyGraph::new();
    reader.process(&[args.output.clone()], &mut converted_graph)?;
    converted_graph.validate()?;

    RewritePass::new(&config).process(&converted_graph)?;

    info!(files = selected.len(), "conversion finished");
    Ok(())
}

/// One namespace per line; blank lines and `#` comments are skipped.
pub(crate) fn read_root_namespaces(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read root namespaces from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_end_to_end_convert() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let out_dir = output.path().join("lib");

        write(
            input.path(),
            "widget.js",
            "goog.provide('ui.Widget');\n\
             goog.require('util.dom');\n\n\
             /**\n * @constructor\n */\n\
             ui.Widget = function(id) {\n  this.id = id;\n};\n\n\
             /**\n * @return {number}\n */\n\
             ui.Widget.prototype.size = function() {\n  return util.dom.count();\n};\n",
        );
        write(
            input.path(),
            "dom.js",
            "goog.provide('util.dom');\n\n\
             util.dom.count = function() {\n  return 1;\n};\n",
        );
        write(
            input.path(),
            "unrelated.js",
            "goog.provide('other.thing');\n\nother.thing.x = 1;\n",
        );

        let roots = input.path().join("roots.txt");
        std::fs::write(&roots, "ui.Widget\n").unwrap();

        run(ConvertArgs {
            input: vec![input.path().to_path_buf()],
            output: out_dir.clone(),
            roots: Some(roots),
            include_tests: false,
            config: None,
        })
        .unwrap();

        // Selection excluded the unrelated file
        assert!(!out_dir.join("unrelated.js").exists());

        let widget = std::fs::read_to_string(out_dir.join("widget.js")).unwrap();
        assert!(widget.contains("import * as dom from './dom.js';"));
        assert!(widget.contains("let Widget = class {"));
        assert!(widget.contains("constructor(id) {"));
        assert!(widget.contains("size() {"));
        assert!(widget.contains("return dom.count();"));
        assert!(widget.contains("export {Widget};"));
        assert!(!widget.contains("goog.provide"));
        assert!(!widget.contains("goog.require"));
        assert!(!widget.contains("ui.Widget"));

        let dom = std::fs::read_to_string(out_dir.join("dom.js")).unwrap();
        assert!(dom.contains("let count = function()"));
        assert!(dom.contains("export {count};"));
    }

    #[test]
    fn test_convert_merges_cycle_groups() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let out_dir = output.path().join("lib");

        write(
            input.path(),
            "a.js",
            "goog.provide('cycle.a');\n\
             goog.require('cycle.b');\n\n\
             cycle.a.ping = function() {\n  return cycle.b.pong();\n};\n",
        );
        write(
            input.path(),
            "b.js",
            "goog.provide('cycle.b');\n\
             goog.require('cycle.a');\n\n\
             cycle.b.pong = function() {\n  return cycle.a.ping();\n};\n",
        );

        let config_file = input.path().join("esmigrate.toml");
        std::fs::write(
            &config_file,
            "[[cycles]]\ntarget = \"a.js\"\nfiles = [\"a.js\", \"b.js\"]\n",
        )
        .unwrap();

        run(ConvertArgs {
            input: vec![input.path().to_path_buf()],
            output: out_dir.clone(),
            roots: None,
            include_tests: false,
            config: Some(config_file),
        })
        .unwrap();

        assert!(!out_dir.join("b.js").exists());
        let merged = std::fs::read_to_string(out_dir.join("a.js")).unwrap();
        assert!(!merged.contains("import"));
        assert!(!merged.contains("goog.require"));
        assert!(merged.contains("let ping = function()"));
        assert!(merged.contains("let pong = function()"));
        assert!(merged.contains("return pong();"));
        assert!(merged.contains("export {ping, pong};"));
    }

    #[test]
    fn test_read_root_namespaces_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roots.txt");
        std::fs::write(&path, "# entry points\nui.Widget\n\nutil.dom\n").unwrap();
        assert_eq!(
            read_root_namespaces(&path).unwrap(),
            vec!["ui.Widget", "util.dom"]
        );
    }
}
