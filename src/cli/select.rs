//! The select command: print the transitively-required file set

use crate::cli::convert::read_root_namespaces;
use crate::cli::SelectArgs;
use crate::core::config::Config;
use crate::read::{DependencyGraph, ReaderPass};
use crate::select;
use anyhow::Context;
use tracing::info;

/// Run the select command
pub fn run(args: SelectArgs) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref())
        .context("failed to load configuration")?;

    let mut graph = DependencyGraph::new();
    ReaderPass::new(&config).process(&args.input, &mut graph)?;

    let roots = read_root_namespaces(&args.roots)?;
    let selected = select::select(&graph, &roots, args.include_tests)?;
    info!(files = selected.len(), "selection complete");

    let displayed: Vec<String> = selected
        .iter()
        .map(|file| {
            file.strip_prefix(&args.input[0])
                .unwrap_or(file.as_path())
                .display()
                .to_string()
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&displayed)?);
    } else {
        for file in &displayed {
            println!("{file}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_runs_on_small_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.js"),
            "goog.provide('a');\ngoog.require('b');\na.x = 1;\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("b.js"), "goog.provide('b');\nb.y = 2;\n").unwrap();
        let roots = dir.path().join("roots.txt");
        std::fs::write(&roots, "a\n").unwrap();

        run(SelectArgs {
            input: vec![dir.path().to_path_buf()],
            roots,
            include_tests: false,
            json: true,
            config: None,
        })
        .unwrap();
    }

    #[test]
    fn test_select_fails_on_unknown_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "goog.provide('a');\na.x = 1;\n").unwrap();
        let roots = dir.path().join("roots.txt");
        std::fs::write(&roots, "ghost.namespace\n").unwrap();

        let result = run(SelectArgs {
            input: vec![dir.path().to_path_buf()],
            roots,
            include_tests: false,
            json: false,
            config: None,
        });
        assert!(result.is_err());
    }
}
