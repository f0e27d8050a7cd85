//! CLI command definitions and handlers

pub mod convert;
pub mod select;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_ABOUT: &str = "\
Migrates namespace-declaration JavaScript (provide/require headers and
prototype pseudo-classes) to standard ES6 modules and classes, preserving
runtime behavior. Pure static text transformation — nothing is executed.

QUICK START:
    1. esmigrate select -i lib --roots required-namespaces.txt
    2. esmigrate convert -i lib -o lib-es6 --roots required-namespaces.txt

PIPELINE (convert):
    read declarations -> select transitive closure -> copy -> merge cycle
    groups -> convert pseudo-classes -> re-read -> rewrite namespaces to
    imports/exports

Set ESMIGRATE_LOG=debug for per-file diagnostics.";

/// Migrate namespace-style JavaScript to ES6 modules
#[derive(Parser, Debug)]
#[command(name = "esmigrate")]
#[command(author, version)]
#[command(about = "Migrate namespace-style JavaScript to ES6 modules")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a source tree in full (selection, cycle merge, class
    /// conversion, namespace rewrite)
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Compute the file set transitively required by a root namespace list
    #[command(visible_alias = "s")]
    Select(SelectArgs),
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    esmigrate convert -i closure-library -o converted
    esmigrate convert -i lib -o out --roots required-namespaces.txt
    esmigrate convert -i lib -o out --config esmigrate.toml --include-tests")]
pub struct ConvertArgs {
    /// Input source root(s)
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Output directory (recreated from the selected file set)
    #[arg(short, long)]
    pub output: PathBuf,

    /// File listing externally-required root namespaces, one per line;
    /// without it every indexed file is converted
    #[arg(long)]
    pub roots: Option<PathBuf>,

    /// Also pull in `<namespace>Test` companion namespaces
    #[arg(long)]
    pub include_tests: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the select command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    esmigrate select -i lib --roots required-namespaces.txt
    esmigrate select -i lib --roots roots.txt --json")]
pub struct SelectArgs {
    /// Input source root(s)
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// File listing root namespaces, one per line
    #[arg(long)]
    pub roots: PathBuf,

    /// Also pull in `<namespace>Test` companion namespaces
    #[arg(long)]
    pub include_tests: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
