//! esmigrate - namespace-style JavaScript to ES6 module migration
//!
//! A batch source-to-source converter for legacy JavaScript organized
//! around provide/require namespace declarations and prototype-based
//! pseudo-classes. Static text analysis only: a statement-boundary
//! scanner, a declaration reader feeding a dependency graph, transitive
//! selection, cycle-group merging, class reconstruction and a namespace
//! rewriter. No parser, no execution.

pub mod classes;
pub mod cli;
pub mod core;
pub mod merge;
pub mod read;
pub mod rewrite;
pub mod scan;
pub mod select;
pub mod text;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::read::{DependencyGraph, ReaderPass};
