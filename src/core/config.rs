//! Configuration management
//!
//! Run configuration is a TOML file (`esmigrate.toml`) with defaults that
//! match the legacy corpus this tool was built against. Input/output
//! directories and the include-tests flag come from the CLI, not the file.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub namespace: NamespaceConfig,
    pub filter: FilterConfig,
    /// Known mutually-requiring namespace groups, merged into one file each
    /// before conversion. Fixed configuration — cycle detection over the
    /// whole graph is out of scope.
    #[serde(rename = "cycles")]
    pub cycle_groups: Vec<CycleGroup>,
    /// Namespaces owned by files that never declare them in source (e.g.
    /// vendored files that are already in target syntax). The rewriter
    /// leaves these files untouched.
    #[serde(rename = "extra_provides")]
    pub extra_provides: Vec<ExtraProvide>,
}

/// A namespace→file binding injected into the graph without a matching
/// header statement in the file itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraProvide {
    /// Path relative to the first input root.
    pub file: String,
    pub namespace: String,
    #[serde(default)]
    pub module: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// The shared root namespace all provide/require statements hang off.
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Path segments that mark a file as irrelevant (generated, style, ...)
    pub exclude_segments: Vec<String>,
    /// File-name suffixes (lowercased) of test-only files
    pub test_suffixes: Vec<String>,
}

/// One cycle group: constituent files (relative to the tree root, in merge
/// order) and the file the concatenation is written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleGroup {
    pub target: String,
    pub files: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: NamespaceConfig::default(),
            filter: FilterConfig::default(),
            cycle_groups: default_cycle_groups(),
            extra_provides: Vec::new(),
        }
    }
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            root: "goog".to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_segments: vec![
                "testing".to_string(),
                "js-cache".to_string(),
                "less".to_string(),
            ],
            test_suffixes: vec![
                "_test.js".to_string(),
                "_perf.js".to_string(),
                "tester.js".to_string(),
                "alltests.js".to_string(),
                "testhelpers.js".to_string(),
                "testing.js".to_string(),
                "relativecommontests.js".to_string(),
                "mockiframeio.js".to_string(),
            ],
        }
    }
}

/// The cycle groups known to exist in the legacy library. Order within a
/// group is the concatenation order.
fn default_cycle_groups() -> Vec<CycleGroup> {
    fn group(target: &str, files: &[&str]) -> CycleGroup {
        CycleGroup {
            target: target.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }
    vec![
        group("date/date.js", &["date/date.js", "date/datelike.js"]),
        group(
            "events/eventhandler.js",
            &[
                "events/eventhandler.js",
                "events/events.js",
                "events/eventwrapper.js",
                "events/listenable.js",
                "events/eventtarget.js",
                "events/listener.js",
                "events/listenermap.js",
            ],
        ),
        group(
            "promise/promise.js",
            &[
                "promise/thenable.js",
                "promise/promise.js",
                "promise/resolver.js",
            ],
        ),
        group(
            "ui/container.js",
            &["ui/container.js", "ui/containerrenderer.js"],
        ),
        group(
            "ui/control.js",
            &["ui/controlrenderer.js", "ui/registry.js", "ui/control.js"],
        ),
        group(
            "ui/menu.js",
            &["ui/menurenderer.js", "ui/menuitem.js", "ui/menu.js"],
        ),
    ]
}

impl Config {
    /// Load configuration from the given file, or the defaults if none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }
}
