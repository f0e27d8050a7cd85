//! Class converter
//!
//! Reconstructs ES6 class syntax from the prototype pseudo-class pattern:
//! a constructor function marked by its doc comment, an inheritance-wiring
//! call, and the prototype member declarations sharing the constructor's
//! namespace. All matched spans are removed and replaced by one generated
//! class block at the constructor's former location. Statement boundaries
//! come from [`crate::scan::statement_end`], never from ad hoc matching.

pub mod member;

pub use member::{ClassDef, ClassMember, ConstructorDecl, InheritsDecl, MemberKind};

use crate::core::config::FilterConfig;
use crate::core::error::Result;
use crate::core::fsutil;
use crate::scan;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Doc comment sub-pattern: `/** … */` up to the first terminator.
const DOC: &str = r"/\*\*[^*]*\*+(?:[^/*][^*]*\*+)*/";

/// Doc comment + optional binding + namespace + `= function`.
static CONSTRUCTOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?m)^({DOC}\s*)((?:const|let|var)\s+)?([\w.]+)(\s?=\s*function)"
    ))
    .unwrap()
});

/// Doc comment + `Ns.prototype.member` + (`;` | `= …`).
static MEMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?m)^({DOC}\s*)([\w.]+)\.prototype\.(\w+)(;|\s?=\s*)"
    ))
    .unwrap()
});

pub struct ClassPass {
    root: String,
    inherits_pattern: Regex,
}

impl ClassPass {
    pub fn new(root_namespace: &str) -> Self {
        let root = regex::escape(root_namespace);
        let inherits_pattern = Regex::new(&format!(
            r"(?m)^{root}\s*\.\s*inherits\(\s*([^,]+),\s*([^)]+)\);"
        ))
        .unwrap();
        Self {
            root: root_namespace.to_string(),
            inherits_pattern,
        }
    }

    /// Convert every relevant file under `root_dir` in place.
    pub fn process(&self, root_dir: &Path, filter: &FilterConfig) -> Result<()> {
        for path in fsutil::relevant_js_files(root_dir, filter) {
            self.process_file(&path)?;
        }
        Ok(())
    }

    fn process_file(&self, path: &Path) -> Result<()> {
        let mut content = fsutil::read_source(path)?;

        let inherits = self.find_inherits(&content);
        let constructors = find_constructors(&content)?;
        let mut members = find_members(&content)?;

        if constructors.is_empty() {
            return Ok(());
        }

        for constructor in constructors {
            let class = ClassDef {
                inherits: inherits.get(&constructor.class_namespace).cloned(),
                members: members
                    .remove(&constructor.class_namespace)
                    .unwrap_or_default(),
                constructor,
            };
            debug!(
                file = %path.display(),
                class = %class.constructor.class_namespace,
                members = class.members.len(),
                "converting pseudo-class"
            );
            let es6_class = class.emit(&self.root);
            if let Some(inherits) = &class.inherits {
                content = content.replace(&inherits.matched_text, "");
            }
            for class_member in &class.members {
                content = content.replace(&class_member.matched_text, "");
            }
            content = content.replace(&class.constructor.matched_text, &es6_class);
        }

        fsutil::write_source(path, &content)
    }

    fn find_inherits(&self, content: &str) -> HashMap<String, InheritsDecl> {
        let mut inherits = HashMap::new();
        for captures in self.inherits_pattern.captures_iter(content) {
            let decl = InheritsDecl {
                matched_text: captures[0].to_string(),
                sub: captures[1].trim().to_string(),
                superclass: captures[2].trim().to_string(),
            };
            inherits.insert(decl.sub.clone(), decl);
        }
        inherits
    }
}

/// The span of a declaration whose trailing group opened an initializer:
/// the definition runs from the group start to the scanner-found end.
fn definition(content: &str, group: &regex::Match, match_end: usize) -> Result<String> {
    if group.as_str() == ";" {
        return Ok(";".to_string());
    }
    let end = scan::statement_end(content, match_end)?;
    Ok(content[group.start()..end].to_string())
}

fn find_constructors(content: &str) -> Result<Vec<ConstructorDecl>> {
    let mut constructors = Vec::new();
    for captures in CONSTRUCTOR_PATTERN.captures_iter(content) {
        let doc = captures.get(1).unwrap();
        if !doc.as_str().contains("@constructor") && !doc.as_str().contains("@interface") {
            continue;
        }
        let whole = captures.get(0).unwrap();
        let tail = captures.get(4).unwrap();
        let body = definition(content, &tail, whole.end())?;
        let matched_text = format!(
            "{}{}",
            &content[whole.start()..tail.start()],
            body
        );
        constructors.push(ConstructorDecl {
            matched_text,
            doc: doc.as_str().to_string(),
            binding: captures.get(2).map(|m| m.as_str().to_string()),
            class_namespace: captures[3].to_string(),
            body,
        });
    }
    Ok(constructors)
}

fn find_members(content: &str) -> Result<HashMap<String, Vec<ClassMember>>> {
    let mut members: HashMap<String, Vec<ClassMember>> = HashMap::new();
    for captures in MEMBER_PATTERN.captures_iter(content) {
        let whole = captures.get(0).unwrap();
        let tail = captures.get(4).unwrap();
        let body = definition(content, &tail, whole.end())?;
        let matched_text = format!(
            "{}{}",
            &content[whole.start()..tail.start()],
            body
        );
        let class_member = ClassMember {
            matched_text,
            doc: captures[1].to_string(),
            class_namespace: captures[2].to_string(),
            name: captures[3].to_string(),
            body,
        };
        members
            .entry(class_member.class_namespace.clone())
            .or_default()
            .push(class_member);
    }
    Ok(members)
}
