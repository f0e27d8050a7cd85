//! Local-alias allocation for imported namespaces
//!
//! Given a dotted namespace and the names already taken in a file, find a
//! short local binding that collides with nothing: not a forbidden name,
//! not shadowed by an existing `var`/`let`/`const`, and not itself used as
//! a qualified-call prefix elsewhere in the text. The search walks outward
//! through the namespace segments and falls back to pluralization and
//! underscore prefixes; the tie-break order is load-bearing for output
//! compatibility and must not be reordered.

use crate::core::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;

/// Replacements for common short words whose plain form is always taken.
const DEFAULT_REPLACEMENTS: &[(&str, &str)] = &[("string", "strings"), ("number", "numbers")];

/// The segment walk has no proven termination bound on pathological
/// input, so each phase aborts after this many extensions.
const MAX_EXTENSIONS: usize = 32;

fn default_replacement(name: &str) -> Option<&'static str> {
    DEFAULT_REPLACEMENTS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

fn is_shadowed_by_variable(text: &str, name: &str) -> bool {
    text.contains(&format!("var {name}"))
        || text.contains(&format!("let {name}"))
        || text.contains(&format!("const {name}"))
}

fn is_qualified_call_prefix(text: &str, name: &str) -> bool {
    Regex::new(&format!(r"[^.\w$]{}\.", regex::escape(name)))
        .unwrap()
        .is_match(text)
}

/// Deterministic, collision-free local alias for `namespace` in `text`.
///
/// Phase one resolves forbidden-name and variable-shadowing collisions:
/// default replacement first, then prepending the next-outer namespace
/// segment, then an underscore prefix once segments run out. Phase two
/// re-checks the survivor against qualified-call prefixes actually present
/// in the text (`candidate.something` means the short name is itself used
/// as a namespace) and extends again, falling back to pluralization and
/// then underscore prefixing.
pub fn find_safe_reference(
    text: &str,
    namespace: &str,
    forbidden: &HashSet<&str>,
) -> Result<String> {
    let parts: Vec<&str> = namespace.split('.').collect();
    let mut candidate = parts[parts.len() - 1].to_string();
    let needs_uppercase = is_class_name(&candidate);

    let mut part_index = parts.len() as isize - 1;
    let mut extensions = 0;
    while forbidden.contains(candidate.as_str()) || is_shadowed_by_variable(text, &candidate) {
        extensions += 1;
        if extensions > MAX_EXTENSIONS {
            return Err(Error::AliasAllocationFailed {
                namespace: namespace.to_string(),
            });
        }
        if let Some(replacement) = default_replacement(&candidate) {
            candidate = replacement.to_string();
            continue;
        }
        part_index -= 1;
        if part_index >= 0 {
            candidate = format!("{}{candidate}", parts[part_index as usize]);
        } else {
            candidate = format!("_{candidate}");
        }
    }

    extensions = 0;
    while is_qualified_call_prefix(text, &candidate) {
        extensions += 1;
        if extensions > MAX_EXTENSIONS {
            return Err(Error::AliasAllocationFailed {
                namespace: namespace.to_string(),
            });
        }
        part_index -= 1;
        if part_index >= 0 {
            candidate = format!("{}_{candidate}", parts[part_index as usize]);
        } else if !candidate.ends_with('s') {
            candidate.push('s');
        } else {
            candidate = format!("_{candidate}");
        }
    }

    if needs_uppercase {
        candidate = capitalize(&candidate);
    }
    Ok(candidate)
}

pub fn is_class_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
