//! Text utilities shared by the transform passes
//!
//! Qualified-name matching and replacement over raw source text. Namespace
//! references may be wrapped across lines at any dot, so patterns are built
//! segment-wise with optional whitespace around separators.

use once_cell::sync::Lazy;
use regex::Regex;

/// Parameter names inferred from `@param` documentation tags, for members
/// whose source declaration has no parameter list of its own.
static DOC_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\* @param\s?\{[^{}]+(?:\}|\{[^{}]+\}) (\w+)").unwrap()
});

/// Regex source matching `namespace` with optional whitespace around each
/// dot (qualified references are sometimes wrapped across lines).
pub fn namespace_pattern(namespace: &str) -> String {
    namespace
        .split('.')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*\.\s*")
}

/// Escape `$` so a name can be used as a literal regex replacement.
pub fn replacement_literal(name: &str) -> String {
    name.replace('$', "$$")
}

/// Indent every line of `code` by two spaces.
pub fn indent_code(code: &str) -> String {
    static LINE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^").unwrap());
    LINE_START.replace_all(code, "  ").to_string()
}

/// Comma-separated parameter list recovered from a doc comment's `@param`
/// tags.
pub fn inferred_parameter_list(doc: &str) -> String {
    DOC_PARAM
        .captures_iter(doc)
        .map(|captures| captures[1].to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_identifier_adjacent(c: char) -> bool {
    c == '\'' || c == '"' || c == '/' || c == '$' || c == '_' || c.is_alphanumeric()
}

/// Replace every standalone occurrence of the fully-qualified name matched
/// by `pattern` with `replacement`. An occurrence inside a longer
/// identifier, a string literal delimiter or a path fragment (adjacent
/// quote, slash, identifier character) is left alone; a trailing dot is a
/// valid boundary — `a.b.rest` becomes `new.rest` when `a.b` is replaced.
pub fn replace_fully_qualified(content: &str, pattern: &Regex, replacement: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut last = 0;
    for found in pattern.find_iter(content) {
        let before_ok = content[..found.start()]
            .chars()
            .next_back()
            .map_or(true, |c| !is_identifier_adjacent(c));
        let after_ok = content[found.end()..]
            .chars()
            .next()
            .map_or(true, |c| !is_identifier_adjacent(c));
        if before_ok && after_ok {
            result.push_str(&content[last..found.start()]);
            result.push_str(replacement);
            last = found.end();
        }
    }
    result.push_str(&content[last..]);
    result
}

/// Compiled pattern for one fully-qualified name.
pub fn qualified_name_regex(namespace: &str) -> Regex {
    Regex::new(&namespace_pattern(namespace)).unwrap()
}
