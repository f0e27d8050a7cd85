//! Statement-boundary scanner
//!
//! Finds the end of the current statement/definition in raw source text
//! without parsing it: strings, comments and regex literals are skipped as
//! atomic spans, bracket nesting is tracked for `()[]{}`, and the statement
//! ends at a top-level `;` or at a closing brace followed by a blank line.
//!
//! Every pass that needs to isolate the body of a declaration calls
//! [`statement_end`] — boundary logic is never re-derived with pattern
//! matching elsewhere.

use crate::core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TopLevel,
    LineComment,
    BlockComment,
    SingleQuoted,
    DoubleQuoted,
    Regex,
    RegexClass,
}

/// Scan forward from `start` and return the exclusive end offset of the
/// current statement/definition.
///
/// Termination requires bracket depth 0 and either a `;` or a `}` whose
/// next two characters are newlines. Reaching end-of-text first means the
/// input uses a construct outside the supported grammar subset; that is a
/// hard error — swallowing it would silently corrupt later rewrites.
pub fn statement_end(text: &str, start: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut pos = start;
    let mut nesting: i32 = 0;
    let mut state = State::TopLevel;

    while pos < bytes.len() {
        let current = bytes[pos];
        match state {
            State::LineComment => {
                if current == b'\n' {
                    state = State::TopLevel;
                }
            }
            State::BlockComment => {
                if current == b'*' && bytes.get(pos + 1) == Some(&b'/') {
                    pos += 1;
                    state = State::TopLevel;
                }
            }
            State::SingleQuoted => {
                if current == b'\\' {
                    pos += 1;
                } else if current == b'\'' {
                    state = State::TopLevel;
                }
            }
            State::DoubleQuoted => {
                if current == b'\\' {
                    pos += 1;
                } else if current == b'"' {
                    state = State::TopLevel;
                }
            }
            State::Regex => {
                if current == b'\\' {
                    pos += 1;
                } else if current == b'[' {
                    state = State::RegexClass;
                } else if current == b'/' {
                    state = State::TopLevel;
                }
            }
            State::RegexClass => {
                if current == b'\\' {
                    pos += 1;
                } else if current == b']' {
                    state = State::Regex;
                }
            }
            State::TopLevel => {
                if nesting == 0
                    && (current == b';'
                        || (current == b'}'
                            && bytes.get(pos + 1) == Some(&b'\n')
                            && bytes.get(pos + 2) == Some(&b'\n')))
                {
                    return Ok(pos + 1);
                }
                match current {
                    b'/' => match bytes.get(pos + 1) {
                        Some(b'/') => state = State::LineComment,
                        Some(b'*') => state = State::BlockComment,
                        _ => {
                            if is_regex_start(bytes, pos) {
                                state = State::Regex;
                            }
                        }
                    },
                    b'\'' => state = State::SingleQuoted,
                    b'"' => state = State::DoubleQuoted,
                    b'(' | b'[' | b'{' => nesting += 1,
                    b')' | b']' | b'}' => nesting -= 1,
                    _ => {}
                }
            }
        }
        pos += 1;
    }

    let context_start = start.saturating_sub(30);
    Err(Error::ScannerOverrun {
        context: text
            .get(context_start..)
            .unwrap_or("")
            .chars()
            .take(80)
            .collect(),
    })
}

/// Division/regex disambiguation for a `/` seen at top level: it is NOT the
/// start of a regex literal if the previous non-space character is an
/// identifier/number tail (division) or the next character is `=`
/// (division-assignment).
fn is_regex_start(bytes: &[u8], slash_pos: usize) -> bool {
    if bytes.get(slash_pos + 1) == Some(&b'=') {
        return false;
    }
    let mut back = slash_pos;
    while back > 0 {
        back -= 1;
        let prev = bytes[back];
        if prev == b' ' || prev == b'\t' {
            continue;
        }
        return !(prev.is_ascii_alphanumeric()
            || prev == b'_'
            || prev == b'$'
            || prev == b')'
            || prev == b']');
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_of(text: &str) -> usize {
        statement_end(text, 0).unwrap()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(end_of("var x = 1; var y = 2;"), 10);
    }

    #[test]
    fn test_semicolon_in_string_is_skipped() {
        let text = "var x = 'a;b' + \"c;d\"; next();";
        assert_eq!(end_of(text), 22);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let text = r"var x = 'it\'s;fine'; rest();";
        assert_eq!(end_of(text), 21);
    }

    #[test]
    fn test_semicolon_in_comments_is_skipped() {
        let text = "var x = 1 + // no; end here\n 2; done();";
        assert_eq!(end_of(text), 31);
        let text = "var x = /* a;b */ 1; done();";
        assert_eq!(end_of(text), 20);
    }

    #[test]
    fn test_nested_brackets() {
        let text = "foo = function(a, b) { bar(1); baz([2, 3]); }; next();";
        assert_eq!(end_of(text), 46);
    }

    #[test]
    fn test_regex_literal_with_semicolon() {
        let text = "x = /;[;]/; done();";
        assert_eq!(end_of(text), 11);
    }

    #[test]
    fn test_division_is_not_regex() {
        // 'a / b' must not open a regex span that would swallow the ';'
        assert_eq!(end_of("x = a / b; done();"), 10);
        assert_eq!(end_of("x /= 2; done();"), 7);
    }

    #[test]
    fn test_brace_blank_line_terminates() {
        let text = "}\n\nnext.thing = 1;";
        assert_eq!(end_of(text), 1);
    }

    #[test]
    fn test_overrun_is_an_error() {
        let err = statement_end("var x = (1 + 2", 0).unwrap_err();
        assert!(matches!(err, Error::ScannerOverrun { .. }));
    }
}
