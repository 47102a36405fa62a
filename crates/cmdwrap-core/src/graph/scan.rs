//! Source scanners for `require("...")` calls and CSS `@import` rules.
//!
//! Both scanners work without full parsing and report byte ranges so
//! callers can rewrite the matched text in place.

/// A `require("...")` call found in JavaScript source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireCall {
    /// Specifier exactly as written.
    pub path: String,
    /// Byte offset of `require`.
    pub start: usize,
    /// Byte offset just past the closing `)`.
    pub end: usize,
    /// Line number (1-indexed).
    pub line: u32,
}

/// An `@import` rule found in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssImport {
    /// Import target exactly as written.
    pub path: String,
    /// Byte offset of `@import`.
    pub start: usize,
    /// Byte offset just past the terminating `;` (or end of input).
    pub end: usize,
    /// Line number (1-indexed).
    pub line: u32,
}

impl CssImport {
    /// Remote imports (`http://...`, `//cdn/...`) are left untouched.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.path.contains("://") || self.path.starts_with("//")
    }
}

/// Scan JavaScript source for `require("...")` calls in source order.
///
/// Calls inside comments and string literals are skipped, as are member
/// calls like `foo.require("x")`.
#[must_use]
pub fn scan_requires(source: &str) -> Vec<RequireCall> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut results = Vec::new();
    let mut line: u32 = 1;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\n' => {
                line += 1;
                i += 1;
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'/' => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                i = skip_block_comment(bytes, i + 2, &mut line);
            }
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i, &mut line);
            }
            b'r' if matches_keyword(bytes, i, b"require") => {
                if let Some((path, end)) = scan_require_call(bytes, i + 7) {
                    results.push(RequireCall {
                        path,
                        start: i,
                        end,
                        line,
                    });
                    i = end;
                } else {
                    i += 7;
                }
            }
            _ => i += 1,
        }
    }

    results
}

/// Scan a stylesheet for `@import` rules in source order.
///
/// Accepts `@import "x";`, `@import 'x';`, `@import url(x);` and
/// `@import url("x") screen;`. Rules inside comments are skipped.
#[must_use]
pub fn scan_css_imports(source: &str) -> Vec<CssImport> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut results = Vec::new();
    let mut line: u32 = 1;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\n' => {
                line += 1;
                i += 1;
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                i = skip_block_comment(bytes, i + 2, &mut line);
            }
            b'@' if bytes[i..].starts_with(b"@import") => {
                let start = i;
                let start_line = line;
                match scan_import_rule(bytes, i + 7) {
                    Some((path, end)) => {
                        line += count_newlines(&bytes[start..end]);
                        results.push(CssImport {
                            path,
                            start,
                            end,
                            line: start_line,
                        });
                        i = end;
                    }
                    None => i += 7,
                }
            }
            _ => i += 1,
        }
    }

    results
}

fn count_newlines(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u32
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Keyword at `pos` with identifier boundaries, not preceded by `.`.
fn matches_keyword(bytes: &[u8], pos: usize, keyword: &[u8]) -> bool {
    if !bytes[pos..].starts_with(keyword) {
        return false;
    }
    if pos > 0 && (is_ident(bytes[pos - 1]) || bytes[pos - 1] == b'.') {
        return false;
    }
    let after = pos + keyword.len();
    !(after < bytes.len() && is_ident(bytes[after]))
}

fn skip_block_comment(bytes: &[u8], mut i: usize, line: &mut u32) -> usize {
    let len = bytes.len();
    while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
        if bytes[i] == b'\n' {
            *line += 1;
        }
        i += 1;
    }
    (i + 2).min(len)
}

fn skip_string(bytes: &[u8], start: usize, line: &mut u32) -> usize {
    let quote = bytes[start];
    let len = bytes.len();
    let mut i = start + 1;
    while i < len && bytes[i] != quote {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'\n' {
            if quote != b'`' {
                // Unterminated literal; resume scanning on the next line.
                return i;
            }
            *line += 1;
        }
        i += 1;
    }
    (i + 1).min(len)
}

fn skip_inline_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Read a quoted literal at `i`, returning its contents and the index past
/// the closing quote.
fn read_quoted(bytes: &[u8], i: usize) -> Option<(String, usize)> {
    let quote = *bytes.get(i)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let start = i + 1;
    let mut j = start;
    while j < bytes.len() && bytes[j] != quote {
        if bytes[j] == b'\n' {
            return None;
        }
        if bytes[j] == b'\\' {
            j += 1;
        }
        j += 1;
    }
    if j >= bytes.len() {
        return None;
    }
    let text = String::from_utf8_lossy(&bytes[start..j]).into_owned();
    Some((text, j + 1))
}

fn scan_require_call(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut i = skip_inline_ws(bytes, start);
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i = skip_inline_ws(bytes, i + 1);
    let (path, after) = read_quoted(bytes, i)?;
    i = skip_inline_ws(bytes, after);
    if bytes.get(i) != Some(&b')') {
        return None;
    }
    Some((path, i + 1))
}

fn scan_import_rule(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let len = bytes.len();
    let mut i = skip_ws(bytes, start);
    if i == start {
        // `@import"x"` is valid CSS; `@importx` is not an import.
        bytes.get(i).filter(|b| **b == b'"' || **b == b'\'')?;
    }

    let path = if bytes[i..].starts_with(b"url(") {
        i = skip_ws(bytes, i + 4);
        let path = if let Some((path, after)) = read_quoted(bytes, i) {
            i = after;
            path
        } else {
            let begin = i;
            while i < len && bytes[i] != b')' && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            String::from_utf8_lossy(&bytes[begin..i]).into_owned()
        };
        i = skip_ws(bytes, i);
        if bytes.get(i) != Some(&b')') {
            return None;
        }
        i += 1;
        path
    } else {
        let (path, after) = read_quoted(bytes, i)?;
        i = after;
        path
    };

    // Media queries and layer names run up to the terminating semicolon.
    while i < len && bytes[i] != b';' && bytes[i] != b'\n' {
        i += 1;
    }
    if i < len && bytes[i] == b';' {
        i += 1;
    }
    Some((path, i))
}
