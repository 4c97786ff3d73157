//! Line-oriented edits of configuration files

use regex::Regex;

/// Matches any `vm.swappiness` assignment, whatever its value or spacing
pub const SWAPPINESS_PATTERN: &str = r"^\s*vm\.swappiness\s*=.*$";

/// Result of [`replace_or_append`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub content: String,
    pub changed: bool,
}

/// Make `line` the only line of `content` matching `pattern`.
///
/// The first matching line is replaced in place and later matches are
/// dropped. Without a match, `line` is appended. Every line keeps its own
/// terminator; new or unterminated lines get the file's style (CRLF when the
/// first terminated line uses it, LF otherwise). The output always ends with
/// a newline.
#[must_use]
pub fn replace_or_append(content: &str, pattern: &Regex, line: &str) -> Patched {
    let newline = newline_style(content);
    let mut out = String::with_capacity(content.len() + line.len() + 2);
    let mut seen = false;

    for raw in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(raw);
        let terminator = if terminator.is_empty() { newline } else { terminator };

        if pattern.is_match(body) {
            if !seen {
                out.push_str(line);
                out.push_str(terminator);
                seen = true;
            }
        } else {
            out.push_str(body);
            out.push_str(terminator);
        }
    }

    if !seen {
        out.push_str(line);
        out.push_str(newline);
    }

    Patched {
        changed: out != content,
        content: out,
    }
}

fn newline_style(content: &str) -> &'static str {
    match content.split_inclusive('\n').next() {
        Some(first) if first.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}
