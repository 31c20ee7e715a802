//! Low-level header line helpers

/// Strips a trailing `\n` and then a trailing `\r` from a raw line.
pub fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Splits a header line on its first whitespace run into `(keyword, rest)`.
///
/// `rest` has its leading whitespace removed; a line without whitespace
/// yields an empty `rest`.
pub fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (line, ""),
    }
}
