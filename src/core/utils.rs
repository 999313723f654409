//! Small shared helpers.

/// Makes a media title safe to use as a file name.
///
/// Path separators, Windows-reserved characters and control characters are
/// replaced with underscores; double quotes become single quotes. Everything
/// else (including unicode) is kept.
///
/// # Example
///
/// ```
/// use grabbot::core::utils::escape_filename;
///
/// assert_eq!(escape_filename("song/name*?"), "song_name__");
/// ```
pub fn escape_filename(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());

    for c in filename.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            ':' | '*' | '?' | '<' | '>' | '|' => result.push('_'),
            '"' => result.push('\''),
            c if c.is_control() => result.push('_'),
            _ => result.push(c),
        }
    }

    result
}

/// Returns the last `max_len` bytes of `text` on a char boundary.
///
/// Used to keep stderr tails in error messages bounded.
pub fn truncate_tail(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut start = text.len() - max_len;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
