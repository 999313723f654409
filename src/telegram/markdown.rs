//! MarkdownV2 escaping.

/// Escapes the characters Telegram's MarkdownV2 parser treats as markup.
pub fn escape_markdown_v2(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('~', "\\~")
        .replace('`', "\\`")
        .replace('>', "\\>")
        .replace('#', "\\#")
        .replace('+', "\\+")
        .replace('-', "\\-")
        .replace('=', "\\=")
        .replace('|', "\\|")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('.', "\\.")
        .replace('!', "\\!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_text() {
        assert_eq!(escape_markdown_v2("Hello World"), "Hello World");
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape_markdown_v2("Test_file.mp3"), "Test\\_file\\.mp3");
        assert_eq!(escape_markdown_v2("Song [2024]"), "Song \\[2024\\]");
        assert_eq!(escape_markdown_v2("a\\b"), "a\\\\b");
    }
}
