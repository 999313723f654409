//! Canned texts and inline keyboards for the menu flow.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Welcome text shown on /start, MarkdownV2.
pub const WELCOME_TEXT: &str = "👋 Hi\\! Welcome to *Grab Bot*\\.\n\n\
    I can download from *YouTube, TikTok, Instagram, Facebook*\\.\n\
    Send a link, then pick a format \\(🎥 video / 🎵 audio / 🖼 thumbnail\\)\\.";

/// Prompt shown when the user opens the download menu.
pub const SEND_LINK_PROMPT: &str = "📥 Send me a media link to process.";

/// Prompt shown under the format keyboard after a link arrives.
pub const CHOOSE_FORMAT_PROMPT: &str = "Choose a download format:";

/// Warning when a format is picked with no link on record.
pub const NO_LINK_WARNING: &str = "⚠️ Send me a link first.";

/// Single "start" button under the welcome message.
pub fn welcome_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback("🎬 Start download", "menu")]])
}

/// Format choices: video/audio on the first row, thumbnail/back on the second.
pub fn format_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("🎥 Video", "mp4"),
            InlineKeyboardButton::callback("🎵 Audio", "mp3"),
        ],
        vec![
            InlineKeyboardButton::callback("🖼 Thumbnail", "jpg"),
            InlineKeyboardButton::callback("🔙 Back", "menu"),
        ],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("expected callback button, got {:?}", other),
        }
    }

    #[test]
    fn test_welcome_keyboard_is_single_menu_button() {
        let kb = welcome_keyboard();
        assert_eq!(kb.inline_keyboard.len(), 1);
        assert_eq!(kb.inline_keyboard[0].len(), 1);
        assert_eq!(callback_data(&kb.inline_keyboard[0][0]), "menu");
    }

    #[test]
    fn test_format_keyboard_layout() {
        let kb = format_keyboard();
        assert_eq!(kb.inline_keyboard.len(), 2);

        let row1: Vec<&str> = kb.inline_keyboard[0].iter().map(callback_data).collect();
        let row2: Vec<&str> = kb.inline_keyboard[1].iter().map(callback_data).collect();
        assert_eq!(row1, vec!["mp4", "mp3"]);
        assert_eq!(row2, vec!["jpg", "menu"]);
    }
}
