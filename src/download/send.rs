//! File delivery and cleanup.

use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::core::error::AppResult;
use crate::download::mode::DownloadMode;
use crate::telegram::Bot;

/// Sends a produced file to the chat as the media kind matching the mode.
pub async fn deliver(bot: &Bot, chat_id: ChatId, mode: DownloadMode, path: &Path) -> AppResult<()> {
    let input = InputFile::file(path.to_path_buf());

    match mode {
        DownloadMode::Video => {
            bot.send_video(chat_id, input).await?;
        }
        DownloadMode::Audio => {
            bot.send_audio(chat_id, input).await?;
        }
        DownloadMode::Thumbnail => {
            bot.send_photo(chat_id, input).await?;
        }
    }

    log::info!("Delivered {} to chat {}", path.display(), chat_id);
    Ok(())
}

/// Removes a delivered file from disk, best-effort.
///
/// Existence is checked first; a failed delete is logged and not surfaced —
/// the user already has their file.
pub fn cleanup_file(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sent.mp4");
        std::fs::write(&path, b"data").unwrap();

        cleanup_file(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_cleanup_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        cleanup_file(&dir.path().join("never-existed.mp3"));
    }
}
