//! Progress message rendering and best-effort editing.
//!
//! The notifier never returns an error: a progress edit that fails (rate
//! limiting, "message is not modified", anything) is logged at debug level
//! and dropped. That contract is what keeps download tasks unaffected by
//! Telegram-side hiccups.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::mpsc;

use crate::download::mode::DownloadMode;
use crate::download::progress::ProgressEvent;
use crate::session::SessionStore;
use crate::telegram::markdown::escape_markdown_v2;
use crate::telegram::Bot;

/// Download state shown to the user, rendered into the progress message.
#[derive(Debug, Clone)]
pub enum DownloadStatus {
    /// Placeholder before the first progress line arrives
    Starting,
    /// Transfer in progress
    Downloading {
        title: String,
        mode: DownloadMode,
        progress: u8,
        speed_mbs: Option<f64>,
        eta_seconds: Option<u64>,
    },
    /// Transfer done, yt-dlp is merging or transcoding
    Finishing { title: String, mode: DownloadMode },
    /// File delivered
    Done,
    /// The attempt failed
    Error { message: String },
}

impl DownloadStatus {
    fn emoji(mode: DownloadMode) -> &'static str {
        match mode {
            DownloadMode::Video => "🎬",
            DownloadMode::Audio => "🎵",
            DownloadMode::Thumbnail => "🖼",
        }
    }

    /// Renders the MarkdownV2 message text for this state.
    pub fn to_message(&self) -> String {
        match self {
            DownloadStatus::Starting => "⏳ Starting download\\.\\.\\.".to_string(),
            DownloadStatus::Downloading {
                title,
                mode,
                progress,
                speed_mbs,
                eta_seconds,
            } => {
                let escaped = escape_markdown_v2(title);
                let bar = create_progress_bar(*progress);
                let mut s = String::with_capacity(escaped.len() + bar.len() + 120);
                s.push_str(Self::emoji(*mode));
                s.push_str(" *");
                s.push_str(&escaped);
                s.push_str("*\n\n📥 Downloading: ");
                s.push_str(&progress.to_string());
                s.push_str("%\n");
                s.push_str(&bar);

                if let Some(speed) = speed_mbs {
                    s.push_str("\n\n⚡ Speed: ");
                    s.push_str(&format!("{:.1} MB/s", speed).replace('.', "\\."));
                }

                if let Some(eta) = eta_seconds {
                    let minutes = eta / 60;
                    let seconds = eta % 60;
                    s.push_str("\n⏱ ETA: ");
                    if minutes > 0 {
                        s.push_str(&format!("\\~{} min {} sec", minutes, seconds));
                    } else {
                        s.push_str(&format!("\\~{} sec", seconds));
                    }
                }

                s
            }
            DownloadStatus::Finishing { title, mode } => {
                format!(
                    "{} *{}*\n\n📦 Processing\\.\\.\\.",
                    Self::emoji(*mode),
                    escape_markdown_v2(title)
                )
            }
            DownloadStatus::Done => "✅ Done\\! Send another link to download more\\.".to_string(),
            DownloadStatus::Error { message } => {
                format!("❌ Error: {}", escape_markdown_v2(message))
            }
        }
    }
}

/// Renders a ten-block progress bar.
fn create_progress_bar(progress: u8) -> String {
    let progress = progress.min(100);
    let filled = (progress / 10) as usize;
    let empty = 10 - filled;

    format!("\\[{}{}\\]", "█".repeat(filled), "░".repeat(empty))
}

/// Best-effort editor of a user's stored progress message.
///
/// The message handle is re-read from the session store on every update, so
/// the notifier always targets whatever progress message is current for the
/// user — including after a newer download has replaced it.
pub struct ProgressNotifier {
    bot: Bot,
    sessions: Arc<SessionStore>,
    user: UserId,
}

impl ProgressNotifier {
    pub fn new(bot: Bot, sessions: Arc<SessionStore>, user: UserId) -> Self {
        Self { bot, sessions, user }
    }

    /// Edits the user's progress message in place. Fire-and-forget: a missing
    /// handle or a failed edit only produces a debug log line.
    pub async fn update(&self, status: DownloadStatus) {
        let Some(handle) = self.sessions.progress(self.user) else {
            log::debug!("No progress message recorded for user {}; skipping update", self.user);
            return;
        };

        if let Err(e) = self
            .bot
            .edit_message_text(handle.chat_id, handle.message_id, status.to_message())
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            log::debug!("Progress edit failed for user {}: {}", self.user, e);
        }
    }
}

/// Spawns the task that drains download progress events into message edits.
///
/// Runs until the sending side of the channel is dropped, i.e. until the
/// download finishes or fails. Edits are throttled to whole-percent changes.
pub fn spawn_drainer(
    notifier: ProgressNotifier,
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    title: String,
    mode: DownloadMode,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_percent: Option<u8> = None;

        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Downloading(info) => {
                    if last_percent == Some(info.percent) {
                        continue;
                    }
                    last_percent = Some(info.percent);

                    notifier
                        .update(DownloadStatus::Downloading {
                            title: title.clone(),
                            mode,
                            progress: info.percent,
                            speed_mbs: info.speed_mbs,
                            eta_seconds: info.eta_seconds,
                        })
                        .await;
                }
                ProgressEvent::Finished => {
                    notifier
                        .update(DownloadStatus::Finishing {
                            title: title.clone(),
                            mode,
                        })
                        .await;
                }
            }
        }
    })
}
