//! Telegram bot handler tree configuration.
//!
//! The handler tree routes each update to exactly one handler: the /start
//! command, the menu callback, a format-choice callback, or a free-text
//! message treated as a link. Routing of callback payloads is a pure
//! function so the "unknown data is a no-op" rule is testable without a bot.

use std::path::PathBuf;
use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use url::Url;

use crate::core::error::{AppError, AppResult};
use crate::download::mode::DownloadMode;
use crate::download::request::DownloadRequest;
use crate::download::send::{cleanup_file, deliver};
use crate::download::ytdlp;
use crate::session::{ProgressHandle, SessionStore};
use crate::telegram::bot::{Bot, Command};
use crate::telegram::menu;
use crate::telegram::progress::{spawn_drainer, DownloadStatus, ProgressNotifier};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub sessions: Arc<SessionStore>,
    pub downloads_dir: Arc<PathBuf>,
}

impl HandlerDeps {
    pub fn new(sessions: Arc<SessionStore>, downloads_dir: PathBuf) -> Self {
        Self {
            sessions,
            downloads_dir: Arc::new(downloads_dir),
        }
    }
}

/// What a callback payload asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Back to the "send me a link" prompt
    Menu,
    /// Start a download in the given mode
    Download(DownloadMode),
}

impl CallbackAction {
    /// Exact-string routing of callback data. Anything outside the four
    /// known payloads returns `None` and must be ignored by the caller.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "menu" => Some(Self::Menu),
            "mp4" | "mp3" | "jpg" => DownloadMode::parse(data).map(Self::Download),
            _ => None,
        }
    }
}

/// Creates the main dispatcher schema for the bot.
///
/// The same tree is used in production and can be driven by tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

            match cmd {
                Command::Start => {
                    bot.send_message(msg.chat.id, menu::WELCOME_TEXT)
                        .parse_mode(ParseMode::MarkdownV2)
                        .reply_markup(menu::welcome_keyboard())
                        .await?;
                }
            }
            Ok(())
        },
    ))
}

/// Handler for plain text messages, treated as media links.
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|t| !t.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok(());
                };
                let Some(text) = msg.text() else {
                    return Ok(());
                };

                let link = text.trim().to_string();
                log::info!("Stored link for user {}: {}", user.id, link);
                deps.sessions.set_link(user.id, link);

                bot.send_message(msg.chat.id, menu::CHOOSE_FORMAT_PROMPT)
                    .reply_markup(menu::format_keyboard())
                    .await?;

                Ok(())
            }
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
                // Unmatched callback data is a silent no-op
                log::debug!("Ignoring unknown callback data: {:?}", q.data);
                return Ok(());
            };

            let _ = bot.answer_callback_query(q.id.clone()).await;

            match action {
                CallbackAction::Menu => {
                    if let Some((chat_id, message_id)) = callback_message(&q) {
                        bot.edit_message_text(chat_id, message_id, menu::SEND_LINK_PROMPT).await?;
                    }
                }
                CallbackAction::Download(mode) => {
                    handle_format_choice(&bot, &q, mode, &deps).await;
                }
            }
            Ok(())
        }
    })
}

/// Chat and message id of the message the callback button was attached to.
fn callback_message(q: &CallbackQuery) -> Option<(ChatId, MessageId)> {
    q.message.as_ref().map(|m| (m.chat().id, m.id()))
}

/// Handles a format selection: precondition check, then the full
/// download-deliver-cleanup flow with the top-level catch.
///
/// Everything that can fail downstream is flattened here into an error text
/// that replaces the progress message; nothing propagates to the dispatcher.
async fn handle_format_choice(bot: &Bot, q: &CallbackQuery, mode: DownloadMode, deps: &HandlerDeps) {
    let user_id = q.from.id;
    let Some((chat_id, message_id)) = callback_message(q) else {
        log::debug!("Format callback without an accessible message from user {}", user_id);
        return;
    };

    let Some(link) = deps.sessions.link(user_id) else {
        log::info!("User {} picked {} with no link on record", user_id, mode);
        let _ = bot.edit_message_text(chat_id, message_id, menu::NO_LINK_WARNING).await;
        return;
    };

    if let Err(e) = run_download_flow(bot, q, chat_id, message_id, mode, &link, deps).await {
        log::error!("Download failed for user {} ({} {}): {}", user_id, mode, link, e);

        let status = DownloadStatus::Error { message: e.to_string() };
        let handle = deps
            .sessions
            .progress(user_id)
            .unwrap_or(ProgressHandle { chat_id, message_id });
        if let Err(edit_err) = bot
            .edit_message_text(handle.chat_id, handle.message_id, status.to_message())
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            log::warn!("Failed to show error to user {}: {}", user_id, edit_err);
        }
    }
}

/// The happy path: progress message, title fetch, download with progress
/// drain, delivery, cleanup, final status.
async fn run_download_flow(
    bot: &Bot,
    q: &CallbackQuery,
    chat_id: ChatId,
    message_id: MessageId,
    mode: DownloadMode,
    link: &str,
    deps: &HandlerDeps,
) -> AppResult<()> {
    let user_id = q.from.id;
    let url = Url::parse(link)?;

    // Turn the menu message into the progress message and remember it; the
    // notifier edits whatever handle is current from here on.
    let progress_msg = bot
        .edit_message_text(chat_id, message_id, DownloadStatus::Starting.to_message())
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    deps.sessions.set_progress(
        user_id,
        ProgressHandle {
            chat_id,
            message_id: progress_msg.id,
        },
    );

    let title = ytdlp::fetch_title(&url).await?;
    let request = DownloadRequest::new(url, mode, &deps.downloads_dir, &title);

    let (progress_rx, download_handle) = ytdlp::start_download(request);
    let notifier = ProgressNotifier::new(bot.clone(), Arc::clone(&deps.sessions), user_id);
    let drainer = spawn_drainer(notifier, progress_rx, title, mode);

    let path = download_handle
        .await
        .map_err(|e| AppError::Download(format!("download task failed: {}", e)))??;

    // Let the last progress edits land before the terminal status replaces them.
    let _ = drainer.await;

    deliver(bot, chat_id, mode, &path).await?;
    cleanup_file(&path);

    if let Some(handle) = deps.sessions.progress(user_id) {
        bot.edit_message_text(handle.chat_id, handle.message_id, DownloadStatus::Done.to_message())
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
    }

    Ok(())
}
