use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::time::sleep;

use grabbot::cli::{Cli, Commands};
use grabbot::core::{config, init_logger, Config};
use grabbot::download::mode::DownloadMode;
use grabbot::download::progress::ProgressEvent;
use grabbot::download::request::DownloadRequest;
use grabbot::download::ytdlp;
use grabbot::session::SessionStore;
use grabbot::telegram::{create_bot, schema, Command, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from the dispatcher instead of terminating silently
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    // Config file is required; a missing or malformed file is fatal
    let app_config = Config::load(Path::new(&cli.config))?;

    match cli.command {
        Some(Commands::Download { url, mode, output }) => run_cli_download(&app_config, &url, &mode, output).await,
        Some(Commands::Run) | None => run_bot(app_config).await,
    }
}

/// Run the one-shot CLI download command
async fn run_cli_download(app_config: &Config, url: &str, mode: &str, output: Option<String>) -> Result<()> {
    let mode = DownloadMode::parse(mode)
        .ok_or_else(|| anyhow::anyhow!("unsupported mode '{}': use video, audio or thumbnail", mode))?;
    let url = url::Url::parse(url)?;

    let downloads_dir = PathBuf::from(output.unwrap_or_else(|| app_config.download_dir()));
    std::fs::create_dir_all(&downloads_dir)?;

    let title = ytdlp::fetch_title(&url).await?;
    log::info!("Downloading '{}' as {}", title, mode);

    let request = DownloadRequest::new(url, mode, &downloads_dir, &title);
    let (mut progress_rx, download_handle) = ytdlp::start_download(request);

    let progress_logger = tokio::spawn(async move {
        let mut last_percent = None;
        while let Some(event) = progress_rx.recv().await {
            match event {
                ProgressEvent::Downloading(info) => {
                    if last_percent != Some(info.percent) {
                        last_percent = Some(info.percent);
                        log::info!("Progress: {}%", info.percent);
                    }
                }
                ProgressEvent::Finished => log::info!("Post-processing..."),
            }
        }
    });

    let path = download_handle
        .await
        .map_err(|e| anyhow::anyhow!("download task failed: {}", e))??;
    let _ = progress_logger.await;

    println!("{}", path.display());
    Ok(())
}

/// Run the Telegram bot
async fn run_bot(app_config: Config) -> Result<()> {
    log::info!("Starting bot...");

    // Check yt-dlp availability at startup (warn-only)
    ytdlp::log_ytdlp_version().await;

    let downloads_dir = PathBuf::from(app_config.download_dir());
    std::fs::create_dir_all(&downloads_dir)?;
    log::info!("Downloads directory: {}", downloads_dir.display());

    let bot = create_bot(&app_config.bot_token)?;

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = HandlerDeps::new(Arc::new(SessionStore::new()), downloads_dir);
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode");

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    // Run the dispatcher in a separate task so panics can be caught via the
    // JoinHandle and the connection re-established.
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch()
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!("Retrying dispatcher connection (attempt {}/{})...", retry_count, max_retries);
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        if retry_count > 0 {
            sleep(config::retry::dispatcher_delay()).await;
        }
    }

    Ok(())
}

/// Exponential backoff delay for retries
async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}
