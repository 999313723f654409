//! yt-dlp process orchestration.
//!
//! The actual media work is delegated entirely to the external yt-dlp
//! binary. This module fetches the media title (to template the output
//! path), runs the mode-specific download while forwarding progress lines
//! through a channel, and resolves the produced file.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;
use tokio::time::timeout;
use url::Url;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::truncate_tail;
use crate::download::progress::{is_postprocessing_line, parse_progress, ProgressEvent};
use crate::download::request::DownloadRequest;

/// Number of output lines kept for error reporting
const STDERR_TAIL_LINES: usize = 200;
/// Byte cap on the stderr tail included in error messages
const STDERR_TAIL_BYTES: usize = 2000;

/// Fetches the media title for a URL without downloading anything.
///
/// Uses `--print "%(title).100s"` so the title arrives already truncated to
/// the output-template limit. Bounded by a timeout because this call gates
/// the interactive response to the user.
///
/// # Errors
/// Fails when yt-dlp cannot be executed, times out, exits nonzero (URL
/// unsupported or unavailable), or prints an empty title.
pub async fn fetch_title(url: &Url) -> AppResult<String> {
    let ytdl_bin = &*config::YTDL_BIN;

    let args = [
        "--print",
        "%(title).100s",
        "--no-playlist",
        "--skip-download",
        url.as_str(),
    ];
    log::debug!("yt-dlp title fetch: {} {}", ytdl_bin, args.join(" "));

    let output = timeout(
        config::download::title_fetch_timeout(),
        TokioCommand::new(ytdl_bin).args(args).output(),
    )
    .await
    .map_err(|_| AppError::Download("yt-dlp title fetch timed out".to_string()))?
    .map_err(|e| AppError::Download(format!("failed to execute {}: {}", ytdl_bin, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("yt-dlp failed to fetch title for {}: {}", url, stderr.trim());
        return Err(AppError::Download(format!(
            "could not read media info: {}",
            truncate_tail(stderr.trim(), STDERR_TAIL_BYTES)
        )));
    }

    let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if title.is_empty() {
        return Err(AppError::Download(
            "media has no title; it may be unavailable or private".to_string(),
        ));
    }

    log::info!("Resolved title for {}: '{}'", url, title);
    Ok(title)
}

/// Starts the download for a request.
///
/// The child process runs on the blocking pool and is waited on
/// synchronously; its stdout is read line by line and every parsed progress
/// update is pushed into the returned channel, so the caller's message edits
/// never stall the transfer. The join handle resolves to the final file path.
///
/// There is no retry and no cancellation: once spawned, the download runs to
/// completion or failure.
pub fn start_download(
    request: DownloadRequest,
) -> (
    mpsc::UnboundedReceiver<ProgressEvent>,
    tokio::task::JoinHandle<AppResult<PathBuf>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::task::spawn_blocking(move || run_download(&request, &tx));

    (rx, handle)
}

fn run_download(request: &DownloadRequest, tx: &mpsc::UnboundedSender<ProgressEvent>) -> AppResult<PathBuf> {
    let ytdl_bin = &*config::YTDL_BIN;
    let args = request.ytdlp_args();
    log::debug!("yt-dlp command: {} {}", ytdl_bin, args.join(" "));

    let mut child = Command::new(ytdl_bin)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::Download(format!("failed to spawn {}: {}", ytdl_bin, e)))?;

    let stderr_tail = Arc::new(Mutex::new(VecDeque::<String>::new()));

    if let Some(stderr_stream) = child.stderr.take() {
        let stderr_tail = Arc::clone(&stderr_tail);
        std::thread::spawn(move || {
            let reader = BufReader::new(stderr_stream);
            for line in reader.lines().map_while(Result::ok) {
                log::debug!("yt-dlp stderr: {}", line);
                if let Ok(mut lines) = stderr_tail.lock() {
                    lines.push_back(line);
                    if lines.len() > STDERR_TAIL_LINES {
                        lines.pop_front();
                    }
                }
            }
        });
    }

    if let Some(stdout_stream) = child.stdout.take() {
        let reader = BufReader::new(stdout_stream);
        for line in reader.lines().map_while(Result::ok) {
            log::debug!("yt-dlp stdout: {}", line);
            if let Some(info) = parse_progress(&line) {
                let _ = tx.send(ProgressEvent::Downloading(info));
            } else if is_postprocessing_line(&line) {
                let _ = tx.send(ProgressEvent::Finished);
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| AppError::Download(format!("downloader process failed: {}", e)))?;

    if !status.success() {
        let stderr_text = stderr_tail
            .lock()
            .map(|mut lines| lines.make_contiguous().join("\n"))
            .unwrap_or_default();
        log::error!(
            "yt-dlp exited with {:?} for {}: {}",
            status.code(),
            request.url,
            stderr_text
        );
        return Err(AppError::Download(format!(
            "yt-dlp failed (exit {:?}): {}",
            status.code(),
            truncate_tail(&stderr_text, STDERR_TAIL_BYTES)
        )));
    }

    let path = request.final_path()?;
    if !path.exists() {
        return Err(AppError::Download(format!(
            "yt-dlp reported success but {} was not produced",
            path.display()
        )));
    }

    Ok(path)
}

/// Logs the installed yt-dlp version at startup. Warn-only: a missing binary
/// surfaces properly on the first download attempt.
pub async fn log_ytdlp_version() {
    let ytdl_bin = &*config::YTDL_BIN;

    match TokioCommand::new(ytdl_bin).arg("--version").output().await {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("yt-dlp version: {}", version);
        }
        Ok(output) => {
            log::warn!(
                "'{} --version' exited with {:?}",
                ytdl_bin,
                output.status.code()
            );
        }
        Err(e) => {
            log::warn!("Failed to run '{} --version': {}. Downloads will fail until it is installed.", ytdl_bin, e);
        }
    }
}
